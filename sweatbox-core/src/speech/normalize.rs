//! Rewrites raw speech recognizer output into the controlled phraseology vocabulary.
//!
//! Every stage maps canonical text onto itself,
//! so normalizing an already normalized transcript changes nothing.

use itertools::Itertools;
use store::Tables;

use crate::phonetic;


/// Length of a general aviation registration, e.g. `N123AB`.
const REGISTRATION_LENGTH: usize = 6;

/// Characters dropped before any rewrite.
const STRIPPED: &[char] = &[',', '/', '?', ':', '-', '$', '!', ';', '"'];

/// Literal substring rewrites for systematic misrecognitions, applied in order.
const REWRITES: &[(&str, &str)] = &[
    // digits
    ("9 or", "9"),
    ("9 er", "9"),
    ("9 uh", "9"),
    ("9 and", "9"),
    ("9 are", "9"),
    ("niner", "9"),
    ("nineer", "9"),
    ("diner", "9"),
    (" 4th", "4"),
    (" 5th", "5"),
    (" 6th", "6"),
    (" 7th", "7"),
    (" 8th", "8"),
    (" 9th", "9"),
    ("eighth", "8"),
    (" ate ", " 8 "),
    ("zero", "0"),
    // flight rules and registrations
    ("via far", "vfr"),
    ("via our", "vfr"),
    ("via power", "vfr"),
    ("fiat bar", "vfr"),
    (" url ", " you're "),
    ("i remember ", "n"),
    ("november ", "n"),
    ("remember ", "n"),
    // clearance vocabulary
    ("minton", "maintain"),
    ("maintained", "maintain"),
    ("maintaining", "maintain"),
    ("pushed back", "pushback"),
    ("push back", "pushback"),
    ("read back", "readback"),
    ("read that", "readback"),
    ("reed back", "readback"),
    ("right back", "readback"),
    ("reed bank", "readback"),
    ("readback act", "readback correct"),
    ("is that correct", "readback correct"),
    ("remake", "readback"),
    ("read by", "readback"),
    ("read my", "readback"),
    ("rebecca", "readback"),
    ("frequencies", "frequency"),
    ("factor frequency", "departure frequency"),
    ("contact our", "contact tower"),
    ("contact hour", "contact tower"),
    (" tao", " tower"),
    (" tau", " tower"),
    ("hour", " tower"),
    // taxi
    ("texaco", "taxi"),
    ("texas", "taxi"),
    ("tax review", "taxi via"),
    ("view of", "via"),
    ("view", "via"),
    ("tax ", "taxi "),
    ("text you", "taxi via"),
    ("text me", "taxi via"),
    ("talks", "taxi via"),
    ("text to be", "taxi via"),
    ("texting", "taxi"),
    ("tuxedo", "taxi via"),
    ("texavia", "taxi via"),
    ("taxavia", "taxi via"),
    ("texivia", "taxi via"),
    ("taxivio", "taxi via"),
    ("texadia", "taxi via"),
    ("taxadia", "taxi via"),
    ("texa via", "taxi via"),
    ("tech cvi", "taxi via"),
    ("texevia", "taxi via"),
    ("tekstovia", "taxi via"),
    ("texty", "taxi"),
    ("texted", "taxi"),
    // queries
    (" se ", " say "),
    (" sir ", " say "),
    (" save ", " say "),
    ("stand by", "standby"),
    ("out of blow", "at or below"),
    ("radio shack", "radio check"),
    ("radioshack", "radio check"),
    ("radio cha ", "radio check "),
    ("portland's", "portland"),
    ("limousine", "ls"),
    (" chop", " check"),
    ("st tensions", "say intentions"),
    ("noble", "nuble"),
    ("nebel", "nuble"),
    ("citis", "say atis"),
    ("st etis", "say atis"),
    (" adis ", " atis "),
    (" adith ", " atis "),
    (" edis ", " atis "),
    (" edith ", " atis "),
    ("it is", "atis"),
    // squawk
    ("squawks", "squawk"),
    (" squad", " squawk"),
    ("s kwok", "squawk"),
    (" score", " squawk"),
    (" scorp", " squawk"),
    ("squat", "squawk"),
    ("sequoia", "squawk"),
    (" walk", " squawk"),
    (" guac", " squawk"),
    (" coffee", " copy"),
    // runways
    (" on my", " runway"),
    ("roommate", "runway"),
    ("run by", "runway"),
    (" only ", " runway "),
    ("roaming", "runway"),
    ("crossword", "cross runway"),
    ("run my", "runway"),
    ("run away", "runway"),
    ("run like", "runway"),
    ("roman", "runway"),
    ("runaway", "runway"),
    ("runway to 9", "runway 29"),
    ("room 29", "runway 29"),
    ("2 9", "29"),
    ("rampers", "ramp is"),
    // advise
    ("advisement", "advise"),
    ("advisory", "advise ready"),
    ("advisor", "advise ready"),
    ("adviser", "advise"),
    ("advised", "advise"),
    ("right directors", "radar vectors"),
    ("rate of rectors", "radar vectors"),
    // clearance
    ("corrected", "correct"),
    ("crack", "correct"),
    ("declared", "cleared"),
    ("clear ", "cleared "),
    ("concerns", "clearance"),
    ("clarence", "clearance"),
    ("is filed", "as filed"),
    ("inspired", "as filed"),
    ("has filed", "as filed"),
    ("his filed", "as filed"),
    ("viled", "filed"),
    ("biled", "filed"),
    ("piled", "filed"),
    ("vile", "filed"),
    ("bile", "filed"),
    ("file ", "filed "),
    // phonetic alphabet misrecognitions
    ("charley", "charlie"),
    ("charlie's", "charlie"),
    ("fox trot", "foxtrot"),
    ("funk straut", "foxtrot"),
    ("funk strout", "foxtrot"),
    ("fockstraught", "foxtrot"),
    ("juilliard", "juliett"),
    ("panpa ", "papa "),
    ("go back", "quebec"),
    ("uniformed", "uniform"),
    ("uniforms", "uniform"),
    ("yankees", "yankee"),
    ("gold", "golf"),
    // misc
    ("hello", ""),
    ("airlines", "airline"),
    ("crowned", "ground"),
    ("continued", "continue"),
    ("cough", "call for"),
    ("colon", "call when"),
    // frequencies
    ("11 9", "119"),
    ("119 .75", "119.75"),
    ("120.9er", "120.9"),
    ("1 to 0", "120"),
    ("went to 0", "120"),
    ("'s", " is"),
];

/// Spellings of the NUBLE departure and fix names,
/// each applied to its first occurrence only.
const PROCEDURE_REWRITES: &[(&str, &str)] = &[
    ("number", "nuble"),
    ("nouvel", "nuble"),
    ("nuvel", "nuble"),
    ("nabble", "nuble"),
    ("nouble", "nuble"),
    ("nubul", "nuble"),
    ("nubble", "nuble"),
    ("level", "nuble"),
    ("nibble", "nuble"),
    ("novel", "nuble"),
    ("#", "nuble "),
    ("nuble form", "nuble 4"),
    ("nuble for", "nuble 4"),
    ("haskell", "hskel"),
];

/// Undoes procedure rewrites that hit ordinary uses of "number".
const RESTORATIONS: &[(&str, &str)] = &[
    (" 44 departure", " nuble 4 departure"),
    ("you're nuble", "you're number"),
    ("your nuble", "you're number"),
    ("you are nuble", "you are number"),
    ("request nuble", "request number"),
];

/// Recognizer spellings of phonetic alphabet words.
const LETTER_ALIASES: &[(&str, char)] =
    &[("mic", 'm'), ("xray", 'x'), ("juliet", 'j'), ("whisky", 'w'), ("fox", 'f'), ("foxtr", 'f')];

/// Normalizes one raw transcript.
///
/// The result is lower case except for the leading callsign,
/// which is upper case to match the callsigns of aircraft.
#[must_use]
pub fn normalize(raw: &str, tables: &Tables) -> String {
    let mut text = raw.to_lowercase().replace(":00", "").replace(STRIPPED, "").replace(". ", " ");
    text = format!(" {} ", collapse(&text));
    for &(from, to) in REWRITES {
        text = text.replace(from, to);
    }
    text = collapse(&text).trim_end_matches('.').to_string();

    if let Some(rest) = text.strip_prefix("number ") {
        text = format!("n{rest}");
    }
    if let Some(rest) = text.strip_prefix("kr") {
        text = format!("care {rest}");
    }
    for &(from, to) in PROCEDURE_REWRITES {
        text = text.replacen(from, to, 1);
    }
    text = collapse(&text);

    text = airline_prefix(&text, tables);
    text = text.split(' ').map(letter_of).join(" ");
    text = format_callsign(&text);
    for &(from, to) in RESTORATIONS {
        text = text.replacen(from, to, 1);
    }
    text
}

/// Whether the controller cancelled the transmission at its end.
#[must_use]
pub fn is_disregarded(transcript: &str) -> bool {
    let transcript = transcript.to_lowercase();
    transcript.ends_with("disregard") || transcript.ends_with("never mind")
}

fn collapse(text: &str) -> String { text.split_whitespace().join(" ") }

fn letter_of(token: &str) -> String {
    if let Some(letter) = phonetic::letter(token) {
        return letter.to_string();
    }
    match LETTER_ALIASES.iter().find(|&&(alias, _)| alias == token) {
        Some(&(_, letter)) => letter.to_string(),
        None => token.to_string(),
    }
}

/// Replaces a spoken airline name at the start with its ICAO code,
/// joined to the flight number that follows.
fn airline_prefix(text: &str, tables: &Tables) -> String {
    let mut chars = text.chars();
    if chars.next() == Some('d') && chars.next().is_some_and(|ch| ch.is_ascii_digit()) {
        return format!("dal{}", &text[1..]);
    }

    let spoken = tables
        .airlines
        .iter()
        .flat_map(|airline| airline.spoken.iter().map(move |name| (name.as_str(), &airline.icao)))
        .sorted_by_key(|&(name, _)| std::cmp::Reverse(name.len()));
    for (name, icao) in spoken {
        let Some(rest) = text.strip_prefix(name) else { continue };
        let number = rest.strip_prefix(' ').unwrap_or(rest);
        if number.starts_with(|ch: char| ch.is_ascii_digit()) {
            return format!("{}{number}", icao.to_lowercase());
        }
    }
    text.to_string()
}

/// Upper-cases the leading callsign token,
/// merging the stray chunks of a spelled out registration into it.
fn format_callsign(text: &str) -> String {
    let mut tokens: Vec<String> = text.split(' ').map(String::from).collect();
    let Some(first) = tokens.first_mut() else { return String::new() };
    *first = first.to_uppercase();

    if first.starts_with('N') {
        let mut length = first.len();
        let mut merged = 0;
        for token in tokens.iter_mut().skip(1) {
            if length >= REGISTRATION_LENGTH {
                break;
            }
            if token == "to" {
                "2".clone_into(token);
            }
            if length + token.len() > REGISTRATION_LENGTH {
                break;
            }
            length += token.len();
            merged += 1;
        }

        let chunks: String = tokens.drain(1..=merged).collect();
        tokens[0] = format!("{}{}", tokens[0], chunks.to_uppercase());
    }

    tokens.join(" ")
}
