//! Spoken forms of callsigns, codes and names.

use store::Tables;


const ALPHABET: [&str; 26] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliett",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "x-ray", "yankee", "zulu",
];

const DIGITS: [&str; 10] =
    ["zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "niner"];

/// The phonetic word of a letter or digit.
#[must_use]
pub fn word(ch: char) -> Option<&'static str> {
    if let Some(digit) = ch.to_digit(10) {
        return DIGITS.get(digit as usize).copied();
    }
    let byte = u8::try_from(ch.to_ascii_lowercase()).ok()?;
    if byte.is_ascii_lowercase() {
        return ALPHABET.get(usize::from(byte - b'a')).copied();
    }
    None
}

/// The letter of a phonetic alphabet word.
#[must_use]
pub fn letter(word: &str) -> Option<char> {
    let index = ALPHABET.iter().position(|&candidate| candidate == word)?;
    u8::try_from(index).ok().map(|index| char::from(b'a' + index))
}

/// Spells each letter and digit of `text`, e.g. `N12` as `november one two`.
#[must_use]
pub fn spell(text: &str) -> String {
    text.chars().filter_map(word).collect::<Vec<_>>().join(" ")
}

/// The spoken form of a callsign or code.
///
/// Airline callsigns use the telephony and group the flight number,
/// e.g. `DAL1234` as `Delta 12 34`.
/// Anything else is spelled out.
#[must_use]
pub fn phoneticize(text: &str, tables: &Tables) -> String {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();

    if let Some((prefix, number)) = compact.split_at_checked(3)
        && let Some(airline) = tables.airline(prefix)
    {
        let split = number.len().saturating_sub(2);
        let (head, tail) = number.split_at(split);
        return format!("{} {head} {tail}", airline.telephony);
    }

    spell(&compact)
}

/// The name of a destination airport, or its spelled code if unknown.
#[must_use]
pub fn destination_name(icao: &str, tables: &Tables) -> String {
    match tables.destinations.get(icao) {
        Some(destination) => destination.name.clone(),
        None => phoneticize(icao, tables),
    }
}

/// The phonetic word of the ATIS letter, e.g. `Charlie`.
#[must_use]
pub fn atis(letter: char) -> String {
    let Some(word) = word(letter) else { return letter.to_string() };
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

/// Spells a frequency, e.g. `120.9` as `one two zero point niner`.
#[must_use]
pub fn frequency(text: &str) -> String {
    text.chars()
        .filter_map(|ch| if ch == '.' { Some("point") } else { word(ch) })
        .collect::<Vec<_>>()
        .join(" ")
}
