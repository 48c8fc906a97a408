//! Console input lines.

use anyhow::{Context, Result, bail};
use sweatbox::sim::strip::{Annotation, Bay, StripId};


/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A typed transmission to the aircraft.
    Transcript(String),
    Complete(String),
    Discard(String),
    Pause,
    Resume,
    Difficulty(u8),
    Review(String),
    Strip(String),
    Blank,
    Move { id: StripId, bay: Bay },
    Annotate { id: StripId, annotation: Annotation, text: String },
    Offset(StripId),
    Delete(StripId),
    Status,
    Mistakes,
    Help,
    Quit,
}

pub const USAGE: &str = "\
Type a transmission, or one of:
  /complete CS        answer the open request of CS
  /discard CS         drop the open request of CS
  /pause, /resume
  /difficulty N       set difficulty from 1 to 5
  /review CS          review the clearance of CS again
  /strip CS           print a new strip for CS
  /blank              print a blank strip
  /move ID BAY        move a strip to ground, local, spare or printer
  /box ID 10|12 TEXT  write into box 10 or 12 of a strip
  /notes ID TEXT      write free text on a strip
  /offset ID          toggle the offset of a strip
  /delete ID          delete a strip
  /status             list aircraft and strips
  /mistakes           list recorded mistakes
  /quit";

/// Parses a console line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Line>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(Line::Transcript(line.to_owned())));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    let parsed = match name.as_str() {
        "complete" => Line::Complete(callsign(words.next())?),
        "discard" => Line::Discard(callsign(words.next())?),
        "pause" => Line::Pause,
        "resume" => Line::Resume,
        "difficulty" => Line::Difficulty(
            words.next().context("missing difficulty")?.parse().context("invalid difficulty")?,
        ),
        "review" => Line::Review(callsign(words.next())?),
        "strip" => Line::Strip(callsign(words.next())?),
        "blank" => Line::Blank,
        "move" => {
            let id = strip_id(words.next())?;
            let bay = words.next().context("missing bay")?;
            let bay = bay.to_lowercase().parse().with_context(|| format!("unknown bay {bay:?}"))?;
            Line::Move { id, bay }
        }
        "box" => {
            let id = strip_id(words.next())?;
            let annotation = match words.next() {
                Some("10") => Annotation::Box10,
                Some("12") => Annotation::Box12,
                other => bail!("expected box 10 or 12, got {other:?}"),
            };
            Line::Annotate { id, annotation, text: words.collect::<Vec<_>>().join(" ") }
        }
        "notes" => {
            let id = strip_id(words.next())?;
            Line::Annotate { id, annotation: Annotation::Notes, text: words.collect::<Vec<_>>().join(" ") }
        }
        "offset" => Line::Offset(strip_id(words.next())?),
        "delete" => Line::Delete(strip_id(words.next())?),
        "status" => Line::Status,
        "mistakes" => Line::Mistakes,
        "help" | "?" => Line::Help,
        "quit" | "exit" => Line::Quit,
        _ => bail!("unknown command /{name}, type /help for usage"),
    };
    Ok(Some(parsed))
}

fn callsign(word: Option<&str>) -> Result<String> {
    Ok(word.context("missing callsign")?.to_uppercase())
}

fn strip_id(word: Option<&str>) -> Result<StripId> {
    let word = word.context("missing strip id")?;
    Ok(StripId(word.parse().with_context(|| format!("invalid strip id {word:?}"))?))
}
