//! The shared frequency and the transcript log.

use std::time::Duration;

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;

use super::aircraft::Voice;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Frequency>();
        app.init_resource::<Log>();
    }
}

/// State of the ground frequency.
#[derive(Debug, Default, Resource)]
pub struct Frequency {
    /// Whether the controller is currently transmitting (push-to-talk held).
    pub transmitting:      bool,
    /// Last time an aircraft transmission was emitted or a request was resolved.
    pub last_transmission: Duration,
    next_sequence:         u64,
}

impl Frequency {
    /// Allocates a monotonic sequence number for ordering open requests.
    pub fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// Whether aircraft may start a new transmission.
    #[must_use]
    pub fn is_quiet(&self, now: Duration, silence: Duration) -> bool {
        !self.transmitting && now.saturating_sub(self.last_transmission) > silence
    }
}

/// Who a log entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Class {
    /// Simulator feedback that is not part of the radio exchange.
    #[strum(serialize = "system")]
    System,
    /// Coordination from another controller position.
    #[strum(serialize = "ATC")]
    Atc,
    /// A transmission from an aircraft.
    #[strum(serialize = "radio")]
    Radio,
    /// A transmission or action of the controller.
    #[strum(serialize = "self")]
    Controller,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub time:      Duration,
    /// Callsign or station identifier, empty for system messages.
    pub station:   String,
    pub content:   String,
    /// Text for speech synthesis, if the entry should be spoken.
    pub phonetic:  Option<String>,
    pub class:     Class,
    /// Synthesis voice of the transmitting aircraft.
    pub voice:     Option<Voice>,
    /// Whether the entry is accompanied by an audible error cue.
    pub error_cue: bool,
}

/// Append-only transcript of everything said and reported.
#[derive(Debug, Default, Resource)]
pub struct Log {
    entries: Vec<Entry>,
}

impl Log {
    #[must_use]
    pub fn entries(&self) -> &[Entry] { &self.entries }

    #[must_use]
    pub fn last(&self) -> Option<&Entry> { self.entries.last() }

    pub fn push(&mut self, entry: Entry) {
        bevy::log::debug!("[{}] {}: {}", entry.class, entry.station, entry.content);
        self.entries.push(entry);
    }

    /// Logs a transmission from an aircraft.
    pub fn radio(
        &mut self,
        time: Duration,
        callsign: &str,
        voice: Voice,
        content: impl Into<String>,
        phonetic: impl Into<String>,
    ) {
        self.push(Entry {
            time,
            station: callsign.into(),
            content: content.into(),
            phonetic: Some(phonetic.into()),
            class: Class::Radio,
            voice: Some(voice),
            error_cue: false,
        });
    }

    /// Logs a message from a neighbouring controller position.
    pub fn atc(&mut self, time: Duration, station: &str, content: impl Into<String>) {
        self.push(Entry {
            time,
            station: station.into(),
            content: content.into(),
            phonetic: None,
            class: Class::Atc,
            voice: None,
            error_cue: false,
        });
    }

    /// Logs a transmission or action of the controller.
    pub fn controller(&mut self, time: Duration, station: &str, content: impl Into<String>) {
        self.push(Entry {
            time,
            station: station.into(),
            content: content.into(),
            phonetic: None,
            class: Class::Controller,
            voice: None,
            error_cue: false,
        });
    }

    /// Logs simulator feedback, optionally with an audible error cue.
    pub fn system(&mut self, time: Duration, content: impl Into<String>, error_cue: bool) {
        self.push(Entry {
            time,
            station: String::new(),
            content: content.into(),
            phonetic: None,
            class: Class::System,
            voice: None,
            error_cue,
        });
    }
}
