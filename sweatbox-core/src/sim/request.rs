//! Scripted radio requests.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::ecs::component::Component;

use super::aircraft::Status;
use super::mistake::MistakeKind;

/// What an aircraft is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum RequestKind {
    /// Asks for an IFR clearance.
    #[strum(serialize = "clearanceIFR")]
    ClearanceIfr,
    /// Reads back an IFR clearance and waits for confirmation.
    #[strum(serialize = "readbackIFR")]
    ReadbackIfr,
    /// Asks for a VFR departure.
    #[strum(serialize = "clearanceVFR")]
    ClearanceVfr,
    /// Reads back a VFR clearance and waits for taxi.
    #[strum(serialize = "readbackVFR")]
    ReadbackVfr,
    /// Asks for taxi for pattern work.
    Pattern,
    /// Asks for pushback.
    Pushback,
    /// Asks for taxi.
    Taxi,
    /// Asks to switch to tower.
    Handoff,
}

/// A line of radio text in display and synthesis forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text:     String,
    pub phonetic: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, phonetic: impl Into<String>) -> Self {
        Self { text: text.into(), phonetic: phonetic.into() }
    }
}

/// A nudge the aircraft sends if its request stays open for too long.
#[derive(Debug, Clone)]
pub struct Reminder {
    pub message: Utterance,
    /// Delay after the request opens.
    pub delay:   Duration,
    /// The procedural mistake recorded when the reminder fires.
    pub kind:    MistakeKind,
    /// Set when the request opens.
    pub send_at: Option<Duration>,
}

/// One unit of pending radio interaction.
#[derive(Debug, Clone)]
pub struct AircraftRequest {
    pub kind:                  RequestKind,
    /// Higher values are emitted first.
    pub priority:              u8,
    /// Said by the aircraft when the request opens.
    pub request:               Option<Utterance>,
    /// Said by the aircraft when the request completes.
    pub response:              Option<Utterance>,
    /// Logged as the controller's action when completed manually.
    pub atc_message:           Option<String>,
    /// The aircraft waits this long after completion before its next request.
    pub next_request_delay:    Duration,
    pub next_status:           Option<Status>,
    pub reminder:              Option<Reminder>,
    /// Opened in place of this request when it completes.
    pub subsequent:            Option<Box<AircraftRequest>>,
    /// Required phrases heard so far over multiple transmissions.
    pub matched_keywords:      Vec<String>,
    /// Earlier transmissions that partially matched this request.
    pub previous_instructions: Vec<String>,
}

impl AircraftRequest {
    /// A request with no text, delay, status change, reminder or follow-up.
    pub fn new(kind: RequestKind, priority: u8) -> Self {
        Self {
            kind,
            priority,
            request: None,
            response: None,
            atc_message: None,
            next_request_delay: Duration::ZERO,
            next_status: None,
            reminder: None,
            subsequent: None,
            matched_keywords: Vec::new(),
            previous_instructions: Vec::new(),
        }
    }

    /// Length of the chain starting at this request.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        1 + self.subsequent.as_ref().map_or(0, |next| next.chain_len())
    }
}

/// The request queue of one aircraft.
///
/// An aircraft has at most one open request by construction.
#[derive(Debug, Default, Component)]
pub struct Requests {
    /// Requests not issued yet, in order.
    pub queue:   VecDeque<AircraftRequest>,
    /// The request the aircraft has made and is waiting on.
    pub open:    Option<AircraftRequest>,
    /// Frequency sequence number of when [`open`](Self::open) was opened.
    pub opened:  u64,
}

impl Requests {
    pub fn new(queue: impl IntoIterator<Item = AircraftRequest>) -> Self {
        Self { queue: queue.into_iter().collect(), open: None, opened: 0 }
    }

    #[must_use]
    pub fn is_open(&self) -> bool { self.open.is_some() }

    /// Whether the aircraft is ready to make its next queued request.
    #[must_use]
    pub fn is_eligible(&self, can_send_at: Duration, now: Duration) -> bool {
        !self.queue.is_empty() && can_send_at <= now && self.open.is_none()
    }
}
