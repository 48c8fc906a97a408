//! Resolution of a normalized transmission to an aircraft and its open request.

use bevy::ecs::change_detection::Mut;
use bevy::ecs::entity::Entity;
use bevy::ecs::system::Command;
use bevy::ecs::world::World;
use itertools::Itertools;

use super::keywords::{self, Template};
use super::similarity;
use crate::phonetic;
use crate::sim::aircraft::{Aircraft, FlightPlan, Status};
use crate::sim::clock::Clock;
use crate::sim::mistake::{self, MistakeLog, PhraseologyKind, RequestContext};
use crate::sim::parking::Spots;
use crate::sim::radio::Log;
use crate::sim::reference::Reference;
use crate::sim::request::{RequestKind, Requests};
use crate::sim::schedule;

#[cfg(test)]
mod tests;

/// Callsigns scoring below this are not considered identified.
pub const CALLSIGN_THRESHOLD: f64 = 0.5;

/// Interprets a normalized transmission.
pub fn interpret(world: &mut World, transcript: &str) {
    let Some(reference) = world.get_resource::<Reference>() else { return };
    let station = reference.facility.ground_station.clone();
    let now = world.resource::<Clock>().now;

    mistake::review_general_phraseology(&mut world.resource_mut::<MistakeLog>(), transcript);
    world.resource_mut::<Log>().controller(now, &station, transcript);

    let spoken = transcript.split(' ').next().unwrap_or_default();
    let aircraft: Vec<(Entity, String)> = world
        .query::<(Entity, &Aircraft)>()
        .iter(world)
        .map(|(entity, aircraft)| (entity, aircraft.callsign.clone()))
        .collect();
    let best = similarity::best_match(spoken, aircraft.iter().map(|(_, callsign)| callsign.as_str()));
    let Some((index, _)) = best.filter(|&(_, score)| score >= CALLSIGN_THRESHOLD) else {
        bevy::log::debug!("Unidentified callsign {spoken:?}");
        world.resource_mut::<Log>().system(now, format!("Could not identify callsign {spoken}"), true);
        return;
    };
    if spoken.len() == transcript.len() {
        return;
    }
    let (entity, ref callsign) = aircraft[index];

    let Some(status) = world.get::<Aircraft>(entity).map(|aircraft| aircraft.status) else { return };
    if status.is_off_frequency() {
        world
            .resource_mut::<Log>()
            .system(now, format!("Aircraft {spoken} is no longer on your frequency"), true);
        return;
    }

    let first_contact = world
        .get_mut::<Aircraft>(entity)
        .is_some_and(|mut aircraft| !std::mem::replace(&mut aircraft.spoken_to, true));
    if first_contact && !transcript.contains("ground") {
        world.resource_mut::<MistakeLog>().add_phraseology(
            PhraseologyKind::ForgotToIdentify,
            Some(callsign.clone()),
            None,
        );
    }

    Interpreter { world, entity, callsign, transcript, now }.run();
}

struct Interpreter<'a> {
    world:      &'a mut World,
    entity:     Entity,
    callsign:   &'a str,
    transcript: &'a str,
    now:        std::time::Duration,
}

impl Interpreter<'_> {
    fn run(mut self) {
        if self.global_alternative() || self.hold_or_continue() {
            return;
        }

        let has_open = self
            .world
            .get::<Requests>(self.entity)
            .is_some_and(Requests::is_open);
        if has_open && (self.skip_pushback() || self.match_open_request()) {
            return;
        }

        self.respond("I didn't understand that", None);
    }

    fn status(&self) -> Status {
        self.world.get::<Aircraft>(self.entity).map_or(Status::Ramp, |aircraft| aircraft.status)
    }

    /// Sends a transmission of the addressed aircraft.
    fn respond(&mut self, text: &str, phonetic: Option<&str>) {
        let Some(voice) = self.world.get::<Aircraft>(self.entity).map(|aircraft| aircraft.voice) else {
            return;
        };
        let Some(reference) = self.world.get_resource::<Reference>() else { return };
        let spoken = format!(
            "{} {}",
            phonetic::phoneticize(self.callsign, &reference.tables),
            phonetic.unwrap_or(text)
        );
        let now = self.now;
        self.world.resource_mut::<Log>().radio(now, self.callsign, voice, text, spoken);
    }

    fn global_alternative(&mut self) -> bool {
        let (Some(aircraft), Some(plan), Some(reference)) = (
            self.world.get::<Aircraft>(self.entity),
            self.world.get::<FlightPlan>(self.entity),
            self.world.get_resource::<Reference>(),
        ) else {
            return false;
        };

        let templates = keywords::global_alternatives(aircraft, plan, &reference.facility);
        let Some(template) =
            templates.into_iter().find(|template| template.matches(self.transcript, aircraft.status))
        else {
            return false;
        };

        if let Some(response) = template.response {
            self.respond(&response.text, response.phonetic.as_deref());
        }
        true
    }

    fn hold_or_continue(&mut self) -> bool {
        if !self.status().accepts_hold() {
            return false;
        }

        let (holding, text) = if self.transcript.contains("hold position") {
            (true, "Holding position")
        } else if self.transcript.contains("continue") || self.transcript.contains("resume") {
            (false, "Continuing")
        } else {
            return false;
        };

        if let Some(mut aircraft) = self.world.get_mut::<Aircraft>(self.entity) {
            aircraft.holding = holding;
        }
        let phonetic = text.to_lowercase();
        self.respond(text, Some(&phonetic));
        true
    }

    /// Pushback at pilot discretion approved together with the clearance readback.
    fn skip_pushback(&mut self) -> bool {
        let Some(requests) = self.world.get::<Requests>(self.entity) else { return false };
        let Some(open) = &requests.open else { return false };
        if open.kind != RequestKind::ReadbackIfr
            || requests.queue.front().is_none_or(|next| next.kind != RequestKind::Pushback)
        {
            return false;
        }
        if !(self.transcript.contains("readback") && self.transcript.contains("discretion")) {
            return false;
        }
        let delay = open.next_request_delay;

        let Some(spot) = self.world.get::<Aircraft>(self.entity).map(|aircraft| aircraft.parking_spot.clone())
        else {
            return false;
        };
        if self.world.resource::<Spots>().pushback_into_ramp(&spot) != Some(true) {
            self.world.resource_mut::<MistakeLog>().add_phraseology(
                PhraseologyKind::PushbackKeyword,
                Some(self.transcript.into()),
                Some(format!("{} (onto taxiway)", self.callsign)),
            );
            return false;
        }

        schedule::discard_request(self.world, self.callsign);
        if let Some(mut requests) = self.world.get_mut::<Requests>(self.entity) {
            requests.queue.pop_front();
        }
        if let Some(mut aircraft) = self.world.get_mut::<Aircraft>(self.entity) {
            aircraft.can_send_at = self.now + delay;
            aircraft.set_status(Status::PushbackDiscretion, self.now);
        }
        self.respond(
            "Pushback our discretion, will call for taxi",
            Some("pushback our discretion, will call for taxi"),
        );
        true
    }

    /// Matches the transmission against the template of the open request.
    ///
    /// Returns `false` if the transmission was not understood at all.
    fn match_open_request(&mut self) -> bool {
        let status = self.status();
        let Some(reference) = self.world.get_resource::<Reference>() else { return false };
        let frequency_marker =
            keywords::frequency_marker(&reference.facility.departure_frequency).to_string();
        let Some(kind) = self
            .world
            .get::<Requests>(self.entity)
            .and_then(|requests| requests.open.as_ref())
            .map(|open| open.kind)
        else {
            return false;
        };
        let template = keywords::for_request(kind, &reference.facility);

        if template.matches(self.transcript, status) {
            self.complete(&frequency_marker);
            return true;
        }

        if let Some(alternative) = template.matching_alternative(self.transcript, status) {
            if let Some(response) = &alternative.response {
                self.respond(&response.text, response.phonetic.as_deref());
            }
            return true;
        }

        self.accumulate(&template, &frequency_marker)
    }

    /// Combines the required phrases of this transmission with those heard before.
    fn accumulate(&mut self, template: &Template, frequency_marker: &str) -> bool {
        let transcript = self.transcript;
        let Some(mut requests) = self.world.get_mut::<Requests>(self.entity) else { return false };
        let Some(open) = &mut requests.open else { return false };

        let mut matched = open.matched_keywords.clone();
        let mut missing = Vec::new();
        for phrase in &template.required {
            if transcript.contains(phrase.phrase.as_str()) {
                if !matched.contains(&phrase.phrase) {
                    matched.push(phrase.phrase.clone());
                }
            } else if !matched.contains(&phrase.phrase)
                && let Some(prompt) = &phrase.missing
                && !missing.contains(prompt)
            {
                missing.push(prompt.clone());
            }
        }

        // the at-least-one-of group only counts phrases of the current transmission
        if matched.len() == template.required.len() && template.any_of_matches(transcript) {
            self.complete(frequency_marker);
            return true;
        }

        open.matched_keywords = matched;
        open.previous_instructions.push(transcript.to_string());
        if missing.is_empty() {
            return false;
        }

        let prompt = format!("I didn't catch the {}", join_missing(&missing));
        self.respond(&prompt, None);
        true
    }

    /// Reviews the phraseology of the transmissions that completed the open request,
    /// then completes it.
    fn complete(&mut self, frequency_marker: &str) {
        let spot = self.world.get::<Aircraft>(self.entity).map(|aircraft| aircraft.parking_spot.clone());
        let pushback_into_ramp =
            spot.and_then(|spot| self.world.resource::<Spots>().pushback_into_ramp(&spot));
        let Some(request) =
            self.world.get::<Requests>(self.entity).and_then(|requests| requests.open.clone())
        else {
            return;
        };

        let context = RequestContext { callsign: self.callsign, pushback_into_ramp, frequency_marker };
        let transcript = self.transcript;
        self.world.resource_scope(|_, mut mistakes: Mut<MistakeLog>| {
            mistake::review_request_phraseology(&mut mistakes, &request, transcript, &context);
        });
        schedule::complete_request(self.world, self.callsign, true);
    }
}

/// Joins prompts as `a, b, or c`.
fn join_missing(missing: &[String]) -> String {
    match missing {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}, or {last}", init.iter().join(", ")),
    }
}

/// Interprets a normalized transmission.
pub struct Interpret(pub String);

impl Command for Interpret {
    fn apply(self, world: &mut World) { interpret(world, &self.0); }
}
