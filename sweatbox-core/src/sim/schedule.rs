//! Per-tick aircraft workflow and the request lifecycle.
//!
//! Each tick runs, in order:
//! timed transitions, movement with position-triggered transitions,
//! removal of departed aircraft, spawning, then reminders and new requests.

use std::collections::HashSet;
use std::time::Duration;

use bevy::app::{App, Plugin};
use bevy::ecs::change_detection::{Mut, Res, ResMut};
use bevy::ecs::entity::Entity;
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::{Command, Commands, Query, SystemParam};
use bevy::ecs::world::World;
use bevy::math::Vec2;
use rand::seq::IndexedRandom;

use super::aircraft::{self, Aircraft, FlightPlan, Placement, RouteType, Status, Voice};
use super::clock::Clock;
use super::generate::{Generator, VfrPool};
use super::mistake::{self, MistakeKind, MistakeLog};
use super::parking::Spots;
use super::radio::{self, Frequency};
use super::reference::Reference;
use super::request::{AircraftRequest, RequestKind, Requests, Utterance};
use super::strip::{Bay, Bays};
use super::taxi::{self, Navigation, Network, Traffic};
use super::{Tick, TickSets};
use crate::config::{Config, SimRng};
use crate::phonetic;
use crate::try_log::WorldExt;
use crate::try_log_return;

#[cfg(test)]
mod tests;

/// New aircraft are considered at this interval.
pub const SPAWN_PERIOD: Duration = Duration::from_secs(15);
/// After pushback at pilot discretion starts, the aircraft waits this long before calling for taxi.
pub const DISCRETION_TAXI_DELAY: Duration = Duration::from_secs(120);
/// Tower waits this long after handoff before asking for a missing strip.
pub const STRIP_HANDOFF_GRACE: Duration = Duration::from_secs(20);

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_systems(Tick, discretion_system.in_set(TickSets::Transition));
        app.add_systems(Tick, movement_system.in_set(TickSets::Move));
        app.add_systems(Tick, depart_system.in_set(TickSets::Depart));
        app.add_systems(Tick, spawn_system.in_set(TickSets::Spawn));
        app.add_systems(Tick, emit_system.in_set(TickSets::Emit));
    }
}

/// Outputs shared by systems that talk on the frequency.
#[derive(SystemParam)]
struct Feedback<'w> {
    clock:     Res<'w, Clock>,
    frequency: ResMut<'w, Frequency>,
    log:       ResMut<'w, radio::Log>,
    mistakes:  ResMut<'w, MistakeLog>,
}

fn discretion_system(clock: Res<Clock>, mut aircraft_query: Query<&mut Aircraft>) {
    for mut aircraft in &mut aircraft_query {
        if aircraft.status == Status::PushbackDiscretion && clock.now >= aircraft.can_send_at {
            aircraft.set_status(Status::Pushback, clock.now);
            aircraft.can_send_at = clock.now + DISCRETION_TAXI_DELAY;
        }
    }
}

fn movement_system(
    network: Res<Network>,
    reference: Res<Reference>,
    spots: Res<Spots>,
    bays: Res<Bays>,
    mut feedback: Feedback,
    mut aircraft_query: Query<(Entity, &mut Aircraft, &mut Placement, &mut Navigation, &FlightPlan)>,
) {
    let now = feedback.clock.now;
    let snapshot: Vec<(Entity, Vec2)> = aircraft_query
        .iter()
        .filter(|(_, aircraft, ..)| !aircraft.status.is_parked())
        .map(|(entity, _, placement, ..)| (entity, placement.position))
        .collect();

    for (entity, mut aircraft, mut placement, mut navigation, plan) in &mut aircraft_query {
        let others: Vec<Vec2> = snapshot
            .iter()
            .filter(|&&(other, _)| other != entity)
            .map(|&(_, position)| position)
            .collect();
        let traffic = Traffic { others: &others };
        let holding = aircraft.holding;

        match aircraft.status {
            Status::Pushback if !holding => {
                if let Some(location) = spots.pushback_location(&aircraft.parking_spot) {
                    taxi::pushback_step(&mut placement, location);
                }
            }
            Status::Taxi => {
                let remaining =
                    taxi::navigate(&network, &mut placement, &mut navigation, holding, &traffic);
                if remaining.is_some_and(|remaining| remaining < taxi::SEPARATION)
                    && !feedback.frequency.transmitting
                {
                    request_handoff(&mut aircraft, &reference, &mut feedback);
                }
            }
            Status::AwaitingHandoff => {
                taxi::navigate(&network, &mut placement, &mut navigation, holding, &traffic);
            }
            Status::HandedOff => {
                let remaining =
                    taxi::navigate(&network, &mut placement, &mut navigation, holding, &traffic);
                if remaining.is_some_and(|remaining| remaining < taxi::SEPARATION)
                    && now.saturating_sub(aircraft.status_changed) > STRIP_HANDOFF_GRACE
                {
                    if bays.find_flight(Bay::Local, &aircraft.callsign).is_some() {
                        aircraft.set_status(Status::Departed, now);
                    } else {
                        feedback.log.atc(
                            now,
                            &reference.facility.tower_station,
                            format!("Can you pass me the strip for {}?", aircraft.callsign),
                        );
                        feedback.mistakes.add(
                            MistakeKind::StripHandoff,
                            Some(aircraft.callsign.clone()),
                            None,
                        );
                        aircraft.set_status(Status::HandedOffReminded, now);
                    }

                    if plan.route_type.is_vfr_departure() {
                        mistake::review_vfr_departure(
                            &mut feedback.mistakes,
                            plan,
                            &aircraft.actual_type,
                        );
                    }
                }
            }
            Status::HandedOffReminded => {
                taxi::navigate(&network, &mut placement, &mut navigation, holding, &traffic);
                if bays.find_flight(Bay::Local, &aircraft.callsign).is_some() {
                    aircraft.set_status(Status::Departed, now);
                }
            }
            _ => {}
        }
    }
}

/// The aircraft reached the runway without being handed to tower and asks for the switch.
fn request_handoff(aircraft: &mut Aircraft, reference: &Reference, feedback: &mut Feedback<'_>) {
    let now = feedback.clock.now;
    aircraft.set_status(Status::AwaitingHandoff, now);
    feedback.mistakes.add(MistakeKind::AircraftHandoff, Some(aircraft.callsign.clone()), None);
    feedback.log.radio(
        now,
        &aircraft.callsign,
        aircraft.voice,
        "Ground, should we switch to tower?",
        format!(
            "Ground, {}, should we switch to tower?",
            phonetic::phoneticize(&aircraft.callsign, &reference.tables)
        ),
    );
}

fn depart_system(
    mut commands: Commands,
    reference: Res<Reference>,
    bays: Res<Bays>,
    mut mistakes: ResMut<MistakeLog>,
    aircraft_query: Query<(Entity, &Aircraft)>,
) {
    for (entity, aircraft) in &aircraft_query {
        if aircraft.status != Status::Departed {
            continue;
        }

        let strip = bays.find_flight(Bay::Local, &aircraft.callsign);
        mistake::review_departure_strip(&mut mistakes, &aircraft.callsign, strip, &reference);
        bevy::log::info!("{} departed", aircraft.callsign);
        commands.entity(entity).despawn();
    }
}

fn spawn_system(
    mut commands: Commands,
    config: Res<Config>,
    clock: Res<Clock>,
    reference: Res<Reference>,
    mut rng: ResMut<SimRng>,
    mut pool: ResMut<VfrPool>,
    mut spots: ResMut<Spots>,
    mut bays: ResMut<Bays>,
    aircraft_query: Query<(&Aircraft, &Requests)>,
) {
    if !clock.is_multiple_of(SPAWN_PERIOD) {
        return;
    }

    let waiting = aircraft_query
        .iter()
        .filter(|(aircraft, requests)| requests.is_eligible(aircraft.can_send_at, clock.now))
        .count();
    if waiting >= config.max_waiting_aircraft() {
        return;
    }

    let Some(spot) = spots.reserve_random(&mut rng.0).cloned() else {
        bevy::log::debug!("No parking spot available, skipping spawn");
        return;
    };

    let taken: HashSet<String> =
        aircraft_query.iter().map(|(aircraft, _)| aircraft.callsign.clone()).collect();
    let mut generator =
        Generator { reference: &reference, now: clock.now, taken: &taken, rng: &mut rng.0 };
    let Some(flight) = generator.make_flight(&spot, &mut pool) else {
        spots.release(&spot.id);
        return;
    };

    bevy::log::info!(
        "Spawned {} ({}) at {}",
        flight.aircraft.callsign,
        flight.plan.route_type,
        spot.id
    );
    if flight.plan.route_type.is_ifr() {
        bays.print_flight_plan(&flight.plan);
    }
    commands.spawn((
        flight.aircraft,
        flight.placement,
        flight.plan,
        flight.requests,
        Navigation::default(),
    ));
}

fn emit_system(
    config: Res<Config>,
    mut feedback: Feedback,
    mut rng: ResMut<SimRng>,
    mut aircraft_query: Query<(Entity, &Aircraft, &mut Requests)>,
) {
    let now = feedback.clock.now;
    if !feedback.frequency.is_quiet(now, config.silence_interval()) {
        return;
    }

    let due = aircraft_query
        .iter_mut()
        .filter(|(_, _, requests)| {
            requests
                .open
                .as_ref()
                .and_then(|open| open.reminder.as_ref())
                .and_then(|reminder| reminder.send_at)
                .is_some_and(|send_at| now >= send_at)
        })
        .min_by_key(|(_, _, requests)| requests.opened);
    if let Some((_, aircraft, mut requests)) = due {
        if let Some(reminder) = requests.open.as_mut().and_then(|open| open.reminder.take()) {
            feedback.frequency.last_transmission = now;
            feedback.log.radio(
                now,
                &aircraft.callsign,
                aircraft.voice,
                reminder.message.text,
                reminder.message.phonetic,
            );
            feedback.mistakes.add(reminder.kind, Some(aircraft.callsign.clone()), None);
        }
        return;
    }

    let open_count = aircraft_query.iter().filter(|(_, _, requests)| requests.is_open()).count();
    if open_count >= config.max_open_requests() {
        return;
    }

    let eligible: Vec<(Entity, u8)> = aircraft_query
        .iter()
        .filter(|(_, aircraft, requests)| requests.is_eligible(aircraft.can_send_at, now))
        .filter_map(|(entity, _, requests)| Some((entity, requests.queue.front()?.priority)))
        .collect();
    let Some(max_priority) = eligible.iter().map(|&(_, priority)| priority).max() else { return };
    let candidates: Vec<Entity> = eligible
        .iter()
        .filter(|&&(_, priority)| priority == max_priority)
        .map(|&(entity, _)| entity)
        .collect();
    let Some(&chosen) = candidates.choose(&mut rng.0) else { return };

    let Ok((_, aircraft, mut requests)) = aircraft_query.get_mut(chosen) else { return };
    if let Some(request) = requests.queue.pop_front() {
        let (request, sequence) = open_request(
            request,
            &aircraft.callsign,
            aircraft.voice,
            now,
            &mut feedback.frequency,
            &mut feedback.log,
        );
        requests.open = Some(request);
        requests.opened = sequence;
    }
}

/// Announces a request on the frequency and arms its reminder.
///
/// Returns the request to store as open and its opening sequence number.
fn open_request(
    mut request: AircraftRequest,
    callsign: &str,
    voice: Voice,
    now: Duration,
    frequency: &mut Frequency,
    log: &mut radio::Log,
) -> (AircraftRequest, u64) {
    if let Some(utterance) = &request.request {
        log.radio(now, callsign, voice, utterance.text.clone(), utterance.phonetic.clone());
    }
    if let Some(reminder) = &mut request.reminder {
        reminder.send_at = Some(now + reminder.delay);
    }
    frequency.last_transmission = now;
    bevy::log::debug!("{callsign} opened {} request", request.kind);
    (request, frequency.next_sequence())
}

/// Completes the open request of an aircraft.
///
/// Returns `false` if the aircraft does not exist or has no open request.
pub fn complete_request(world: &mut World, callsign: &str, by_voice: bool) -> bool {
    let Some(entity) = aircraft::find(world, callsign) else {
        bevy::log::debug!("Cannot complete request of unknown aircraft {callsign}");
        return false;
    };
    let now = world.resource::<Clock>().now;
    let Some(request) = world.get_mut::<Requests>(entity).and_then(|mut requests| requests.open.take())
    else {
        bevy::log::debug!("{callsign} has no open request to complete");
        return false;
    };
    let Some(voice) = world.get::<Aircraft>(entity).map(|aircraft| aircraft.voice) else {
        return false;
    };
    bevy::log::info!("Completing {} request of {callsign}", request.kind);

    if let Some(atc_message) = &request.atc_message
        && !by_voice
    {
        let station = world.resource::<Reference>().facility.ground_station.clone();
        world.resource_mut::<radio::Log>().controller(now, &station, atc_message.clone());
    }

    if let Some(response) = &request.response {
        let response = match world.get::<FlightPlan>(entity) {
            Some(plan) if request.kind == RequestKind::ClearanceIfr && plan.route != plan.original_route => {
                amended_clearance(plan, world.resource::<Reference>())
            }
            _ => response.clone(),
        };
        world.resource_mut::<radio::Log>().radio(now, callsign, voice, response.text, response.phonetic);
        world.resource_mut::<Frequency>().last_transmission = now;
    }

    if let Some(mut aircraft) = world.get_mut::<Aircraft>(entity) {
        aircraft.can_send_at = now + request.next_request_delay;
    }

    if let Some(subsequent) = request.subsequent {
        let (opened, sequence) = world.resource_scope(|world, mut frequency: Mut<Frequency>| {
            let mut log = world.resource_mut::<radio::Log>();
            open_request(*subsequent, callsign, voice, now, &mut frequency, &mut log)
        });
        if let Some(mut requests) = world.get_mut::<Requests>(entity) {
            requests.open = Some(opened);
            requests.opened = sequence;
        }
    }

    match request.next_status {
        Some(Status::HandedOff) => {
            let spot = world.get_mut::<Aircraft>(entity).map(|mut aircraft| {
                aircraft.holding = false;
                aircraft.parking_spot.clone()
            });
            if let Some(spot) = spot {
                world.resource_mut::<Spots>().release(&spot);
            }
        }
        Some(Status::ClearedIfr) => review_clearance(world, entity),
        _ => {}
    }

    if let Some(status) = request.next_status
        && let Some(mut aircraft) = world.get_mut::<Aircraft>(entity)
    {
        aircraft.set_status(status, now);
    }

    true
}

/// The clearance response reading back a route amended by the controller.
fn amended_clearance(plan: &FlightPlan, reference: &Reference) -> Utterance {
    let tables = &reference.tables;
    let destination = phonetic::destination_name(&plan.destination, tables);
    Utterance::new(
        format!("Cleared to {destination} via {}, squawk {}", plan.route, plan.squawk),
        format!(
            "{} cleared to {destination} airport via {}, squawk {}",
            phonetic::phoneticize(&plan.callsign, tables),
            plan.route,
            phonetic::spell(&plan.squawk),
        ),
    )
}

/// Drops the open request of an aircraft without any effect other than resetting the silence
/// timer.
///
/// Returns `false` if the aircraft does not exist or has no open request.
pub fn discard_request(world: &mut World, callsign: &str) -> bool {
    let now = world.resource::<Clock>().now;
    world.resource_mut::<Frequency>().last_transmission = now;

    let Some(entity) = aircraft::find(world, callsign) else {
        bevy::log::debug!("Cannot discard request of unknown aircraft {callsign}");
        return false;
    };
    let discarded = world.get_mut::<Requests>(entity).and_then(|mut requests| requests.open.take());
    if let Some(request) = &discarded {
        bevy::log::info!("Discarded {} request of {callsign}", request.kind);
    }
    discarded.is_some()
}

/// Runs the IFR clearance checks against the current flight plan of an aircraft.
pub fn review_clearance(world: &mut World, entity: Entity) {
    let Some(plan) = world.log_get::<FlightPlan>(entity).cloned() else { return };
    let Some(actual_type) = world.log_get::<Aircraft>(entity).map(|aircraft| aircraft.actual_type.clone())
    else {
        return;
    };
    world.resource_scope(|world, mut mistakes: Mut<MistakeLog>| {
        let reference = world.resource::<Reference>();
        mistake::review_clearance(&mut mistakes, &plan, &actual_type, reference);
    });
}

/// Completes the open request of an aircraft, as if the controller clicked it.
pub struct CompleteRequest {
    pub callsign: String,
    pub by_voice: bool,
}

impl Command for CompleteRequest {
    fn apply(self, world: &mut World) { complete_request(world, &self.callsign, self.by_voice); }
}

pub struct DiscardRequest {
    pub callsign: String,
}

impl Command for DiscardRequest {
    fn apply(self, world: &mut World) { discard_request(world, &self.callsign); }
}

/// Re-runs the clearance review for an aircraft, e.g. after amending its flight plan.
pub struct ReviewClearance {
    pub callsign: String,
}

impl Command for ReviewClearance {
    fn apply(self, world: &mut World) {
        let entity = try_log_return!(
            aircraft::find(world, &self.callsign),
            expect "Cannot review clearance of unknown aircraft {}", self.callsign
        );
        review_clearance(world, entity);
    }
}
