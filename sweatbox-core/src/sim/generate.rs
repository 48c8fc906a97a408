//! Creation of new aircraft with their flight plans and request chains.

use std::collections::HashSet;
use std::time::Duration;

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::math::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use store::{AircraftCategory, Direction, ParkingSpot, PrefRoute, SpotKind, TaxiInstruction};

use super::aircraft::{Aircraft, FlightPlan, Placement, RouteType, Status, Voice};
use super::mistake::MistakeKind;
use super::reference::Reference;
use super::request::{AircraftRequest, Reminder, RequestKind, Requests, Utterance};
use crate::phonetic;


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.init_resource::<VfrPool>(); }
}

/// Probability that a generated IFR route is deliberately wrong.
const ROUTE_CORRUPTION_CHANCE: f64 = 0.25;
/// Attempts to find a callsign not used by a live aircraft.
const CALLSIGN_ATTEMPTS: usize = 16;
/// Delay before a reminder is sent for an unanswered readback.
const REMINDER_DELAY: Duration = Duration::from_secs(20);
/// Letters used in N-numbers. I, O and V are not issued.
const REGISTRATION_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUWXYZ";
/// Number of distinct synthesis voice slots handed out.
const VOICE_SLOTS: u32 = 64;

/// A VFR scenario waiting to be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfrVariant {
    Pattern,
    Departure { flight_following: bool },
}

/// The rotating pool of VFR scenarios.
///
/// Each round contains one pattern flight and two departures each with and without flight
/// following, drawn in random order.
#[derive(Debug, Default, Resource)]
pub struct VfrPool {
    remaining: Vec<VfrVariant>,
}

impl VfrPool {
    /// Removes a random variant from the pool, refilling it first if exhausted.
    pub fn draw(&mut self, rng: &mut impl Rng) -> VfrVariant {
        if self.remaining.is_empty() {
            self.remaining = vec![
                VfrVariant::Pattern,
                VfrVariant::Departure { flight_following: true },
                VfrVariant::Departure { flight_following: true },
                VfrVariant::Departure { flight_following: false },
                VfrVariant::Departure { flight_following: false },
            ];
            self.remaining.shuffle(rng);
        }
        self.remaining.pop().unwrap_or(VfrVariant::Pattern)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.remaining.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.remaining.is_empty() }
}

/// The components of a newly generated aircraft.
pub struct Flight {
    pub aircraft:  Aircraft,
    pub placement: Placement,
    pub plan:      FlightPlan,
    pub requests:  Requests,
}

/// Shared inputs of flight generation.
pub struct Generator<'a, R> {
    pub reference: &'a Reference,
    pub now:       Duration,
    /// Callsigns of live aircraft.
    pub taken:     &'a HashSet<String>,
    pub rng:       &'a mut R,
}

impl<R: Rng> Generator<'_, R> {
    /// Generates an aircraft parked at `spot`.
    ///
    /// Returns `None` if the reference data has no usable route or aircraft type for the spot.
    pub fn make_flight(&mut self, spot: &ParkingSpot, pool: &mut VfrPool) -> Option<Flight> {
        match spot.kind {
            SpotKind::Airline => self.make_ifr_flight(spot, false),
            SpotKind::Tec => self.make_ifr_flight(spot, true),
            SpotKind::Ga => {
                let variant = pool.draw(self.rng);
                self.make_vfr_flight(spot, variant)
            }
        }
    }

    fn make_ifr_flight(&mut self, spot: &ParkingSpot, tec: bool) -> Option<Flight> {
        let reference = self.reference;
        let tables = &reference.tables;
        let category = if tec { &tables.tec } else { &tables.jet };
        let actual_type = category.types.choose(self.rng)?.clone();

        let routes = reference.routes.get(tec);
        let Some(route) = pick_route(routes, self.rng) else {
            bevy::log::debug!("No {} routes available for spot {}", if tec { "TEC" } else { "H" }, spot.id);
            return None;
        };
        let filed = self.corrupt_route(route.filed_route(), routes, &route);

        let callsign = self.unique_callsign(|rng| match &spot.airline {
            Some(airline) => format!("{airline}{}", flight_number(rng)),
            None => registration(rng),
        });

        let destination = route.icao_destination();
        let direction = self
            .reference
            .destination(&destination)
            .map_or(Direction::West, |destination| destination.direction);

        let plan = FlightPlan {
            aircraft_type: actual_type.clone(),
            equipment: category.equipment.sample(self.rng).cloned().unwrap_or_default(),
            speed: random_speed(category, self.rng),
            altitude: self.ifr_altitude(tec, direction),
            departure: reference.facility.airport.clone(),
            destination,
            route: filed.clone(),
            original_route: filed,
            squawk: squawk(self.rng),
            cid: format!("{:03}", self.rng.random_range(0..1000)),
            planned_time: format!("P12{:02}", self.rng.random_range(0..60)),
            print_count: 1,
            created: true,
            ..FlightPlan::blank(
                callsign.clone(),
                if tec { RouteType::Tec } else { RouteType::High },
            )
        };

        let with_pushback = spot.kind == SpotKind::Airline;
        let mut queue = vec![self.clearance_request(&plan, with_pushback)];
        if with_pushback {
            queue.push(self.pushback_request(&callsign, spot));
            queue.push(self.taxi_request(&callsign, None, spot.taxi_instruction.as_ref()));
        } else {
            queue.push(self.taxi_request(
                &callsign,
                Some(&spot.location),
                spot.taxi_instruction.as_ref(),
            ));
        }

        Some(self.assemble(spot, callsign, actual_type, category, plan, queue))
    }

    fn make_vfr_flight(&mut self, spot: &ParkingSpot, variant: VfrVariant) -> Option<Flight> {
        let reference = self.reference;
        let category = &reference.tables.ga;
        let actual_type = category.types.choose(self.rng)?.clone();
        let callsign = self.unique_callsign(registration);

        let mut plan = FlightPlan {
            squawk: squawk(self.rng),
            cid: format!("{:03}", self.rng.random_range(0..1000)),
            planned_time: format!("P12{:02}", self.rng.random_range(0..60)),
            ..FlightPlan::blank(callsign.clone(), RouteType::Vfr)
        };

        let request = match variant {
            VfrVariant::Pattern => {
                plan.route_type = RouteType::Pattern;
                self.pattern_request(&callsign, &actual_type)
            }
            VfrVariant::Departure { flight_following } => {
                self.vfr_departure_request(&mut plan, &actual_type, flight_following)?
            }
        };

        Some(self.assemble(spot, callsign, actual_type, category, plan, vec![request]))
    }

    fn assemble(
        &mut self,
        spot: &ParkingSpot,
        callsign: String,
        actual_type: String,
        category: &AircraftCategory,
        plan: FlightPlan,
        queue: Vec<AircraftRequest>,
    ) -> Flight {
        let voice = Voice {
            slot:  self.rng.random_range(0..VOICE_SLOTS),
            pitch: self.rng.random_range(0.8..1.2),
        };
        let mut aircraft = Aircraft::new(callsign, actual_type, spot.id.clone(), voice, self.now);
        aircraft.size = category.size;

        Flight {
            aircraft,
            placement: Placement {
                position: Vec2::new(spot.position.x, spot.position.y),
                rotation: spot.rotation,
            },
            plan,
            requests: Requests::new(queue),
        }
    }

    fn unique_callsign(&mut self, mut generate: impl FnMut(&mut R) -> String) -> String {
        let mut callsign = generate(self.rng);
        for _ in 1..CALLSIGN_ATTEMPTS {
            if !self.taken.contains(&callsign) {
                break;
            }
            callsign = generate(self.rng);
        }
        callsign
    }

    /// Occasionally replaces the filed route with a wrong one.
    fn corrupt_route(&mut self, filed: String, routes: &[PrefRoute], chosen: &PrefRoute) -> String {
        if !self.rng.random_bool(ROUTE_CORRUPTION_CHANCE) {
            return filed;
        }

        let roll: f64 = self.rng.random();
        if roll < 0.33 {
            return ["IFR DIRECT", "DIRECT", ""].choose(self.rng).copied().unwrap_or_default().into();
        }

        if roll < 0.44 {
            let others: Vec<_> =
                routes.iter().filter(|route| route.destination != chosen.destination).collect();
            return match others.choose(self.rng) {
                Some(other) => other.filed_route(),
                None => filed,
            };
        }

        let mut tokens: Vec<&str> = filed.split_whitespace().collect();
        let dropped = self.rng.random_range(0..tokens.len().div_ceil(2).max(1));
        if self.rng.random_bool(0.5) {
            tokens.truncate(tokens.len().saturating_sub(dropped + 1));
        } else {
            tokens.drain(..dropped);
        }
        tokens.join(" ")
    }

    /// Usually an altitude valid for the direction of flight,
    /// sometimes one for the opposite direction, sometimes written in feet.
    fn ifr_altitude(&mut self, tec: bool, direction: Direction) -> String {
        let reference = self.reference;
        let altitudes = &reference.tables.altitudes;
        let spawnable = if tec { &altitudes.spawnable_tec } else { &altitudes.spawnable_high };
        let opposite = match direction {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        };

        let roll: f64 = self.rng.random();
        let (table, malformed) = if roll < 0.7 {
            (spawnable.get(direction), false)
        } else if roll < 0.85 {
            (spawnable.get(opposite), false)
        } else {
            (spawnable.get(direction), true)
        };

        let altitude = table.choose(self.rng).cloned().unwrap_or_default();
        if malformed {
            format!("{}00", altitude.trim_start_matches('0'))
        } else {
            altitude
        }
    }

    fn callsign_phonetic(&self, callsign: &str) -> String {
        phonetic::phoneticize(callsign, &self.reference.tables)
    }

    fn clearance_request(&mut self, plan: &FlightPlan, with_pushback: bool) -> AircraftRequest {
        let reference = self.reference;
        let facility = &reference.facility;
        let tables = &reference.tables;
        let callsign = &plan.callsign;
        let cs = self.callsign_phonetic(callsign);
        let destination = phonetic::destination_name(&plan.destination, tables);

        let mut readback = AircraftRequest::new(RequestKind::ReadbackIfr, 1);
        let next = if with_pushback { "pushback" } else { "taxi" };
        readback.response =
            Some(Utterance::new(format!("Will call for {next}"), format!("{cs} will call for {next}")));
        readback.reminder = Some(Reminder {
            message: Utterance::new(
                "Ground, did you copy our readback?",
                format!("Ground, {cs}, did you copy our readback?"),
            ),
            delay:   REMINDER_DELAY,
            kind:    MistakeKind::ReadbackIfr,
            send_at: None,
        });
        readback.atc_message = Some(format!("Readback correct for {callsign}"));
        readback.next_request_delay = self.long_delay();

        let mut clearance = AircraftRequest::new(RequestKind::ClearanceIfr, 1);
        clearance.request = Some(Utterance::new(
            format!("Request IFR clearance to {destination}"),
            format!(
                "{}, {cs} request IFR clearance to the {destination} airport",
                facility.ground_name
            ),
        ));
        clearance.response = Some(Utterance::new(
            format!("Cleared to {destination}, squawk {}", plan.squawk),
            format!(
                "{cs} cleared to {destination} airport, squawk {}",
                phonetic::spell(&plan.squawk)
            ),
        ));
        clearance.atc_message = Some(format!("Clearance sent to {callsign}"));
        clearance.next_status = Some(Status::ClearedIfr);
        clearance.subsequent = Some(Box::new(readback));
        clearance
    }

    fn pushback_request(&mut self, callsign: &str, spot: &ParkingSpot) -> AircraftRequest {
        let reference = self.reference;
        let cs = self.callsign_phonetic(callsign);
        let atis = phonetic::atis(reference.facility.atis);
        let response = if spot.pushback_into_ramp {
            "pushback into the ramp at our discretion, will call for taxi"
        } else {
            "pushback approved, will call for taxi"
        };

        let mut request = AircraftRequest::new(RequestKind::Pushback, 1);
        request.request = Some(Utterance::new(
            format!("Request pushback with {atis} from gate {}", spot.location),
            format!("{cs} request pushback with {atis} from gate {}", spot.location),
        ));
        request.response =
            Some(Utterance::new(capitalize_first(response), format!("{cs} {response}")));
        request.atc_message = Some(format!("Push approved for {callsign}"));
        request.next_request_delay = self.long_delay();
        request.next_status = Some(Status::Pushback);
        request
    }

    fn taxi_request(
        &mut self,
        callsign: &str,
        location: Option<&str>,
        instruction: Option<&TaxiInstruction>,
    ) -> AircraftRequest {
        let reference = self.reference;
        let cs = self.callsign_phonetic(callsign);
        let suffix = match location {
            Some(location) => {
                format!(" with {} from {location}", phonetic::atis(reference.facility.atis))
            }
            None => String::new(),
        };
        let instruction = instruction.unwrap_or(&reference.facility.default_taxi);

        let mut request = AircraftRequest::new(RequestKind::Taxi, 2);
        request.request =
            Some(Utterance::new(format!("Ready for taxi{suffix}"), format!("{cs} ready for taxi{suffix}")));
        request.response = Some(Utterance::new(
            instruction.text.clone(),
            format!("{cs} {}", instruction.phonetic),
        ));
        request.atc_message = Some(format!("Taxi instruction sent to {callsign}"));
        request.next_status = Some(Status::Taxi);
        request.subsequent = Some(Box::new(self.handoff_request(callsign)));
        request
    }

    fn handoff_request(&mut self, callsign: &str) -> AircraftRequest {
        let reference = self.reference;
        let cs = self.callsign_phonetic(callsign);
        let frequency = &reference.facility.tower_frequency;
        let farewell = if self.rng.random_bool(0.5) { "have a good one" } else { "good day" };

        let mut request = AircraftRequest::new(RequestKind::Handoff, 1);
        request.response = Some(Utterance::new(
            format!("Contact tower {frequency}"),
            format!("{cs} contact tower {} {farewell}", phonetic::frequency(frequency)),
        ));
        request.atc_message = Some(format!("{callsign} handed to tower"));
        request.next_status = Some(Status::HandedOff);
        request
    }

    fn pattern_request(&mut self, callsign: &str, actual_type: &str) -> AircraftRequest {
        let reference = self.reference;
        let facility = &reference.facility;
        let cs = self.callsign_phonetic(callsign);
        let intro = format!(
            "type {actual_type} at the {} with {}, request taxi for pattern work",
            facility.vfr_apron,
            phonetic::atis(facility.atis),
        );

        let mut request = AircraftRequest::new(RequestKind::Pattern, 1);
        request.request = Some(Utterance::new(
            capitalize_first(&intro),
            format!("{}, {cs} {intro}", facility.ground_name),
        ));
        request.response = Some(Utterance::new(
            format!("Squawk VFR, {}", lowercase_first(&facility.vfr_taxi.text)),
            format!("{cs} squawk VFR, {}", facility.vfr_taxi.phonetic),
        ));
        request.atc_message = Some(format!("Taxi instruction sent to {callsign}"));
        request.next_status = Some(Status::Taxi);
        request.subsequent = Some(Box::new(self.handoff_request(callsign)));
        request
    }

    /// Builds the VFR departure request and fills in what the pilot asks for.
    fn vfr_departure_request(
        &mut self,
        plan: &mut FlightPlan,
        actual_type: &str,
        flight_following: bool,
    ) -> Option<AircraftRequest> {
        let reference = self.reference;
        let facility = &reference.facility;
        let tables = &reference.tables;
        let callsign = plan.callsign.clone();
        let cs = self.callsign_phonetic(&callsign);
        let atis = phonetic::atis(facility.atis);

        let (routing, spoken_routing, direction, altitude_direction) = if flight_following {
            let icao = tables.vfr_destinations.choose(self.rng)?.clone();
            let destination = tables.destinations.get(&icao);
            let name = format!("{} airport", phonetic::destination_name(&icao, tables));
            let heading = destination.map_or(Direction::West, |destination| destination.direction);
            (icao, name.clone(), name, heading.to_string())
        } else {
            let direction = tables.departure_directions.choose(self.rng)?.clone();
            (format!("the {direction}"), direction.clone(), direction.clone(), direction)
        };

        let base = if altitude_direction.contains("west") { 4 } else { 3 };
        let altitude = format!("{}500", base + self.rng.random_range(0..4) * 2);
        let following = if flight_following { " with flight following" } else { "" };

        let mut readback = AircraftRequest::new(RequestKind::ReadbackVfr, 1);
        readback.response = Some(Utterance::new(
            facility.vfr_taxi.text.clone(),
            format!("{cs} {}", facility.vfr_taxi.phonetic),
        ));
        readback.atc_message = Some(format!("Taxi instruction sent to {callsign}"));
        readback.reminder = Some(Reminder {
            message: Utterance::new("Ready to taxi", format!("{cs} ready to taxi")),
            delay:   REMINDER_DELAY,
            kind:    MistakeKind::TaxiVfr,
            send_at: None,
        });
        readback.next_status = Some(Status::Taxi);
        readback.subsequent = Some(Box::new(self.handoff_request(&callsign)));

        let mut request = AircraftRequest::new(RequestKind::ClearanceVfr, 1);
        request.request = Some(Utterance::new(
            format!(
                "Type {actual_type} at the {} with {atis}, request VFR departure{following} to \
                 {routing} at {altitude}",
                facility.vfr_apron,
            ),
            format!(
                "{}, {cs} type {actual_type} at the {} with {atis}, request VFR \
                 departure{following} to the {spoken_routing} at {altitude} feet",
                facility.ground_name, facility.vfr_apron,
            ),
        ));
        request.response = Some(Utterance::new(
            format!(
                "Maintain VFR at or below {}, departure {}, squawk {}",
                facility.vfr_altitude_limit, facility.departure_frequency, plan.squawk,
            ),
            format!(
                "{cs} maintain VFR at or below {}, departure {}, squawk {}",
                facility.vfr_altitude_limit,
                phonetic::frequency(&facility.departure_frequency),
                phonetic::spell(&plan.squawk),
            ),
        ));
        request.atc_message = Some(format!("VFR clearance sent to {callsign}"));
        request.subsequent = Some(Box::new(readback));

        plan.route_type = if flight_following { RouteType::VfrFollowing } else { RouteType::Vfr };
        plan.requested_altitude = Some(altitude);
        plan.direction = Some(direction);
        Some(request)
    }

    fn long_delay(&mut self) -> Duration { Duration::from_secs(self.rng.random_range(90..150)) }
}

/// Picks a uniformly random destination, then a random route to it.
fn pick_route(routes: &[PrefRoute], rng: &mut impl Rng) -> Option<PrefRoute> {
    let mut destinations: Vec<&str> = routes.iter().map(|route| route.destination.as_str()).collect();
    destinations.sort_unstable();
    destinations.dedup();

    let destination = *destinations.choose(rng)?;
    let candidates: Vec<_> = routes.iter().filter(|route| route.destination == destination).collect();
    candidates.choose(rng).map(|route| (*route).clone())
}

fn random_speed(category: &AircraftCategory, rng: &mut impl Rng) -> String {
    let speed = &category.speed;
    let value = if speed.max > speed.min { rng.random_range(speed.min..speed.max) } else { speed.min };
    value.to_string()
}

/// Four octal digits, never an emergency code.
pub fn squawk(rng: &mut impl Rng) -> String {
    loop {
        let code: String =
            (0..4).map(|_| char::from(b'0' + rng.random_range(0..8u8))).collect();
        if !matches!(code.as_str(), "7500" | "7600" | "7700") {
            return code;
        }
    }
}

/// Three or four digits, never starting with 0 or 9.
pub fn flight_number(rng: &mut impl Rng) -> String {
    let len = if rng.random_bool(0.5) { 3 } else { 4 };
    (0..len)
        .map(|index| {
            let digit = if index == 0 { rng.random_range(1..=8u8) } else { rng.random_range(0..=8u8) };
            char::from(b'0' + digit)
        })
        .collect()
}

/// A US civil registration such as `N1234A` or `N123AB`.
pub fn registration(rng: &mut impl Rng) -> String {
    let letters = if rng.random_bool(0.5) { 1 } else { 2 };
    let mut callsign = String::from("N");
    for index in 0..5 - letters {
        let digit = if index == 0 { rng.random_range(1..=8u8) } else { rng.random_range(0..=8u8) };
        callsign.push(char::from(b'0' + digit));
    }
    for _ in 0..letters {
        if let Some(&letter) = REGISTRATION_LETTERS.choose(rng) {
            callsign.push(char::from(letter));
        }
    }
    callsign
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map(|first| first.to_uppercase().chain(chars).collect()).unwrap_or_default()
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map(|first| first.to_lowercase().chain(chars).collect()).unwrap_or_default()
}
