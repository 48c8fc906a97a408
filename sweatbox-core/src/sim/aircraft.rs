//! Aircraft entities and their flight plans.

use std::time::Duration;

use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::math::Vec2;

/// Identity and workflow state of an aircraft.
#[derive(Debug, Component)]
pub struct Aircraft {
    /// Unique among live aircraft.
    pub callsign:       String,
    pub status:         Status,
    /// When [`status`](Self::status) last changed.
    pub status_changed: Duration,
    /// The aircraft does not start a new request before this time.
    pub can_send_at:    Duration,
    /// The type actually operated, which may differ from the filed type.
    pub actual_type:    String,
    /// Display size on the diagram.
    pub size:           f32,
    /// ID of the reserved parking spot.
    pub parking_spot:   String,
    pub voice:          Voice,
    /// Whether the controller has addressed this aircraft before.
    pub spoken_to:      bool,
    /// Whether the aircraft was told to hold position.
    /// Movement is suspended but [`status`](Self::status) is unaffected.
    pub holding:        bool,
}

impl Aircraft {
    /// A parked aircraft that has not called yet.
    pub fn new(
        callsign: impl Into<String>,
        actual_type: impl Into<String>,
        parking_spot: impl Into<String>,
        voice: Voice,
        now: Duration,
    ) -> Self {
        Self {
            callsign: callsign.into(),
            status: Status::Ramp,
            status_changed: now,
            can_send_at: now,
            actual_type: actual_type.into(),
            size: 1.0,
            parking_spot: parking_spot.into(),
            voice,
            spoken_to: false,
            holding: false,
        }
    }

    pub fn set_status(&mut self, status: Status, now: Duration) {
        bevy::log::debug!("{} status {} -> {status}", self.callsign, self.status);
        self.status = status;
        self.status_changed = now;
    }
}

/// Workflow state of an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Status {
    /// Parked, not yet cleared.
    Ramp,
    /// Received and read back an IFR clearance, still parked.
    ClearedIfr,
    /// Pushback at pilot discretion approved, waiting to start.
    PushbackDiscretion,
    /// Pushing back.
    Pushback,
    /// Taxiing to the departure runway.
    Taxi,
    /// Reached the runway and asked to switch to tower.
    AwaitingHandoff,
    /// Handed to tower.
    HandedOff,
    /// Handed to tower, and tower asked for the missing strip.
    HandedOffReminded,
    /// Departed. The aircraft is removed on the next departure check.
    Departed,
}

impl Status {
    /// Whether the aircraft has left the ground frequency.
    #[must_use]
    pub fn is_off_frequency(self) -> bool {
        matches!(self, Self::HandedOff | Self::HandedOffReminded | Self::Departed)
    }

    /// Whether the aircraft is still parked at its spot.
    #[must_use]
    pub fn is_parked(self) -> bool { matches!(self, Self::Ramp | Self::ClearedIfr) }

    /// Whether the aircraft is moving under ground control and may be told to hold.
    #[must_use]
    pub fn accepts_hold(self) -> bool {
        matches!(self, Self::Pushback | Self::Taxi | Self::AwaitingHandoff)
    }
}

/// Position on the diagram.
#[derive(Debug, Clone, Copy, Component)]
pub struct Placement {
    pub position: Vec2,
    /// Heading in degrees as displayed on the diagram.
    pub rotation: f32,
}

/// A speech synthesis voice assigned to an aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    /// Index into the voices available to the synthesizer, modulo their count.
    pub slot:  u32,
    pub pitch: f32,
}

/// Flight plan of an aircraft, as filed and as amended by the controller.
#[derive(Debug, Clone, Component)]
pub struct FlightPlan {
    pub callsign:           String,
    pub aircraft_type:      String,
    pub equipment:          String,
    /// Filed true airspeed in knots.
    pub speed:              String,
    pub route_type:         RouteType,
    /// Cruise altitude, e.g. `240` for IFR or `VFR/045` for VFR.
    pub altitude:           String,
    pub departure:          String,
    pub destination:        String,
    pub route:              String,
    /// The route as generated, to detect amendments.
    pub original_route:     String,
    pub remarks:            String,
    pub squawk:             String,
    pub cid:                String,
    pub planned_time:       String,
    /// Number of strips printed for this flight plan.
    pub print_count:        u32,
    /// Whether the flight plan was filed before the aircraft called.
    pub created:            bool,
    /// Altitude in feet a VFR aircraft asked for, e.g. `4500`.
    pub requested_altitude: Option<String>,
    /// Where a VFR aircraft is departing to, e.g. `northwest` or `Augusta airport`.
    pub direction:          Option<String>,
}

impl FlightPlan {
    /// An unfiled flight plan, to be filled in by the controller.
    pub fn blank(callsign: impl Into<String>, route_type: RouteType) -> Self {
        Self {
            callsign: callsign.into(),
            aircraft_type: String::new(),
            equipment: String::new(),
            speed: String::new(),
            route_type,
            altitude: String::new(),
            departure: String::new(),
            destination: String::new(),
            route: String::new(),
            original_route: String::new(),
            remarks: String::new(),
            squawk: String::new(),
            cid: String::new(),
            planned_time: String::new(),
            print_count: 0,
            created: false,
            requested_altitude: None,
            direction: None,
        }
    }
}

/// Category of the route an aircraft flies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RouteType {
    /// IFR on a tower enroute control route.
    #[strum(serialize = "TEC")]
    Tec,
    /// IFR on a high-altitude route.
    #[strum(serialize = "H")]
    High,
    /// VFR pattern work.
    #[strum(serialize = "pattern")]
    Pattern,
    /// VFR departure without flight following.
    #[strum(serialize = "VFR")]
    Vfr,
    /// VFR departure with flight following.
    #[strum(serialize = "VFRFF")]
    VfrFollowing,
}

impl RouteType {
    #[must_use]
    pub fn is_ifr(self) -> bool { matches!(self, Self::Tec | Self::High) }

    /// Whether this is a VFR flight leaving the area, with or without flight following.
    #[must_use]
    pub fn is_vfr_departure(self) -> bool { matches!(self, Self::Vfr | Self::VfrFollowing) }
}

/// Finds the live aircraft with the exact callsign.
pub fn find(world: &mut World, callsign: &str) -> Option<Entity> {
    world
        .query::<(Entity, &Aircraft)>()
        .iter(world)
        .find(|(_, aircraft)| aircraft.callsign == callsign)
        .map(|(entity, _)| entity)
}

/// Replaces the flight plan of a live aircraft.
///
/// The callsign is the identity key and cannot be amended.
pub struct AmendFlightPlan(pub FlightPlan);

impl bevy::ecs::system::Command for AmendFlightPlan {
    fn apply(self, world: &mut World) {
        let Some(entity) = find(world, &self.0.callsign) else {
            bevy::log::warn!("Cannot amend flight plan of unknown aircraft {}", self.0.callsign);
            return;
        };
        if let Some(mut plan) = world.get_mut::<FlightPlan>(entity) {
            *plan = self.0;
        }
    }
}
