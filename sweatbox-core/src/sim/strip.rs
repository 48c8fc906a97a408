//! Flight strip bays.

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::Command;
use bevy::ecs::world::World;

use super::aircraft::{self, FlightPlan};
use crate::try_log_return;

#[cfg(test)]
mod tests;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.init_resource::<Bays>(); }
}

/// Where a strip lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Bay {
    Ground,
    /// Strips of aircraft handed to tower.
    Local,
    Spare,
    /// Newly printed strips.
    Printer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display, derive_more::From)]
pub struct StripId(pub u32);

#[derive(Debug, Clone)]
pub struct Strip {
    pub id:     StripId,
    pub bay:    Bay,
    /// Whether the strip is shifted sideways to mark it.
    pub offset: bool,
    pub kind:   StripKind,
}

#[derive(Debug, Clone)]
pub enum StripKind {
    Flight(FlightStrip),
    Divider(String),
    HandwrittenDivider(String),
    Blank,
}

/// A printed copy of a flight plan with the controller's annotations.
#[derive(Debug, Clone)]
pub struct FlightStrip {
    pub plan:  FlightPlan,
    /// Departure mark.
    pub box10: String,
    /// ATIS letter.
    pub box12: String,
    pub notes: String,
}

/// Which annotation of a flight strip to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Box10,
    Box12,
    Notes,
}

/// All strips of the session, in display order.
#[derive(Debug, Default, Resource)]
pub struct Bays {
    strips:  Vec<Strip>,
    next_id: u32,
}

impl Bays {
    fn push(&mut self, bay: Bay, kind: StripKind) -> StripId {
        let id = StripId(self.next_id);
        self.next_id += 1;
        self.strips.push(Strip { id, bay, offset: false, kind });
        id
    }

    /// Prints a copy of the flight plan into the printer bay.
    pub fn print_flight_plan(&mut self, plan: &FlightPlan) -> StripId {
        bevy::log::debug!("Printing strip for {}", plan.callsign);
        self.push(
            Bay::Printer,
            StripKind::Flight(FlightStrip {
                plan:  plan.clone(),
                box10: String::new(),
                box12: String::new(),
                notes: String::new(),
            }),
        )
    }

    pub fn print_blank(&mut self) -> StripId { self.push(Bay::Printer, StripKind::Blank) }

    pub fn add_divider(&mut self, bay: Bay, name: impl Into<String>, handwritten: bool) -> StripId {
        let name = name.into();
        let kind =
            if handwritten { StripKind::HandwrittenDivider(name) } else { StripKind::Divider(name) };
        self.push(bay, kind)
    }

    /// Moves a strip to the end of a bay.
    pub fn move_to(&mut self, id: StripId, bay: Bay) -> bool {
        let Some(index) = self.strips.iter().position(|strip| strip.id == id) else {
            return false;
        };
        let mut strip = self.strips.remove(index);
        strip.bay = bay;
        self.strips.push(strip);
        true
    }

    pub fn remove(&mut self, id: StripId) -> Option<Strip> {
        let index = self.strips.iter().position(|strip| strip.id == id)?;
        Some(self.strips.remove(index))
    }

    /// Edits an annotation of a flight strip.
    /// Returns `false` if the strip does not exist or is not a flight strip.
    pub fn annotate(&mut self, id: StripId, annotation: Annotation, text: impl Into<String>) -> bool {
        let Some(Strip { kind: StripKind::Flight(strip), .. }) =
            self.strips.iter_mut().find(|strip| strip.id == id)
        else {
            return false;
        };
        let field = match annotation {
            Annotation::Box10 => &mut strip.box10,
            Annotation::Box12 => &mut strip.box12,
            Annotation::Notes => &mut strip.notes,
        };
        *field = text.into();
        true
    }

    pub fn toggle_offset(&mut self, id: StripId) -> bool {
        let Some(strip) = self.strips.iter_mut().find(|strip| strip.id == id) else { return false };
        strip.offset = !strip.offset;
        true
    }

    #[must_use]
    pub fn get(&self, id: StripId) -> Option<&Strip> { self.strips.iter().find(|strip| strip.id == id) }

    pub fn iter(&self) -> impl Iterator<Item = &Strip> { self.strips.iter() }

    pub fn in_bay(&self, bay: Bay) -> impl Iterator<Item = &Strip> {
        self.strips.iter().filter(move |strip| strip.bay == bay)
    }

    /// The first flight strip of the callsign in the bay.
    #[must_use]
    pub fn find_flight(&self, bay: Bay, callsign: &str) -> Option<&FlightStrip> {
        self.in_bay(bay).find_map(|strip| match &strip.kind {
            StripKind::Flight(flight) if flight.plan.callsign == callsign => Some(flight),
            _ => None,
        })
    }
}

/// Prints a new strip for a live aircraft, counting the reprint on its flight plan.
pub struct RequestStrip {
    pub callsign: String,
}

impl Command for RequestStrip {
    fn apply(self, world: &mut World) {
        let entity = try_log_return!(
            aircraft::find(world, &self.callsign),
            expect "Cannot print strip of unknown aircraft {}", self.callsign
        );
        let plan = {
            let mut plan = try_log_return!(
                world.get_mut::<FlightPlan>(entity),
                expect "Aircraft {} has no flight plan", self.callsign
            );
            plan.print_count += 1;
            plan.clone()
        };
        world.resource_mut::<Bays>().print_flight_plan(&plan);
    }
}

pub struct PrintBlank;

impl Command for PrintBlank {
    fn apply(self, world: &mut World) { world.resource_mut::<Bays>().print_blank(); }
}

pub struct MoveStrip {
    pub id:  StripId,
    pub bay: Bay,
}

impl Command for MoveStrip {
    fn apply(self, world: &mut World) {
        if !world.resource_mut::<Bays>().move_to(self.id, self.bay) {
            bevy::log::warn!("Cannot move unknown strip {}", self.id);
        }
    }
}

pub struct DeleteStrip(pub StripId);

impl Command for DeleteStrip {
    fn apply(self, world: &mut World) {
        if world.resource_mut::<Bays>().remove(self.0).is_none() {
            bevy::log::warn!("Cannot delete unknown strip {}", self.0);
        }
    }
}

pub struct Annotate {
    pub id:         StripId,
    pub annotation: Annotation,
    pub text:       String,
}

impl Command for Annotate {
    fn apply(self, world: &mut World) {
        if !world.resource_mut::<Bays>().annotate(self.id, self.annotation, self.text) {
            bevy::log::warn!("Strip {} is not a flight strip", self.id);
        }
    }
}

pub struct ToggleOffset(pub StripId);

impl Command for ToggleOffset {
    fn apply(self, world: &mut World) {
        if !world.resource_mut::<Bays>().toggle_offset(self.0) {
            bevy::log::warn!("Cannot offset unknown strip {}", self.0);
        }
    }
}
