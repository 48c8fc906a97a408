//! Reservation of parking spots.

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::math::Vec2;
use rand::Rng;
use rand::seq::IteratorRandom;
use store::{ParkingSpot, SpotKind};

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.init_resource::<Spots>(); }
}

/// Parking spots of the facility and whether each is free.
#[derive(Default, Resource)]
pub struct Spots {
    spots: Vec<Slot>,
}

struct Slot {
    spot:      ParkingSpot,
    available: bool,
}

impl Spots {
    pub fn new(spots: impl IntoIterator<Item = ParkingSpot>) -> Self {
        Self { spots: spots.into_iter().map(|spot| Slot { spot, available: true }).collect() }
    }

    /// Reserves a uniformly random available spot.
    ///
    /// Returns `None` if every spot is taken.
    pub fn reserve_random(&mut self, rng: &mut impl Rng) -> Option<&ParkingSpot> {
        let slot = self.spots.iter_mut().filter(|slot| slot.available).choose(rng)?;
        slot.available = false;
        Some(&slot.spot)
    }

    /// Frees a spot. Unknown IDs are ignored.
    pub fn release(&mut self, id: &str) {
        if let Some(slot) = self.spots.iter_mut().find(|slot| slot.spot.id == id) {
            slot.available = true;
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ParkingSpot> {
        self.spots.iter().map(|slot| &slot.spot).find(|spot| spot.id == id)
    }

    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.spots.iter().any(|slot| slot.spot.id == id && slot.available)
    }

    #[must_use]
    pub fn available_count(&self) -> usize {
        self.spots.iter().filter(|slot| slot.available).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParkingSpot> {
        self.spots.iter().map(|slot| &slot.spot)
    }

    /// Whether pushing back from the spot ends in the ramp rather than on a taxiway.
    #[must_use]
    pub fn pushback_into_ramp(&self, id: &str) -> Option<bool> {
        self.get(id).map(|spot| spot.pushback_into_ramp)
    }

    /// Where the aircraft stops pushing back.
    #[must_use]
    pub fn pushback_location(&self, id: &str) -> Option<Vec2> {
        self.get(id).map(|spot| Vec2::new(spot.pushback_location.x, spot.pushback_location.y))
    }

    /// Whether departures from the spot push back before taxiing.
    #[must_use]
    pub fn has_pushback(&self, id: &str) -> bool {
        self.get(id).is_some_and(|spot| spot.kind == SpotKind::Airline)
    }
}
