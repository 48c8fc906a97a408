//! Session configuration.

use std::io;
use std::time::Duration;

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::Command as BevyCommand;
use bevy::ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// The highest supported difficulty.
pub const MAX_DIFFICULTY: u8 = 5;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Config>();
        let seed = app.world().resource::<Config>().seed;
        app.insert_resource(SimRng::new(seed));
    }
}

/// User-adjustable settings of a session.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Traffic load from 1 to [`MAX_DIFFICULTY`].
    ///
    /// Affects the number of simultaneously open requests,
    /// the number of aircraft waiting to call
    /// and the minimum silence between aircraft transmissions.
    pub difficulty:           u8,
    /// Key code of the push-to-talk key.
    pub push_to_talk_key:     String,
    /// Seed for all random draws of the simulation.
    /// Draws from system entropy if unset.
    pub seed:                 Option<u64>,
    /// Real time in milliseconds that one simulated second lasts.
    pub tick_millis:          u64,
    /// Delay between releasing the push-to-talk key and stopping recognition,
    /// so that trailing audio is not lost.
    pub release_grace_millis: u64,
    /// Whether the voice switch allows transmitting.
    pub voice_transmit:       bool,
    /// Whether the voice switch plays received transmissions.
    pub voice_receive:        bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty:           2,
            push_to_talk_key:     "Escape".into(),
            seed:                 None,
            tick_millis:          1000,
            release_grace_millis: 500,
            voice_transmit:       true,
            voice_receive:        true,
        }
    }
}

impl Config {
    pub fn from_json(reader: impl io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// The difficulty clamped into the supported range.
    #[must_use]
    pub fn difficulty(&self) -> u32 { u32::from(self.difficulty.clamp(1, MAX_DIFFICULTY)) }

    /// Minimum time between two aircraft-initiated transmissions.
    #[must_use]
    pub fn silence_interval(&self) -> Duration {
        Duration::from_secs(u64::from(60u32.div_ceil(self.difficulty())))
    }

    /// Maximum number of simultaneously open requests before new requests are held back.
    #[must_use]
    pub fn max_open_requests(&self) -> usize {
        usize::try_from(self.difficulty() + 1).unwrap_or(usize::MAX)
    }

    /// Spawning stops while this many aircraft are waiting to call.
    #[must_use]
    pub fn max_waiting_aircraft(&self) -> usize { self.max_open_requests() }

    #[must_use]
    pub fn tick_length(&self) -> Duration { Duration::from_millis(self.tick_millis.max(1)) }

    #[must_use]
    pub fn release_grace(&self) -> Duration { Duration::from_millis(self.release_grace_millis) }
}

/// Source of randomness for the simulation.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self(match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        })
    }
}

/// Changes the difficulty of a running session.
pub struct SetDifficulty(pub u8);

impl BevyCommand for SetDifficulty {
    fn apply(self, world: &mut World) {
        let difficulty = self.0.clamp(1, MAX_DIFFICULTY);
        bevy::log::info!("Difficulty set to {difficulty}");
        world.resource_mut::<Config>().difficulty = difficulty;
    }
}
