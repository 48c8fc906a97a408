use std::time::Duration;

use bevy::app::{self, App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::Command as BevyCommand;
use bevy::ecs::world::World;
use bevy::time::Time;

use super::Tick;
use crate::config::Config;

/// Simulated time advanced by one tick.
pub const TICK: Duration = Duration::from_secs(1);

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Clock>();
        app.add_systems(app::Update, drive_system);
    }
}

/// The shared simulated clock.
///
/// All request timers, reminders and status timestamps compare against [`Clock::now`],
/// never against wall time.
#[derive(Debug, Default, Resource)]
pub struct Clock {
    /// Simulated time since the session started.
    pub now:    Duration,
    /// While paused, ticks are no-ops.
    pub paused: bool,
    /// Real time accumulated towards the next tick.
    pending:    Duration,
}

impl Clock {
    /// Whether the current tick falls on a multiple of `period`.
    #[must_use]
    pub fn is_multiple_of(&self, period: Duration) -> bool {
        let period = period.as_secs().max(1);
        self.now.as_secs() % period == 0
    }
}

/// Runs one simulated second unless paused.
pub fn tick(world: &mut World) {
    if world.resource::<Clock>().paused {
        return;
    }

    if let Err(err) = world.try_run_schedule(Tick) {
        bevy::log::error!("Cannot run tick schedule: {err}");
    }
    world.resource_mut::<Clock>().now += TICK;
}

fn drive_system(world: &mut World) {
    let Some(delta) = world.get_resource::<Time>().map(Time::delta) else { return };
    let tick_length = world.get_resource::<Config>().map_or(TICK, Config::tick_length);

    let mut clock = world.resource_mut::<Clock>();
    if clock.paused {
        return;
    }
    clock.pending += delta;
    let mut due = 0;
    while clock.pending >= tick_length {
        clock.pending -= tick_length;
        due += 1;
    }

    for _ in 0..due {
        tick(world);
    }
}

/// Pauses or resumes the simulation.
pub struct SetPaused(pub bool);

impl BevyCommand for SetPaused {
    fn apply(self, world: &mut World) {
        bevy::log::info!("Simulation {}", if self.0 { "paused" } else { "resumed" });
        world.resource_mut::<Clock>().paused = self.0;
    }
}
