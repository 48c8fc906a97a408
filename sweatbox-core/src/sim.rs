//! Ground movement simulation.
//!
//! The simulation advances in discrete ticks of one simulated second,
//! each running the [`Tick`] schedule once.

use bevy::app::{App, Plugin};
use bevy::ecs::schedule::common_conditions::resource_exists;
use bevy::ecs::schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet};
use itertools::Itertools;
use strum::IntoEnumIterator;

pub mod aircraft;
pub mod clock;
pub mod generate;
pub mod mistake;
pub mod parking;
pub mod radio;
pub mod reference;
pub mod request;
pub mod schedule;
pub mod strip;
pub mod taxi;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_schedule(Tick);

        for set in TickSets::iter() {
            app.configure_sets(
                Tick,
                set.run_if(resource_exists::<reference::Reference>)
                    .run_if(resource_exists::<taxi::Network>),
            );
        }

        for (before, after) in TickSets::iter().tuple_windows() {
            app.configure_sets(Tick, before.before(after));
        }

        app.add_plugins(clock::Plug);
        app.add_plugins(radio::Plug);
        app.add_plugins(mistake::Plug);
        app.add_plugins(strip::Plug);
        app.add_plugins(parking::Plug);
        app.add_plugins(generate::Plug);
        app.add_plugins(schedule::Plug);
    }
}

/// Runs once per simulated second while the simulation is not paused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, ScheduleLabel)]
pub struct Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet, strum::EnumIter)]
pub enum TickSets {
    /// Timed status transitions that do not move aircraft.
    Transition,
    /// Pushback and taxi movement, including the transitions triggered by position.
    Move,
    /// Removal of departed aircraft.
    Depart,
    /// Creation of new aircraft.
    Spawn,
    /// Reminders and new aircraft requests.
    Emit,
}
