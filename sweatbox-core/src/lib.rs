#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::needless_pass_by_value, clippy::type_complexity)] // too many false positives from system params.
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::implicit_hasher)] // unnecessary generalization
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]

//! Ground controller training simulation.
//!
//! Aircraft spawn at parking spots, call the controller with requests,
//! and move through pushback and taxi once their requests are answered.
//! The controller answers by voice (or typed text) through [`speech`],
//! and mistakes are recorded in [`sim::mistake::MistakeLog`].

use bevy::app::{App, Plugin};

pub mod config;
pub mod load;
pub mod phonetic;
pub mod sim;
pub mod speech;
pub mod try_log;
pub use try_log::WorldExt as WorldTryLog;

#[cfg(test)]
mod tests;

/// Installs the whole simulation.
///
/// Reference data is installed separately with [`load::Command`];
/// ticks are no-ops until then.
pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_plugins(config::Plug);
        app.add_plugins(sim::Plug);
        app.add_plugins(speech::Plug);
    }
}
