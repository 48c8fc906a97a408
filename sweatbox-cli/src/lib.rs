#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::needless_pass_by_value)] // too many false positives from system params.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::app::{App, PluginGroup, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use sweatbox::config::Config;
use sweatbox::load;

pub mod command;
mod console;

#[derive(clap::Parser)]
#[clap(version, about)]
pub struct Options {
    /// Reference data file, in CBOR or JSON form.
    /// Uses the built-in Portland data if unset.
    #[clap(long)]
    pub data:       Option<PathBuf>,
    /// Preferred route list in the upstream JSON format.
    #[clap(long)]
    pub routes:     Option<PathBuf>,
    /// Session configuration file in JSON.
    #[clap(long)]
    pub config:     Option<PathBuf>,
    /// Overrides the configured difficulty.
    #[clap(long)]
    pub difficulty: Option<u8>,
    /// Overrides the configured random seed.
    #[clap(long)]
    pub seed:       Option<u64>,
    /// Log filter in `RUST_LOG` syntax.
    #[clap(long, default_value = "warn,sweatbox=info")]
    pub log:        String,
}

pub fn main_app(options: Options) -> Result<App> {
    let mut config = match &options.config {
        Some(path) => Config::from_json(fs::File::open(path).context("open config file")?)
            .context("parse config file")?,
        None => Config::default(),
    };
    if let Some(difficulty) = options.difficulty {
        config.difficulty = difficulty;
    }
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let source = match &options.data {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
            if path.extension().is_some_and(|ext| ext == "json") {
                load::Source::Json(Cow::Owned(bytes))
            } else {
                load::Source::Raw(Cow::Owned(bytes))
            }
        }
        None => load::Source::Parsed(Box::new(maps::portland::file())),
    };
    let routes = match &options.routes {
        Some(path) => maps::read_routes(path)?,
        None => Vec::new(),
    };

    let mut app = App::new();
    app.add_plugins((
        bevy::MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(10))),
        LogPlugin { filter: options.log, ..Default::default() },
    ));
    app.insert_resource(config);
    app.add_plugins((sweatbox::Plug, console::Plug));

    load::load(app.world_mut(), source, routes).context("load reference data")?;
    println!("{}", command::USAGE);

    Ok(app)
}
