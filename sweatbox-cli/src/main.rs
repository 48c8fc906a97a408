#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]

use anyhow::{Result, bail};
use bevy::app::AppExit;
use clap::Parser;

fn main() -> Result<()> {
    let options = sweatbox_cli::Options::parse();
    match sweatbox_cli::main_app(options)?.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => bail!("exited with code {code}"),
    }
}
