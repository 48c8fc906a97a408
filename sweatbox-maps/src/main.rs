#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(clap::Parser)]
#[clap(version, about)]
enum Options {
    /// Write all built-in data files into a directory.
    Build {
        /// Output directory.
        #[clap(long, default_value = "assets/data")]
        output_dir: PathBuf,
    },
    /// Write the JSON schema of data files.
    Schema {
        /// Output path.
        output: PathBuf,
        /// Compress the output with gzip.
        #[clap(long)]
        gzip:   bool,
    },
    /// Convert a JSON data file into the binary form.
    FromJson {
        /// Input JSON file.
        input:  PathBuf,
        /// Output data file.
        output: PathBuf,
    },
    /// Convert a binary data file into JSON.
    ToJson {
        /// Input data file.
        input:  PathBuf,
        /// Output JSON file.
        output: PathBuf,
    },
    /// Replace the preferred routes of a data file with a downloaded route list.
    ImportRoutes {
        /// Input data file.
        input:  PathBuf,
        /// Route list in the upstream JSON format.
        routes: PathBuf,
        /// Output data file.
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Options::parse() {
        Options::Build { output_dir } => maps::build_assets(&output_dir),
        Options::Schema { output, gzip } => maps::json_schema(&output, gzip),
        Options::FromJson { input, output } => maps::from_json(&input, &output),
        Options::ToJson { input, output } => maps::to_json(&input, &output),
        Options::ImportRoutes { input, routes, output } => {
            let count = maps::import_routes(&input, &routes, &output)?;
            println!("Imported {count} routes");
            Ok(())
        }
    }
}
