use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::{fmt, fs, io};

use anyhow::{Context, Result};

pub mod common_types;

pub mod portland;

/// File extension of reference data files.
pub const EXTENSION: &str = "sbox";

pub fn builtins()
-> impl Iterator<Item = (impl AsRef<str> + Into<String> + fmt::Display, store::File)> {
    [("portland", portland::file())].into_iter()
}

/// Looks up a built-in file by name.
#[must_use]
pub fn builtin(name: &str) -> Option<store::File> {
    builtins().find(|(builtin, _)| builtin.as_ref() == name).map(|(_, file)| file)
}

pub fn build_assets(data_dir: &Path) -> Result<()> {
    if let Err(err) = fs::create_dir(data_dir)
        && err.kind() != io::ErrorKind::AlreadyExists
    {
        return Err(err).context("mkdir data");
    }

    for (name, data) in builtins() {
        ciborium::into_writer(
            &data,
            fs::File::create(data_dir.join(format!("{name}.{EXTENSION}")))
                .with_context(|| format!("create {name}.{EXTENSION}"))?,
        )
        .with_context(|| format!("write {name}.{EXTENSION}"))?;
    }

    Ok(())
}

pub fn json_schema(output: &Path, gzip: bool) -> Result<()> {
    let schema = schemars::schema_for!(store::File);
    let mut writer: Box<dyn io::Write> =
        Box::new(BufWriter::new(fs::File::create(output).context("create output")?));
    if gzip {
        writer = Box::new(BufWriter::new(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::best(),
        )));
    }
    serde_json::to_writer(writer, &schema).context("write schema")?;
    Ok(())
}

pub fn from_json(input: &Path, output: &Path) -> Result<()> {
    let file: store::File =
        serde_json::from_reader(BufReader::new(fs::File::open(input).context("open input")?))
            .context("parse json")?;
    ciborium::into_writer(&file, BufWriter::new(fs::File::create(output).context("create output")?))
        .context("write data file")?;
    Ok(())
}

pub fn to_json(input: &Path, output: &Path) -> Result<()> {
    let file = read_file(input)?;
    serde_json::to_writer_pretty(
        BufWriter::new(fs::File::create(output).context("create output")?),
        &file,
    )
    .context("write json")?;
    Ok(())
}

/// Replaces the preferred routes of a data file with a downloaded route list.
///
/// Only routes originating from the facility airport are kept.
pub fn import_routes(input: &Path, routes: &Path, output: &Path) -> Result<usize> {
    let mut file = read_file(input)?;
    let routes = read_routes(routes)?;

    let origin = file.facility.airport.strip_prefix('K').unwrap_or(&file.facility.airport);
    file.pref_routes = routes.into_iter().filter(|route| route.origin == origin).collect();
    let count = file.pref_routes.len();

    ciborium::into_writer(&file, BufWriter::new(fs::File::create(output).context("create output")?))
        .context("write data file")?;
    Ok(count)
}

/// Reads a data file in CBOR form.
pub fn read_file(path: &Path) -> Result<store::File> {
    ciborium::de::from_reader(BufReader::new(fs::File::open(path).context("open data file")?))
        .context("parse data file")
}

/// Reads a preferred-route list in the upstream JSON format.
pub fn read_routes(path: &Path) -> Result<Vec<store::PrefRoute>> {
    serde_json::from_reader(BufReader::new(fs::File::open(path).context("open route list")?))
        .context("parse route list")
}
