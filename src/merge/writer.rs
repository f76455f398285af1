use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use crate::merge::{self, Config};

const INDENT: &[u8] = b"    ";

/// Human readable JSON with a four space indent.
pub fn write_pretty<W, T>(writer: W, value: &T) -> Result<(), serde_json::Error>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)
}

/// JSON without any insignificant whitespace.
pub fn write_compact<W, T>(writer: W, value: &T) -> Result<(), serde_json::Error>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(writer, value)
}

/// Writes `value` into `dir` twice, pretty and compact, replacing existing files.
/// Returns the written paths in that order.
pub fn write_files<P, T>(dir: P, config: &Config, value: &T) -> Result<[PathBuf; 2], merge::Error>
where
    P: AsRef<Path>,
    T: Serialize + ?Sized,
{
    let pretty = dir.as_ref().join(&config.pretty_file_name);
    let compact = dir.as_ref().join(&config.compact_file_name);
    write_file(&pretty, |writer| write_pretty(writer, value))?;
    write_file(&compact, |writer| write_compact(writer, value))?;
    Ok([pretty, compact])
}

fn write_file<F>(path: &Path, f: F) -> Result<(), merge::Error>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), serde_json::Error>,
{
    debug!("Writing {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    f(&mut writer)?;
    writer.flush()?;
    Ok(())
}
