use crate::error::{Error, Result};
use std::{
    ffi::OsString,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

const OUTPUT_SUFFIX: &str = ".out";
const TEMP_SUFFIX: &str = ".tmp";

/// Returns the output path for an input file, `<input>.out`.
#[must_use]
pub(crate) fn output_path(input: &Path) -> PathBuf {
    with_suffix(input, OUTPUT_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `lines` to `path` atomically, each terminated by `\n`.
///
/// # Process
///
/// 1. Writes content to `<path>.tmp`
/// 2. Syncs the temporary file to disk
/// 3. Renames it over `path`, replacing any existing file
///
/// A failure leaves any previous file at `path` untouched.
pub(crate) fn write_lines_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let temp_path = with_suffix(path, TEMP_SUFFIX);

    if let Err(e) = write_lines(&temp_path, lines) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for line in lines {
        writeln!(writer, "{line}").map_err(|e| Error::io(path, e))?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| Error::io(path, e.into_error()))?;

    // Ensure data is flushed to disk
    file.sync_all().map_err(|e| Error::io(path, e))
}
