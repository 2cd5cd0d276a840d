//! # lineconv
//!
//! Converts batches of text files, line by line, into length-prefixed output files.
//!
//! ## Features
//!
//! - One parallel task per input file, with failures isolated per file
//! - Ordered conversion rules: date/time, character-index instruction, number
//! - Culture-aware parsing with the culture passed explicitly to every call
//! - Atomic output writes
//!
//! ## Quick Start
//!
//! ```no_run
//! use lineconv::{BatchRunner, Settings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::load("settings.xml")?;
//! let report = BatchRunner::new(0).run(&["a.txt", "b.txt"], &settings)?;
//! report.log_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Output format
//!
//! For an input `F`, `F.out` holds one line per non-empty input line plus a
//! trailing line for the count of such lines. Each is written as
//! `<length> <converted>`, where `<converted>` is the result of the first rule
//! that accepts the line, or empty if none does.
//!
//! ## Architecture
//!
//! 1. **BatchRunner**: Starts one task per file and collects outcomes
//! 2. **FileConverter**: Resolves the culture, converts and writes one file
//! 3. **LineSource**: Yields trimmed non-empty lines and the trailing count
//! 4. **ValueClassifier**: Applies the conversion rules to a single line

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod batch;
mod classifier;
mod converter;
mod culture;
mod datetime;
mod error;
mod settings;
mod source;
mod writer;

pub use batch::{BatchReport, BatchRunner, DEFAULT_INPUT, FileOutcome};
pub use classifier::{Conversion, ConversionOutcome, ValueClassifier};
pub use converter::{FileConverter, FileReport, format_output_line};
pub use culture::{Culture, DateOrder, format_invariant};
pub use error::{Error, Result};
pub use settings::{DEFAULT_SETTINGS_FILE, Settings, SettingsBuilder};
pub use source::LineSource;

/// Converts `filenames` with one worker per CPU.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be created. Per-file
/// failures are reported in the returned [`BatchReport`].
///
/// # Examples
///
/// ```no_run
/// use lineconv::{run, Settings};
///
/// # fn main() -> anyhow::Result<()> {
/// let report = run(&["text.txt"], &Settings::default())?;
/// assert!(report.is_success());
/// # Ok(())
/// # }
/// ```
pub fn run<P>(filenames: &[P], settings: &Settings) -> Result<BatchReport>
where
    P: AsRef<std::path::Path> + Sync,
{
    BatchRunner::default().run(filenames, settings)
}
