use crate::{
    classifier::ValueClassifier,
    error::Result,
    settings::Settings,
    source::LineSource,
    writer,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Input file
    pub input: PathBuf,

    /// Written output file
    pub output: PathBuf,

    /// Number of non-empty input lines, excluding the trailing count line
    pub lines: usize,

    /// Number of lines no rule could convert
    pub unclassified: usize,
}

/// Formats a converted line as `<length> <converted>`.
///
/// The length counts characters, not bytes.
#[must_use]
pub fn format_output_line(converted: &str) -> String {
    format!("{} {}", converted.chars().count(), converted)
}

/// Converts single files into `<file>.out`.
///
/// Owns nothing but a reference to the shared settings, so one converter can
/// serve every task of a batch.
#[derive(Debug, Clone, Copy)]
pub struct FileConverter<'a> {
    settings: &'a Settings,
}

impl<'a> FileConverter<'a> {
    /// Creates a converter for the given settings.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Converts `path` and writes `<path>.out`.
    ///
    /// The output is written only after every line has been converted. Lines
    /// no rule accepts become empty values and do not stop the file.
    ///
    /// # Errors
    ///
    /// Returns an error, after logging it, if the culture is unknown, the
    /// input cannot be opened or read, or the output cannot be written. No
    /// output file is produced in that case.
    #[instrument(skip_all, fields(file = %path.display()))]
    pub fn process(&self, path: &Path) -> Result<FileReport> {
        self.convert_file(path).inspect_err(|e| {
            error!("Failed to convert {}: {e}", path.display());
        })
    }

    fn convert_file(&self, path: &Path) -> Result<FileReport> {
        let culture = self.settings.culture()?;

        if self.settings.verbose {
            info!("Processing file {}", path.display());
            info!("Source culture {}", culture.display_name());
        }

        let classifier = ValueClassifier::new(culture);
        let mut output = Vec::new();
        let mut unclassified = 0;

        for line in LineSource::prepare(path)? {
            let conversion = classifier.convert(&line?);
            if conversion.is_unclassified() {
                unclassified += 1;
            }
            output.push(format_output_line(&conversion.value));
        }

        let output_path = writer::output_path(path);
        writer::write_lines_atomic(&output_path, &output)?;

        let report = FileReport {
            input: path.to_path_buf(),
            output: output_path,
            lines: output.len().saturating_sub(1),
            unclassified,
        };

        if self.settings.verbose {
            info!(
                "Finished {} ({} lines, {} unclassified) -> {}",
                path.display(),
                report.lines,
                report.unclassified,
                report.output.display()
            );
        }

        Ok(report)
    }
}
