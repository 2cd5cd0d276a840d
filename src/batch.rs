use crate::{
    converter::{FileConverter, FileReport},
    error::{Error, Result},
    settings::Settings,
};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// File processed when a batch is started without filenames.
pub const DEFAULT_INPUT: &str = "text.txt";

/// Outcome of one file task.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Output was written
    Converted(FileReport),
    /// Task failed; no output was written
    Failed {
        /// Input file
        path: PathBuf,
        /// Cause of the failure
        error: Error,
    },
}

impl FileOutcome {
    /// Input file of the task.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Converted(report) => report.input.as_path(),
            Self::Failed { path, .. } => path.as_path(),
        }
    }

    /// Returns true if output was written.
    #[must_use]
    pub const fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }
}

/// Outcomes of every file in a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-file outcomes
    pub outcomes: Vec<FileOutcome>,

    /// Wall time of the batch
    pub duration: Duration,
}

impl BatchReport {
    /// Number of files converted.
    #[must_use]
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    /// Failed files with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { path, error } => Some((path.as_path(), error)),
            FileOutcome::Converted(_) => None,
        })
    }

    /// Total number of unclassified lines across converted files.
    #[must_use]
    pub fn unclassified_lines(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Converted(report) => Some(report.unclassified),
                FileOutcome::Failed { .. } => None,
            })
            .sum()
    }

    /// Returns true if every file was converted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Logs a summary of the batch.
    pub fn log_summary(&self) {
        info!(
            "Converted {}/{} files in {:.2}s",
            self.converted(),
            self.outcomes.len(),
            self.duration.as_secs_f64()
        );

        let unclassified = self.unclassified_lines();
        if unclassified > 0 {
            warn!("{unclassified} line(s) could not be classified");
        }

        for (path, error) in self.failures() {
            warn!("  {}: {error}", path.display());
        }
    }
}

/// Runs one conversion task per file on a worker pool.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    jobs: usize,
}

impl BatchRunner {
    /// Creates a runner with `jobs` workers; `0` uses one worker per CPU.
    #[must_use]
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// Number of workers.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Converts every file and waits for all tasks to finish.
    ///
    /// An empty list processes [`DEFAULT_INPUT`]. Tasks do not affect each
    /// other: a failing or panicking task becomes a [`FileOutcome::Failed`]
    /// entry while the rest of the batch continues.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ThreadPool`] if the worker pool cannot be created.
    #[instrument(skip_all, fields(files = filenames.len()))]
    pub fn run<P>(&self, filenames: &[P], settings: &Settings) -> Result<BatchReport>
    where
        P: AsRef<Path> + Sync,
    {
        let paths = input_paths(filenames);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.min(paths.len()).max(1))
            .thread_name(|i| format!("lineconv-worker-{i}"))
            .build()?;

        let start = Instant::now();
        let converter = FileConverter::new(settings);

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| Self::run_task(converter, path))
                .collect()
        });

        Ok(BatchReport {
            outcomes,
            duration: start.elapsed(),
        })
    }

    fn run_task(converter: FileConverter<'_>, path: &Path) -> FileOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| converter.process(path))) {
            Ok(Ok(report)) => FileOutcome::Converted(report),
            Ok(Err(error)) => FileOutcome::Failed {
                path: path.to_path_buf(),
                error,
            },
            Err(payload) => {
                let error = Error::task_panicked(path, panic_message(payload.as_ref()));
                error!("{error}");
                FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Files a batch processes, falling back to [`DEFAULT_INPUT`].
fn input_paths<P: AsRef<Path>>(filenames: &[P]) -> Vec<PathBuf> {
    if filenames.is_empty() {
        vec![PathBuf::from(DEFAULT_INPUT)]
    } else {
        filenames.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::fs;

    #[test]
    fn test_runner_jobs_default_to_cpus() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
        assert_eq!(BatchRunner::new(3).jobs(), 3);
    }

    #[test]
    fn test_batch_isolates_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let ok = temp.child("ok.txt");
        ok.write_str("1 ab\n").unwrap();
        let missing = temp.path().join("missing.txt");

        let settings = Settings::default();
        let report = BatchRunner::new(2)
            .run(&[ok.path().to_path_buf(), missing.clone()], &settings)
            .unwrap();

        assert_eq!(report.converted(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures[0].0, missing.as_path());
        assert!(failures[0].1.is_file_open());

        assert_eq!(
            fs::read_to_string(temp.child("ok.txt.out").path()).unwrap(),
            "1 b\n1 1\n"
        );
        assert!(!temp.child("missing.txt.out").exists());
    }

    #[test]
    fn test_outcomes_keep_input_order() {
        let temp = assert_fs::TempDir::new().unwrap();
        let names: Vec<PathBuf> = (0..8)
            .map(|i| {
                let child = temp.child(format!("f{i}.txt"));
                child.write_str(&format!("{i} abcdefgh\n")).unwrap();
                child.path().to_path_buf()
            })
            .collect();

        let settings = Settings::default();
        let report = BatchRunner::new(4).run(&names, &settings).unwrap();

        assert!(report.is_success());
        let paths: Vec<&Path> = report.outcomes.iter().map(FileOutcome::path).collect();
        let expected: Vec<&Path> = names.iter().map(PathBuf::as_path).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_files_are_independent() {
        let temp = assert_fs::TempDir::new().unwrap();
        let a = temp.child("a.txt");
        a.write_str("0 x\nbad line here\n").unwrap();
        let b = temp.child("b.txt");
        b.write_str("2019-05-01\n").unwrap();

        let settings = Settings::default();
        let report = BatchRunner::new(2)
            .run(&[a.path(), b.path()], &settings)
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.unclassified_lines(), 1);
        assert_eq!(
            fs::read_to_string(temp.child("a.txt.out").path()).unwrap(),
            "1 x\n0 \n1 2\n"
        );
        assert_eq!(
            fs::read_to_string(temp.child("b.txt.out").path()).unwrap(),
            "19 05/01/2019 00:00:00\n1 1\n"
        );
    }

    #[test]
    fn test_empty_list_defaults_to_text_txt() {
        let names: [PathBuf; 0] = [];
        assert_eq!(input_paths(&names), vec![PathBuf::from(DEFAULT_INPUT)]);
    }

    #[test]
    fn test_input_paths_keep_given_names() {
        let names = ["a.txt", "b.txt"];
        assert_eq!(
            input_paths(&names),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
