use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Single-pass sequence of prepared lines read from one input.
///
/// Yields every non-empty line trimmed of surrounding whitespace, then one
/// trailing line holding the count of lines yielded before it. Lines that are
/// exactly empty are skipped and not counted; whitespace-only lines are
/// counted and come out as empty strings.
///
/// A read failure is yielded once as an error and ends the sequence without
/// the trailing count.
#[derive(Debug)]
pub struct LineSource<R> {
    lines: Lines<R>,
    path: PathBuf,
    count: usize,
    finished: bool,
}

impl LineSource<BufReader<File>> {
    /// Opens `path` for line-based reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileOpen`] if the file cannot be opened.
    pub fn prepare(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_open(path, &e))?;
        debug!("Opened {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), path))
    }
}

impl<R: BufRead> LineSource<R> {
    /// Wraps an already open reader. `path` is only used in error messages.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            count: 0,
            finished: false,
        }
    }

    /// Number of input lines yielded so far, excluding the trailing count.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.count
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(Ok(line)) if line.is_empty() => {}
                Some(Ok(line)) => {
                    self.count += 1;
                    return Some(Ok(line.trim().to_string()));
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(Error::io(&self.path, e)));
                }
                None => {
                    self.finished = true;
                    return Some(Ok(self.count.to_string()));
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LineSource<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::io::Cursor;

    fn collect(input: &str) -> Vec<String> {
        LineSource::from_reader(Cursor::new(input.to_string()), "test.txt")
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_skips_empty_lines_and_appends_count() {
        let lines = collect("3 abc\n\n2019-05-01\nnot-a-number\n");
        assert_eq!(lines, vec!["3 abc", "2019-05-01", "not-a-number", "3"]);
    }

    #[test]
    fn test_whitespace_only_lines_are_kept_and_counted() {
        let lines = collect("a\n   \n\tb  \n");
        assert_eq!(lines, vec!["a", "", "b", "3"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let lines = collect("one\r\n\r\ntwo\r\n");
        assert_eq!(lines, vec!["one", "two", "2"]);
    }

    #[test]
    fn test_empty_input_yields_zero() {
        assert_eq!(collect(""), vec!["0"]);
    }

    #[test]
    fn test_last_line_without_newline() {
        assert_eq!(collect("x\ny"), vec!["x", "y", "2"]);
    }

    #[test]
    fn test_sequence_is_single_pass() {
        let mut source = LineSource::from_reader(Cursor::new("a\n"), "test.txt");
        assert_eq!(source.next().unwrap().unwrap(), "a");
        assert_eq!(source.next().unwrap().unwrap(), "1");
        assert!(source.next().is_none());
        assert!(source.next().is_none());
        assert_eq!(source.lines_read(), 1);
    }

    #[test]
    fn test_lines_read_tracks_progress() {
        let mut source = LineSource::from_reader(Cursor::new("a\n\nb\n"), "test.txt");
        assert_eq!(source.lines_read(), 0);
        assert!(source.next().is_some());
        assert_eq!(source.lines_read(), 1);
        assert!(source.next().is_some());
        assert_eq!(source.lines_read(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_reported_once() {
        let bytes: &[u8] = b"ok\n\xff\xfe\nlater\n";
        let items: Vec<_> = LineSource::from_reader(Cursor::new(bytes), "bad.txt").collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "ok");
        assert!(items[1].as_ref().unwrap_err().is_io());
    }

    #[test]
    fn test_prepare_reads_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("input.txt");
        file.write_str("first\n\nsecond\n").unwrap();

        let lines: Vec<String> = LineSource::prepare(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["first", "second", "2"]);
    }

    #[test]
    fn test_prepare_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = LineSource::prepare(temp.path().join("missing.txt")).unwrap_err();
        assert!(err.is_file_open());
    }
}
