//! Line-by-line reading of captured simulator logs.
//!
//! A `LogLoader` owns its file handle; the handle is released when the loader
//! is dropped, which happens when the extractor that opened it returns.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, Result};

/// Buffer size for reading log files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Sequential reader over the non-empty lines of a log file.
pub struct LogLoader {
    reader: BufReader<File>,
    path: PathBuf,
    line_buffer: Vec<u8>,
}

impl LogLoader {
    /// Open a log file.
    ///
    /// # Returns
    ///
    /// `Err(AnalyzerError::MissingInput)` if the file does not exist or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| AnalyzerError::missing_input(path, e))?;

        Ok(Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, file),
            path: path.to_path_buf(),
            line_buffer: Vec::with_capacity(512),
        })
    }

    /// Read the next non-empty line with trailing whitespace removed.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, since simulator logs
    /// occasionally interleave raw process output. Returns `None` at EOF.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.line_buffer.clear();

            let read = self
                .reader
                .read_until(b'\n', &mut self.line_buffer)
                .map_err(AnalyzerError::Io)?;
            if read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.line_buffer);
            let line = line.trim_end();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    /// Read every remaining line.
    pub fn read_lines(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line);
        }
        log::trace!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = LogLoader::open(&dir.path().join("absent.log"));
        assert!(matches!(result, Err(AnalyzerError::MissingInput { .. })));
    }

    #[test]
    fn skips_empty_lines_and_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first  \n\n\r\nsecond\r\nthird").unwrap();

        let lines = LogLoader::open(file.path()).unwrap().read_lines().unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn tolerates_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok\n\xff\xfe garbage\nlast\n").unwrap();

        let lines = LogLoader::open(file.path()).unwrap().read_lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "last");
    }
}
