//! Stream-file reading.
//!
//! A stream file is consumed line by line. Files past the mapping threshold
//! are memory-mapped and split in place, smaller ones go through a buffered
//! reader. Each line keeps its terminator, so fragments carry the exact
//! text of the file.

// Memory mapping requires unsafe but is well-documented and safe for read-only access
#![allow(unsafe_code)]

use crate::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Files of at least this size (1 MiB) are memory-mapped.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Reads the lines of a stream file, each keeping its terminator.
///
/// A final line without a newline is returned as is.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing file, and
/// [`IoError::ReadFailed`] if the file cannot be read or a line is not
/// valid UTF-8.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let display = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(IoError::FileNotFound { path: display }.into());
    }

    let file = File::open(path).map_err(|e| read_failed(&display, &e))?;
    let size = file
        .metadata()
        .map_err(|e| read_failed(&display, &e))?
        .len();

    if size >= MMAP_THRESHOLD {
        mapped_lines(&file, &display)
    } else {
        buffered_lines(file, &display)
    }
}

fn mapped_lines(file: &File, path: &str) -> Result<Vec<String>> {
    // Safety: read-only mapping, dropped before returning
    let mmap = unsafe {
        Mmap::map(file).map_err(|e| IoError::MmapFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?
    };

    mmap.split_inclusive(|&b| b == b'\n')
        .enumerate()
        .map(|(index, line)| decode_line(line, index, path))
        .collect()
}

fn buffered_lines(file: File, path: &str) -> Result<Vec<String>> {
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| read_failed(path, &e))?;
        if n == 0 {
            return Ok(lines);
        }
        lines.push(decode_line(&line, lines.len(), path)?);
    }
}

fn decode_line(bytes: &[u8], index: usize, path: &str) -> Result<String> {
    std::str::from_utf8(bytes).map(str::to_string).map_err(|e| {
        IoError::ReadFailed {
            path: path.to_string(),
            reason: format!("invalid UTF-8 on line {}: {e}", index + 1),
        }
        .into()
    })
}

fn read_failed(path: &str, err: &std::io::Error) -> IoError {
    IoError::ReadFailed {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_small_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("online.lp");
        std::fs::write(&file_path, "#step 1.\na.\n").unwrap();

        assert_eq!(read_lines(&file_path).unwrap(), ["#step 1.\n", "a.\n"]);
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_lines("/nonexistent/path/online.lp");
        assert!(matches!(
            result,
            Err(crate::Error::Io(IoError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_read_lines_keeps_terminators() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("online.lp");
        std::fs::write(&file_path, "a.\r\nb.\nc.").unwrap();

        assert_eq!(read_lines(&file_path).unwrap(), ["a.\r\n", "b.\n", "c."]);
    }

    #[test]
    fn test_empty_file_has_no_lines() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("online.lp");
        std::fs::write(&file_path, "").unwrap();

        assert!(read_lines(&file_path).unwrap().is_empty());
    }

    #[test]
    fn test_large_file_split_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("large.lp");
        let mut content = "observed(1).\n".repeat(100_000);
        content.push_str("#stop.");
        std::fs::write(&file_path, &content).unwrap();
        assert!(std::fs::metadata(&file_path).unwrap().len() >= MMAP_THRESHOLD);

        let lines = read_lines(&file_path).unwrap();
        assert_eq!(lines.len(), 100_001);
        assert_eq!(lines[0], "observed(1).\n");
        assert_eq!(lines[100_000], "#stop.");
        assert_eq!(lines.concat(), content);
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bad.lp");
        std::fs::write(&file_path, [b'a', b'.', b'\n', b'b', 0xff, b'\n']).unwrap();

        let err = read_lines(&file_path).unwrap_err();
        assert!(matches!(err, crate::Error::Io(IoError::ReadFailed { .. })));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_utf8_in_mapped_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bad.lp");
        let mut content = "observed(1).\n".repeat(100_000).into_bytes();
        content.extend_from_slice(&[b'x', 0xfe, b'\n']);
        std::fs::write(&file_path, &content).unwrap();

        let err = read_lines(&file_path).unwrap_err();
        assert!(err.to_string().contains("line 100001"));
    }
}
