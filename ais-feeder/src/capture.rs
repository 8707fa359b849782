//! Line input for AIS feeds.
//!
//! Input modes:
//! - `LineReader`: NMEA lines from a file or stdin (`-`), one sentence per line
//! - `datagram_lines`: sentences packed into one UDP datagram

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Line Reader
// ---------------------------------------------------------------------------

/// Read NMEA sentences from a file, or from stdin when the path is `-`.
///
/// Accepts plain `!AIVDM` lines, tag-block prefixed lines, and logs with
/// `#` comments or blank lines between captures.
pub struct LineReader {
    path: PathBuf,
}

impl LineReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LineReader { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }

    /// Open the input. Each item is a cleaned sentence line; invalid UTF-8
    /// is replaced rather than ending the read.
    pub fn lines(&self) -> io::Result<impl Iterator<Item = String>> {
        let reader: Box<dyn BufRead> = if self.is_stdin() {
            Box::new(io::stdin().lock())
        } else {
            Box::new(BufReader::new(fs::File::open(&self.path)?))
        };
        Ok(reader.split(b'\n').map_while(io::Result::ok).filter_map(|raw| {
            clean_line(&String::from_utf8_lossy(&raw)).map(str::to_string)
        }))
    }
}

/// Strip whitespace and line endings; `None` for blanks and `#` comments.
pub fn clean_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line)
}

/// Split a UDP datagram into sentence lines. Receivers commonly pack
/// several sentences per datagram separated by CR/LF.
pub fn datagram_lines(datagram: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(datagram)
        .lines()
        .filter_map(clean_line)
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_line_plain() {
        assert_eq!(
            clean_line("!AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0*3A\r"),
            Some("!AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0*3A")
        );
    }

    #[test]
    fn test_clean_line_whitespace() {
        assert_eq!(clean_line("  !AIVDO,1,1,,,x,0*00  "), Some("!AIVDO,1,1,,,x,0*00"));
    }

    #[test]
    fn test_clean_line_comment() {
        assert!(clean_line("# capture started").is_none());
        assert!(clean_line("   # indented").is_none());
    }

    #[test]
    fn test_clean_line_empty() {
        assert!(clean_line("").is_none());
        assert!(clean_line(" \t ").is_none());
    }

    #[test]
    fn test_line_reader_skips_noise() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# harbour log").unwrap();
        writeln!(file, "!AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0*3A").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  !AIVDM,2,2,3,B,1@0000000000000,2*55  ").unwrap();

        let reader = LineReader::new(file.path());
        assert!(!reader.is_stdin());
        let lines: Vec<String> = reader.lines().unwrap().collect();
        assert_eq!(
            lines,
            vec![
                "!AIVDM,1,1,,B,15MqdBP000G@qoLEi69PVGaN0D0=,0*3A",
                "!AIVDM,2,2,3,B,1@0000000000000,2*55",
            ]
        );
    }

    #[test]
    fn test_line_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let reader = LineReader::new(dir.path().join("nope.nmea"));
        assert!(reader.lines().is_err());
    }

    #[test]
    fn test_datagram_lines() {
        let datagram = b"!AIVDM,2,1,3,B,55P5TL01VIaAL@7WKO@mBplU@<PDhh000000001S;AJ::4A80?4i@E53,0*3E\r\n\
!AIVDM,2,2,3,B,1@0000000000000,2*55\r\n\r\n";
        let lines = datagram_lines(datagram);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("2*55"));
    }

    #[test]
    fn test_stdin_marker() {
        assert!(LineReader::new("-").is_stdin());
    }
}
