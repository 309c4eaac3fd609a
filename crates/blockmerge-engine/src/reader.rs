//! Line reader for normalized entry files.
//!
//! Every non-blank, non-comment line is one entry. Lines are trimmed before
//! the comment check, so indented comments are skipped too.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use blockmerge_core::{MergeError, Result};

/// Comment markers recognised when nothing else is configured.
pub const DEFAULT_COMMENT_PREFIXES: &[&str] =
    &["#", "!", ";", "//", "--", "%", "rem ", "[", "<!--"];

/// Reads entries from line-delimited files, dropping comments and blanks.
#[derive(Debug, Clone)]
pub struct LineReader {
    comment_prefixes: Vec<String>,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_PREFIXES.iter().copied())
    }
}

impl LineReader {
    /// Create a reader that treats lines starting with any of `prefixes` as comments.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comment_prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Returns true if the (already trimmed) line is a comment.
    #[must_use]
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()))
    }

    /// Extract the entry from a raw line, if it holds one.
    #[must_use]
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim();
        if trimmed.is_empty() || self.is_comment(trimmed) {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Read every entry from a file, in file order.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily for the comment
    /// check; such lines that still hold an entry are dropped.
    pub fn read_entries(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path).map_err(|e| MergeError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut buf = Vec::new();
        let mut undecodable = 0usize;

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| MergeError::io(path, e))?;
            if n == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let Some(entry) = self.parse_line(&line) else {
                continue;
            };
            if matches!(line, Cow::Owned(_)) {
                undecodable += 1;
                continue;
            }
            entries.push(entry.to_string());
        }

        if undecodable > 0 {
            warn!(
                path = %path.display(),
                lines = undecodable,
                "dropped lines that are not valid UTF-8"
            );
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn skips_comments_and_blanks() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            "# header\n\nexample.com\n  ! adblock comment\n  spaced.org  \n// c-style\n\
             rem windows comment\n[Adblock Plus 2.0]\n<!-- html -->\n%pct\n;semi\n-- sql\nlast.net"
        )
        .unwrap();
        tmp.flush().unwrap();

        let entries = LineReader::default().read_entries(tmp.path()).unwrap();
        assert_eq!(entries, vec!["example.com", "spaced.org", "last.net"]);
    }

    #[test]
    fn custom_prefixes() {
        let reader = LineReader::new(["@@"]);
        assert!(reader.is_comment("@@||allowed.com^"));
        assert!(!reader.is_comment("# not a comment here"));
        assert_eq!(reader.parse_line("  #kept  "), Some("#kept"));
    }

    #[test]
    fn empty_prefix_is_ignored() {
        let reader = LineReader::new(["", "#"]);
        assert_eq!(reader.parse_line("a.com"), Some("a.com"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LineReader::default()
            .read_entries(Path::new("/nonexistent/blockmerge/list.txt"))
            .unwrap_err();
        assert!(matches!(err, MergeError::Io { .. }));
    }

    #[test]
    fn invalid_utf8_only_costs_its_line() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"# caf\xe9 list\nbad.com\nw\xffrd.com\r\nworse.com\r\n")
            .unwrap();
        tmp.flush().unwrap();

        let entries = LineReader::default().read_entries(tmp.path()).unwrap();
        assert_eq!(entries, vec!["bad.com", "worse.com"]);
    }
}
