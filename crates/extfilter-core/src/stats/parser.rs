//! Parser for the `key=value` stats file format.
//!
//! [`parse_line`] is a pure function over a single line; [`StatsReader`]
//! drives it lazily over any [`BufRead`], skipping blank lines and tagging
//! every failure with its line number.

use std::io::{self, BufRead};
use std::num::ParseFloatError;

use thiserror::Error;

/// One parsed `key=value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    /// Dotted metric key, e.g. `worker.0.3.total_packets`.
    pub key: String,
    pub value: f64,
}

/// Why a single line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing '=' separator")]
    MissingSeparator,
    #[error("empty metric key")]
    EmptyKey,
    #[error("invalid value {value:?} for {key}: {source}")]
    InvalidValue {
        key: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Error produced while iterating a stats file.
///
/// Only [`ReadError::Io`] ends the iteration; the other variants describe a
/// single skipped line.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("line {line}: not valid UTF-8")]
    Encoding { line: usize },
    #[error("read failed after line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    /// Returns `true` if no further lines can be read.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReadError::Io { .. })
    }
}

/// Parses one trimmed, non-empty stats line.
///
/// The key is everything before the first `=`, the value everything after
/// it. Surrounding whitespace on either side is ignored.
pub fn parse_line(line: &str) -> Result<StatLine, ParseError> {
    let (key, value) = line.split_once('=').ok_or(ParseError::MissingSeparator)?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() {
        return Err(ParseError::EmptyKey);
    }

    let parsed = value.parse::<f64>().map_err(|source| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })?;

    Ok(StatLine {
        key: key.to_string(),
        value: parsed,
    })
}

/// Lazy iterator over the stat lines of a reader.
///
/// Yields one item per non-blank line. After an I/O error the iterator is
/// exhausted.
pub struct StatsReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl<R: BufRead> StatsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(128),
            line: 0,
            done: false,
        }
    }

    /// Number of physical lines consumed so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for StatsReader<R> {
    type Item = Result<StatLine, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line += 1;
                    let Ok(text) = std::str::from_utf8(&self.buf) else {
                        return Some(Err(ReadError::Encoding { line: self.line }));
                    };
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return Some(parse_line(text).map_err(|source| ReadError::Parse {
                        line: self.line,
                        source,
                    }));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(ReadError::Io {
                        line: self.line,
                        source,
                    }));
                }
            }
        }
        None
    }
}
