//! Reader for the extfilter stats file.
//!
//! extfilter periodically rewrites a plain text file with one counter per
//! line, `key=value`, where the key is a dotted path such as
//! `worker.0.3.total_packets`. This module turns that text into
//! [`StatLine`]s and knows nothing about what the keys mean.

pub mod parser;

pub use parser::{ParseError, ReadError, StatLine, StatsReader, parse_line};
