use std::fmt;
use std::io::{self, BufRead};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    // <kind> <hex address>,<decimal size>, with optional surrounding whitespace and 0x prefix
    static ref RECORD_PATTERN: Regex =
        Regex::new(r"^\s*(?P<kind>[ILSM])\s+(?:0[xX])?(?P<address>[0-9a-fA-F]+),\s*(?P<size>-?[0-9]+)\s*$").unwrap();
}

/// The operation of a trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Instruction fetch, never reaches the cache
    Instruction,
    Load,
    Store,
    /// A load immediately followed by a store to the same address
    Modify,
}

impl AccessKind {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'I' => Some(AccessKind::Instruction),
            'L' => Some(AccessKind::Load),
            'S' => Some(AccessKind::Store),
            'M' => Some(AccessKind::Modify),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            AccessKind::Instruction => 'I',
            AccessKind::Load => 'L',
            AccessKind::Store => 'S',
            AccessKind::Modify => 'M',
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One line of a trace. The size is carried for reporting only, it has no effect on the cache,
/// so any decimal integer is accepted, negative ones included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    pub kind: AccessKind,
    pub address: u64,
    pub size: i32,
}

impl AccessRecord {
    pub fn new(kind: AccessKind, address: u64, size: i32) -> Self {
        Self { kind, address, size }
    }
}

/// Formats as a trace line, the address in hex without padding or prefix
impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind, self.address, self.size)
    }
}

/// Parses a single trace line, returning None if it isn't a well formed record
///
/// # Examples
///
/// ```
/// use cachelib::trace::{parse_record, AccessKind};
/// let record = parse_record(" L 7ff000398,8").unwrap();
/// assert_eq!(record.kind, AccessKind::Load);
/// assert_eq!(record.address, 0x7ff000398);
/// assert_eq!(record.size, 8);
/// assert!(parse_record("L 10").is_none());
/// ```
pub fn parse_record(line: &str) -> Option<AccessRecord> {
    let captures = RECORD_PATTERN.captures(line)?;
    let kind = AccessKind::from_letter(captures["kind"].chars().next()?)?;
    // Both can still overflow even though the pattern matched
    let address = u64::from_str_radix(&captures["address"], 16).ok()?;
    let size = captures["size"].parse().ok()?;
    Some(AccessRecord { kind, address, size })
}

/// Reads access records from a trace, one per line
///
/// Blank lines are skipped. The first line which isn't a well formed record ends the trace, as
/// there is no way to tell what follows it. Read errors from the underlying source are passed
/// on
pub struct TraceReader<R: BufRead> {
    source: R,
    buffer: Vec<u8>,
    line_number: u64,
    finished: bool,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            line_number: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = io::Result<AccessRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match self.source.read_until(b'\n', &mut self.buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line_number += 1;
                    let line = match std::str::from_utf8(&self.buffer) {
                        Ok(line) => line,
                        Err(_) => {
                            warn!(line = self.line_number, "trace line isn't valid UTF-8, stopping");
                            self.finished = true;
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_record(line) {
                        Some(record) => return Some(Ok(record)),
                        None => {
                            warn!(line = self.line_number, content = line.trim_end(), "malformed trace record, stopping");
                            self.finished = true;
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
