use std::io::{self, BufRead, Lines};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // op, address (optional 0x), then an optional unused field
    static ref TRACE_LINE: Regex =
        Regex::new(r"^([ls])\s+(?:0[xX])?([0-9a-fA-F]+)(?:\s+\S+)?$").expect("trace line pattern is valid");
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Load,
    Store,
}

/// A single event from a trace
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryAccess {
    pub operation: Operation,
    pub address: u32,
}

impl MemoryAccess {
    pub fn load(address: u32) -> Self {
        Self { operation: Operation::Load, address }
    }

    pub fn store(address: u32) -> Self {
        Self { operation: Operation::Store, address }
    }
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("couldn't read the trace: {0}")]
    Io(#[from] io::Error),
    #[error("malformed trace line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}

/// Parses one trace line of the form `<l|s> <hex address> <extra>`
///
/// Blank lines give `Ok(None)`. The trailing field (an instruction count in the usual trace
/// format) is accepted but not used.
///
/// # Arguments
///
/// * `line`: The line, without its terminator
/// * `line_number`: 1-based, only used for the error
///
/// returns: Result<Option<MemoryAccess>, TraceError>
///
/// # Examples
///
/// ```
/// use csimlib::trace::{parse_line, MemoryAccess};
/// let access = parse_line("s 0x1fffff50 1", 1).unwrap();
/// assert_eq!(access, Some(MemoryAccess::store(0x1fffff50)));
/// ```
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<MemoryAccess>, TraceError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let malformed = || TraceError::Malformed { line: line_number, content: line.to_string() };
    let captures = TRACE_LINE.captures(trimmed).ok_or_else(malformed)?;
    let operation = match &captures[1] {
        "l" => Operation::Load,
        _ => Operation::Store,
    };
    let address = u32::from_str_radix(&captures[2], 16).map_err(|_| malformed())?;
    Ok(Some(MemoryAccess { operation, address }))
}

/// Iterates over the accesses of a trace, skipping blank lines
///
/// Reads lazily, so errors surface at the line where they occur
pub struct TraceReader<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line_number: 0 }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<MemoryAccess, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;
            match parse_line(&line, self.line_number) {
                Ok(Some(access)) => return Some(Ok(access)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Reads and validates a whole trace up front
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<MemoryAccess>, TraceError> {
    TraceReader::new(reader).collect()
}
