//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger commands from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use asset_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Command: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Row-level errors are yielded as `ParseError`s carrying the file line
//!   number (blank lines included), and iteration continues with the next row

use crate::io::csv_format::{convert_csv_command, CsvCommand};
use crate::types::{LedgerCommand, LedgerError};
use csv::{Position, ReaderBuilder, Trim};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with the file.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    layout: LineLayout,
}

/// Line-ending facts needed to map reader positions back to file lines
///
/// The CSV reader skips blank lines without yielding them, so line numbers
/// come from its position after each record. An LF terminator is consumed
/// with its record; the LF of a CRLF pair is only consumed by the next read.
#[derive(Debug, Clone, Copy)]
struct LineLayout {
    len: u64,
    crlf: bool,
    trailing_newline: bool,
}

impl LineLayout {
    /// Inspect the first line and the last byte, then rewind
    fn probe(file: &mut File) -> io::Result<Self> {
        let len = file.metadata()?.len();

        let mut head = Vec::new();
        (&mut *file).take(8 * 1024).read_to_end(&mut head)?;
        let crlf = head
            .iter()
            .position(|&b| b == b'\n')
            .is_some_and(|i| i > 0 && head[i - 1] == b'\r');

        let trailing_newline = if len == 0 {
            false
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            last[0] == b'\n'
        };

        file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            len,
            crlf,
            trailing_newline,
        })
    }

    /// Line on which the record just read ends
    fn record_line(&self, end: &Position) -> u64 {
        let lf_consumed = !self.crlf && (end.byte() < self.len || self.trailing_newline);
        if lf_consumed {
            end.line().saturating_sub(1)
        } else {
            end.line()
        }
    }
}

impl SyncReader {
    /// Open a command file
    ///
    /// The CSV reader trims whitespace from all fields and accepts rows that
    /// omit trailing optional columns.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::from(e),
        })?;
        let layout = LineLayout::probe(&mut file)?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self { reader, layout })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerCommand, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvCommand>();
        let row = deserializer.next()?;
        let line = self.layout.record_line(self.reader.position());

        Some(
            row.map_err(LedgerError::from)
                .and_then(convert_csv_command)
                .map_err(|e| match e {
                    LedgerError::ParseError { message, .. } => LedgerError::ParseError {
                        line: Some(line),
                        message,
                    },
                    other => LedgerError::ParseError {
                        line: Some(line),
                        message: other.to_string(),
                    },
                }),
        )
    }
}
