//! I/O module
//!
//! Handles command CSV parsing and balance output for the replay driver.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, output serialization)
//! - `sync_reader` - Streaming CSV reader with iterator interface

pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{convert_csv_command, format_amount, write_balances_csv, CsvCommand};
pub use sync_reader::SyncReader;
