//! CSV import/export for rollcall.
//!
//! Serializes attendance sheets for download and parses employee-directory
//! bulk imports. RFC 4180 quoting, CRLF record separators, and a UTF-8 BOM on
//! export so spreadsheet applications detect the encoding.

pub mod error;
pub mod parse;
pub mod serialize;

pub use error::{Error, Result};
pub use parse::parse_employees;
pub use serialize::{attendance_sheet, export_filename};
