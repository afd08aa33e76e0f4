//! Error types for `rollcall-csv`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input has no header row")]
  MissingHeader,

  #[error("header is missing required column {0:?}")]
  MissingColumn(&'static str),

  #[error("line {number}: {reason}")]
  Line { number: usize, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
