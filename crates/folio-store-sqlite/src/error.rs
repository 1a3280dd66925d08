//! Error type for `folio-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] folio_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("decimal parse error: {0}")]
  DecimalParse(#[from] rust_decimal::Error),

  /// A text column held a value no enum variant maps to.
  #[error("unknown value {value:?} in {column}")]
  UnknownDiscriminant { column: &'static str, value: String },
}

impl Error {
  pub(crate) fn unknown(column: &'static str, value: &str) -> Self {
    Self::UnknownDiscriminant { column, value: value.to_owned() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
