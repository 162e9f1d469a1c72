//! Error type for `reconcile-store-sqlite`.

use reconcile_core::contact::ContactId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] reconcile_core::Error),

  /// The connection could not be opened, was closed, or a query failed.
  #[error("storage unavailable: {0}")]
  Unavailable(tokio_rusqlite::Error),

  /// A CHECK, FOREIGN KEY, or UNIQUE constraint rejected a write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to link a secondary to a row that is not a live primary.
  #[error("primary contact not found: {0}")]
  PrimaryNotFound(ContactId),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, _)) = &e
      && code.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Error::ConstraintViolation(e);
    }
    Error::Unavailable(e)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
