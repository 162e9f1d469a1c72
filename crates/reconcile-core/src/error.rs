//! Error types for `reconcile-core`.

use thiserror::Error;

use crate::contact::ContactId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown link precedence: {0:?}")]
  UnknownLinkPrecedence(String),

  #[error("contact {id} has precedence {precedence} but linked_id {linked_id:?}")]
  InvalidLink {
    id:         ContactId,
    precedence: &'static str,
    linked_id:  Option<ContactId>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
