//! Handler for `POST /identify`.
//!
//! | Field | Type | Notes |
//! |-------|------|-------|
//! | `email` | string, optional | `""` counts as absent |
//! | `phoneNumber` | string or integer, optional | `""` and `0` count as absent; integers are rendered in decimal |
//!
//! Responds `200 {"contact": ConsolidatedContact}`.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use reconcile_core::{
  contact::ContactKeys,
  identity::{ConsolidatedContact, identify},
  store::ContactStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Phone numbers arrive either as strings or as bare JSON integers.
///
/// The integer `0` counts as absent, like the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PhoneNumber {
  Text(String),
  Number(u64),
}

impl PhoneNumber {
  /// The phone number as text, or `None` for `0`.
  pub fn into_text(self) -> Option<String> {
    match self {
      PhoneNumber::Text(s) => Some(s),
      PhoneNumber::Number(0) => None,
      PhoneNumber::Number(n) => Some(n.to_string()),
    }
  }
}

/// JSON body accepted by `POST /identify`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  pub email:        Option<String>,
  pub phone_number: Option<PhoneNumber>,
}

impl IdentifyBody {
  /// `None` when neither field carries a usable value.
  pub fn into_keys(self) -> Option<ContactKeys> {
    ContactKeys::new(self.email, self.phone_number.and_then(PhoneNumber::into_text))
  }
}

/// Envelope returned by `POST /identify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifyResponse {
  pub contact: ConsolidatedContact,
}

/// `POST /identify`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<IdentifyBody>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;

  let contact = identify(state.store.as_ref(), body.into_keys())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(IdentifyResponse { contact }))
}
