//! HTTP surface for the Reconcile identity service.
//!
//! Exposes an axum [`Router`] serving `POST /identify`, backed by any
//! [`ContactStore`].

pub mod error;
pub mod identify;
pub mod settings;

pub use error::ApiError;
pub use settings::ServerConfig;

use std::sync::Arc;

use axum::{Router, routing::post};
use reconcile_core::store::ContactStore;
use tower_http::trace::TraceLayer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContactStore> {
  pub store: Arc<S>,
}

impl<S: ContactStore> AppState<S> {
  pub fn new(store: S) -> Self { Self { store: Arc::new(store) } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the identity service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/identify", post(identify::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
