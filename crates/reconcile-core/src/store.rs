//! The `ContactStore` trait.
//!
//! Implemented by storage backends (e.g. `reconcile-store-sqlite`). The
//! resolver and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::contact::{Contact, ContactId, ContactKeys};

/// Abstraction over a contact store backend.
///
/// Soft-deleted rows are invisible to every read method.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Find a primary contact whose email matches `keys.email()` or whose phone
  /// number matches `keys.phone_number()`. Absent keys never match.
  fn find_primary_by_email_or_phone<'a>(
    &'a self,
    keys: &'a ContactKeys,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// All secondary contacts linked to `primary_id`, in ascending id order.
  fn find_secondaries_by_primary_id(
    &self,
    primary_id: ContactId,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if absent or soft-deleted.
  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a new primary contact. Timestamps are set by the store.
  fn create_primary<'a>(
    &'a self,
    keys: &'a ContactKeys,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + 'a;

  /// Insert a secondary contact linked to the primary `linked_id`.
  ///
  /// Returns an error if `linked_id` is not a live primary contact.
  fn create_secondary<'a>(
    &'a self,
    linked_id: ContactId,
    keys: &'a ContactKeys,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + 'a;

  /// Mark a contact as deleted and bump its `updated_at`. Returns `false` if
  /// no live row had that id.
  ///
  /// Not reachable over HTTP; provided for operator tooling and tests.
  fn soft_delete(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Composite ─────────────────────────────────────────────────────────

  /// Find the primary matching `keys`, creating one if none exists.
  ///
  /// The returned flag is `true` when a new row was created. This default
  /// runs the lookup and the insert as two separate calls; backends that can
  /// do both atomically should override it.
  fn find_or_create_primary<'a>(
    &'a self,
    keys: &'a ContactKeys,
  ) -> impl Future<Output = Result<(Contact, bool), Self::Error>> + Send + 'a {
    async move {
      if let Some(found) = self.find_primary_by_email_or_phone(keys).await? {
        return Ok((found, false));
      }
      Ok((self.create_primary(keys).await?, true))
    }
  }
}
