//! Identity resolution: map partial contact details onto a primary contact
//! and its linked secondaries.
//!
//! Resolution never merges two primaries and never promotes or demotes a row.
//! A key that only appears on a secondary contact does not find that
//! secondary's primary; it produces a new primary instead.

use serde::{Deserialize, Serialize};

use crate::{
  contact::{Contact, ContactId, ContactKeys},
  store::ContactStore,
};

/// The consolidated view of one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedContact {
  /// Omitted from JSON when no lookup took place.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub primary_contact_id:    Option<ContactId>,
  pub emails:                Vec<String>,
  pub phone_numbers:         Vec<String>,
  pub secondary_contact_ids: Vec<ContactId>,
}

/// Resolve `keys` against `store`.
///
/// With no keys the store is not touched and an empty view is returned.
/// Otherwise the matching primary is found (or created) and its secondaries
/// are folded in with [`consolidate`].
pub async fn identify<S>(
  store: &S,
  keys: Option<ContactKeys>,
) -> Result<ConsolidatedContact, S::Error>
where
  S: ContactStore,
{
  let Some(keys) = keys else {
    tracing::debug!("identify called without email or phone number");
    return Ok(ConsolidatedContact::default());
  };

  let (primary, created) = store.find_or_create_primary(&keys).await?;
  if created {
    tracing::info!(contact_id = primary.id, "created primary contact");
  } else {
    tracing::debug!(contact_id = primary.id, "matched existing primary contact");
  }

  let secondaries = store.find_secondaries_by_primary_id(primary.id).await?;
  Ok(consolidate(Some(&primary), &secondaries))
}

/// Build the response view from a primary and its secondaries.
///
/// The primary's values come first, followed by each secondary's in the order
/// given. Missing values are skipped; duplicates are kept.
pub fn consolidate(
  primary: Option<&Contact>,
  secondaries: &[Contact],
) -> ConsolidatedContact {
  let rows = || primary.into_iter().chain(secondaries);

  ConsolidatedContact {
    primary_contact_id:    primary.map(|p| p.id),
    emails:                rows().filter_map(|c| c.email.clone()).collect(),
    phone_numbers:         rows().filter_map(|c| c.phone_number.clone()).collect(),
    secondary_contact_ids: secondaries.iter().map(|c| c.id).collect(),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::Utc;

  use super::*;
  use crate::contact::LinkPrecedence;

  // ─── Test double ────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("primary {0} not found")]
  struct PrimaryNotFound(ContactId);

  /// A vector-backed store. Uses the trait's default `find_or_create_primary`.
  #[derive(Default)]
  struct MemoryStore {
    rows:  Mutex<Vec<Contact>>,
    calls: AtomicUsize,
  }

  impl MemoryStore {
    fn insert(&self, keys: &ContactKeys, link: LinkPrecedence) -> Contact {
      let mut rows = self.rows.lock().unwrap();
      let now = Utc::now();
      let contact = Contact {
        id: rows.len() as ContactId + 1,
        phone_number: keys.phone_number().map(str::to_owned),
        email: keys.email().map(str::to_owned),
        link,
        created_at: now,
        updated_at: now,
        deleted_at: None,
      };
      rows.push(contact.clone());
      contact
    }

    fn live(&self) -> Vec<Contact> {
      self
        .rows
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.deleted_at.is_none())
        .cloned()
        .collect()
    }
  }

  impl ContactStore for MemoryStore {
    type Error = PrimaryNotFound;

    async fn find_primary_by_email_or_phone(
      &self,
      keys: &ContactKeys,
    ) -> Result<Option<Contact>, PrimaryNotFound> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(self.live().into_iter().find(|c| {
        c.is_primary()
          && ((keys.email().is_some() && c.email.as_deref() == keys.email())
            || (keys.phone_number().is_some()
              && c.phone_number.as_deref() == keys.phone_number()))
      }))
    }

    async fn find_secondaries_by_primary_id(
      &self,
      primary_id: ContactId,
    ) -> Result<Vec<Contact>, PrimaryNotFound> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(
        self
          .live()
          .into_iter()
          .filter(|c| c.linked_id() == Some(primary_id))
          .collect(),
      )
    }

    async fn get_contact(
      &self,
      id: ContactId,
    ) -> Result<Option<Contact>, PrimaryNotFound> {
      Ok(self.live().into_iter().find(|c| c.id == id))
    }

    async fn create_primary(
      &self,
      keys: &ContactKeys,
    ) -> Result<Contact, PrimaryNotFound> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(self.insert(keys, LinkPrecedence::Primary))
    }

    async fn create_secondary(
      &self,
      linked_id: ContactId,
      keys: &ContactKeys,
    ) -> Result<Contact, PrimaryNotFound> {
      match self.get_contact(linked_id).await? {
        Some(p) if p.is_primary() => {
          Ok(self.insert(keys, LinkPrecedence::Secondary { linked_id }))
        }
        _ => Err(PrimaryNotFound(linked_id)),
      }
    }

    async fn soft_delete(&self, id: ContactId) -> Result<bool, PrimaryNotFound> {
      let mut rows = self.rows.lock().unwrap();
      match rows.iter_mut().find(|c| c.id == id && c.deleted_at.is_none()) {
        Some(row) => {
          row.deleted_at = Some(Utc::now());
          Ok(true)
        }
        None => Ok(false),
      }
    }
  }

  fn keys(email: Option<&str>, phone: Option<&str>) -> ContactKeys {
    ContactKeys::new(email.map(Into::into), phone.map(Into::into)).unwrap()
  }

  // ─── consolidate ────────────────────────────────────────────────────────

  #[test]
  fn consolidate_without_primary_is_empty() {
    assert_eq!(consolidate(None, &[]), ConsolidatedContact::default());
  }

  #[test]
  fn consolidate_orders_primary_first_and_keeps_duplicates() {
    let store = MemoryStore::default();
    let primary = store.insert(&keys(Some("a@x.com"), None), LinkPrecedence::Primary);
    let link = LinkPrecedence::Secondary { linked_id: primary.id };
    let s1 = store.insert(&keys(Some("b@x.com"), Some("555-0001")), link);
    let s2 = store.insert(&keys(Some("a@x.com"), None), link);

    let view = consolidate(Some(&primary), &[s1.clone(), s2.clone()]);
    assert_eq!(view.primary_contact_id, Some(primary.id));
    assert_eq!(view.emails, ["a@x.com", "b@x.com", "a@x.com"]);
    assert_eq!(view.phone_numbers, ["555-0001"]);
    assert_eq!(view.secondary_contact_ids, [s1.id, s2.id]);
  }

  // ─── identify ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn identify_without_keys_skips_store() {
    let store = MemoryStore::default();
    let view = identify(&store, None).await.unwrap();

    assert_eq!(view, ConsolidatedContact::default());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn identify_creates_then_reuses_primary() {
    let store = MemoryStore::default();

    let first = identify(&store, Some(keys(Some("a@x.com"), None))).await.unwrap();
    assert_eq!(first.primary_contact_id, Some(1));
    assert_eq!(first.emails, ["a@x.com"]);
    assert!(first.phone_numbers.is_empty());
    assert!(first.secondary_contact_ids.is_empty());

    let second = identify(&store, Some(keys(Some("a@x.com"), Some("555-0009"))))
      .await
      .unwrap();
    assert_eq!(second.primary_contact_id, Some(1));
    assert_eq!(store.live().len(), 1);
  }

  #[tokio::test]
  async fn identify_includes_secondaries() {
    let store = MemoryStore::default();
    let primary = store
      .create_primary(&keys(Some("a@x.com"), Some("555-0000")))
      .await
      .unwrap();
    let secondary = store
      .create_secondary(primary.id, &keys(Some("b@x.com"), Some("555-0001")))
      .await
      .unwrap();

    let view = identify(&store, Some(keys(None, Some("555-0000")))).await.unwrap();
    assert_eq!(view.primary_contact_id, Some(primary.id));
    assert_eq!(view.emails, ["a@x.com", "b@x.com"]);
    assert_eq!(view.phone_numbers, ["555-0000", "555-0001"]);
    assert_eq!(view.secondary_contact_ids, [secondary.id]);
  }

  #[tokio::test]
  async fn identify_ignores_deleted_primary() {
    let store = MemoryStore::default();
    let old = store.create_primary(&keys(Some("a@x.com"), None)).await.unwrap();
    assert!(store.soft_delete(old.id).await.unwrap());

    let view = identify(&store, Some(keys(Some("a@x.com"), None))).await.unwrap();
    assert_ne!(view.primary_contact_id, Some(old.id));
  }

  #[test]
  fn serialises_without_undefined_primary_id() {
    let json = serde_json::to_value(ConsolidatedContact::default()).unwrap();
    assert!(json.get("primaryContactId").is_none());
    assert_eq!(json["emails"], serde_json::json!([]));
    assert_eq!(json["secondaryContactIds"], serde_json::json!([]));
  }
}
