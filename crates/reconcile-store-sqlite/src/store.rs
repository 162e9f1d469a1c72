//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use reconcile_core::{
  contact::{Contact, ContactId, ContactKeys, LinkPrecedence},
  store::ContactStore,
};

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened contact store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run on the connection thread, inside `call`.

fn select_primary(
  conn: &rusqlite::Connection,
  keys: &ContactKeys,
) -> rusqlite::Result<Option<RawContact>> {
  // `NULL = x` is never true, so an absent key cannot match.
  conn
    .query_row(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE link_precedence = 'primary'
           AND deleted_at IS NULL
           AND (email = ?1 OR phone_number = ?2)
         ORDER BY id
         LIMIT 1"
      ),
      rusqlite::params![keys.email(), keys.phone_number()],
      RawContact::from_row,
    )
    .optional()
}

fn insert_contact(
  conn: &rusqlite::Connection,
  keys: &ContactKeys,
  link: LinkPrecedence,
  now: &str,
) -> rusqlite::Result<RawContact> {
  conn.execute(
    "INSERT INTO contacts (
       phone_number, email, linked_id, link_precedence, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    rusqlite::params![
      keys.phone_number(),
      keys.email(),
      link.linked_id(),
      link.as_str(),
      now,
    ],
  )?;

  Ok(RawContact {
    id:              conn.last_insert_rowid(),
    phone_number:    keys.phone_number().map(str::to_owned),
    email:           keys.email().map(str::to_owned),
    linked_id:       link.linked_id(),
    link_precedence: link.as_str().to_owned(),
    created_at:      now.to_owned(),
    updated_at:      now.to_owned(),
    deleted_at:      None,
  })
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn find_primary_by_email_or_phone(
    &self,
    keys: &ContactKeys,
  ) -> Result<Option<Contact>> {
    let keys = keys.clone();

    let raw = self
      .conn
      .call(move |conn| Ok(select_primary(conn, &keys)?))
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn find_secondaries_by_primary_id(
    &self,
    primary_id: ContactId,
  ) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE linked_id = ?1
             AND link_precedence = 'secondary'
             AND deleted_at IS NULL
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![primary_id], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts
                 WHERE id = ?1 AND deleted_at IS NULL"
              ),
              rusqlite::params![id],
              RawContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_primary(&self, keys: &ContactKeys) -> Result<Contact> {
    let keys = keys.clone();
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| Ok(insert_contact(conn, &keys, LinkPrecedence::Primary, &now)?))
      .await?;

    raw.into_contact()
  }

  async fn create_secondary(
    &self,
    linked_id: ContactId,
    keys: &ContactKeys,
  ) -> Result<Contact> {
    let keys = keys.clone();
    let now = encode_dt(Utc::now());

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let is_live_primary = tx
          .query_row(
            "SELECT 1 FROM contacts
             WHERE id = ?1 AND link_precedence = 'primary' AND deleted_at IS NULL",
            rusqlite::params![linked_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !is_live_primary {
          return Ok(None);
        }

        let raw =
          insert_contact(&tx, &keys, LinkPrecedence::Secondary { linked_id }, &now)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.ok_or(Error::PrimaryNotFound(linked_id))?.into_contact()
  }

  async fn soft_delete(&self, id: ContactId) -> Result<bool> {
    let now = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts SET deleted_at = ?2, updated_at = ?2
           WHERE id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id, now],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Composite ─────────────────────────────────────────────────────────────

  /// Lookup and insert share one `IMMEDIATE` transaction, so two concurrent
  /// requests for the same keys cannot both create a primary.
  async fn find_or_create_primary(
    &self,
    keys: &ContactKeys,
  ) -> Result<(Contact, bool)> {
    let keys = keys.clone();
    let now = encode_dt(Utc::now());

    let (raw, created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = match select_primary(&tx, &keys)? {
          Some(raw) => (raw, false),
          None => (insert_contact(&tx, &keys, LinkPrecedence::Primary, &now)?, true),
        };
        tx.commit()?;
        Ok(result)
      })
      .await?;

    Ok((raw.into_contact()?, created))
  }
}
