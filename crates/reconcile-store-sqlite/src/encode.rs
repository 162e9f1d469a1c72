//! Encoding and decoding helpers between Rust domain types and the plain
//! column values stored in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings. The link precedence is split
//! into a text discriminant and a nullable `linked_id`.

use chrono::{DateTime, Utc};
use reconcile_core::contact::{Contact, ContactId, LinkPrecedence};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "id, phone_number, email, linked_id, link_precedence, \
                                   created_at, updated_at, deleted_at";

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:              ContactId,
  pub phone_number:    Option<String>,
  pub email:           Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: String,
  pub created_at:      String,
  pub updated_at:      String,
  pub deleted_at:      Option<String>,
}

impl RawContact {
  /// Read a row selected with [`CONTACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawContact {
      id:              row.get(0)?,
      phone_number:    row.get(1)?,
      email:           row.get(2)?,
      linked_id:       row.get(3)?,
      link_precedence: row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
      deleted_at:      row.get(7)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    let link =
      LinkPrecedence::from_parts(self.id, &self.link_precedence, self.linked_id)?;

    Ok(Contact {
      id: self.id,
      phone_number: self.phone_number,
      email: self.email,
      link,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted_at: self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
