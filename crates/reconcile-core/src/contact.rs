//! Contact rows and the keys used to look them up.
//!
//! A contact is either the primary (canonical) row of an identity or a
//! secondary row pointing at exactly one primary. The link is carried by
//! [`LinkPrecedence`], so a primary can never hold a `linked_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Row identifier, allocated by the store in increasing order.
pub type ContactId = i64;

// ─── Link precedence ─────────────────────────────────────────────────────────

/// Whether a contact is the root of its identity or an alias of another row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "linkPrecedence", rename_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary {
    /// The primary contact this row belongs to.
    #[serde(rename = "linkedId")]
    linked_id: ContactId,
  },
}

impl LinkPrecedence {
  /// The stored discriminant (`"primary"` or `"secondary"`).
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Primary => "primary",
      Self::Secondary { .. } => "secondary",
    }
  }

  pub fn linked_id(&self) -> Option<ContactId> {
    match self {
      Self::Primary => None,
      Self::Secondary { linked_id } => Some(*linked_id),
    }
  }

  /// Rebuild a precedence from its stored discriminant and nullable link.
  ///
  /// `id` is only used for error reporting.
  pub fn from_parts(
    id: ContactId,
    tag: &str,
    linked_id: Option<ContactId>,
  ) -> Result<Self> {
    match (tag, linked_id) {
      ("primary", None) => Ok(Self::Primary),
      ("secondary", Some(linked_id)) => Ok(Self::Secondary { linked_id }),
      ("primary", Some(_)) => Err(Error::InvalidLink {
        id,
        precedence: "primary",
        linked_id,
      }),
      ("secondary", None) => Err(Error::InvalidLink {
        id,
        precedence: "secondary",
        linked_id,
      }),
      (other, _) => Err(Error::UnknownLinkPrecedence(other.to_owned())),
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:           ContactId,
  pub phone_number: Option<String>,
  pub email:        Option<String>,
  #[serde(flatten)]
  pub link:         LinkPrecedence,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  /// Set when the row has been soft-deleted. Stores never return such rows
  /// from their regular queries.
  pub deleted_at:   Option<DateTime<Utc>>,
}

impl Contact {
  pub fn is_primary(&self) -> bool { matches!(self.link, LinkPrecedence::Primary) }

  pub fn linked_id(&self) -> Option<ContactId> { self.link.linked_id() }
}

// ─── Lookup keys ─────────────────────────────────────────────────────────────

/// An email and/or phone number used to find or create a contact.
///
/// At least one of the two is always present. Empty strings count as absent;
/// any other value is kept exactly as given, surrounding whitespace included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactKeys {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl ContactKeys {
  /// Returns `None` when neither value is a non-empty string.
  pub fn new(email: Option<String>, phone_number: Option<String>) -> Option<Self> {
    let email = email.filter(|v| !v.is_empty());
    let phone_number = phone_number.filter(|v| !v.is_empty());
    if email.is_none() && phone_number.is_none() {
      return None;
    }
    Some(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_require_at_least_one_value() {
    assert!(ContactKeys::new(None, None).is_none());
    assert!(ContactKeys::new(Some("".into()), Some("".into())).is_none());

    let keys = ContactKeys::new(Some("a@x.com".into()), Some("".into())).unwrap();
    assert_eq!(keys.email(), Some("a@x.com"));
    assert_eq!(keys.phone_number(), None);
  }

  #[test]
  fn keys_keep_values_verbatim() {
    let keys = ContactKeys::new(Some(" a@x.com ".into()), None).unwrap();
    assert_eq!(keys.email(), Some(" a@x.com "));

    let keys = ContactKeys::new(Some("   ".into()), None).unwrap();
    assert_eq!(keys.email(), Some("   "));
  }

  #[test]
  fn precedence_from_parts() {
    assert_eq!(
      LinkPrecedence::from_parts(1, "primary", None).unwrap(),
      LinkPrecedence::Primary
    );
    assert_eq!(
      LinkPrecedence::from_parts(2, "secondary", Some(1)).unwrap(),
      LinkPrecedence::Secondary { linked_id: 1 }
    );
    assert!(matches!(
      LinkPrecedence::from_parts(3, "primary", Some(1)),
      Err(Error::InvalidLink { id: 3, .. })
    ));
    assert!(matches!(
      LinkPrecedence::from_parts(4, "secondary", None),
      Err(Error::InvalidLink { id: 4, .. })
    ));
    assert!(matches!(
      LinkPrecedence::from_parts(5, "tertiary", None),
      Err(Error::UnknownLinkPrecedence(_))
    ));
  }

  #[test]
  fn contact_serialises_with_flat_link_fields() {
    let now = Utc::now();
    let contact = Contact {
      id:           2,
      phone_number: Some("555-0001".into()),
      email:        None,
      link:         LinkPrecedence::Secondary { linked_id: 1 },
      created_at:   now,
      updated_at:   now,
      deleted_at:   None,
    };

    let json = serde_json::to_value(&contact).unwrap();
    assert_eq!(json["linkPrecedence"], "secondary");
    assert_eq!(json["linkedId"], 1);
    assert_eq!(json["phoneNumber"], "555-0001");
    assert!(json["email"].is_null());
  }
}
