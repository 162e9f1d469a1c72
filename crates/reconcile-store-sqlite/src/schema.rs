//! SQL schema for the Reconcile SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never physically deleted; `deleted_at` marks soft deletion.
CREATE TABLE IF NOT EXISTS contacts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number    TEXT,
    email           TEXT,
    linked_id       INTEGER REFERENCES contacts(id),
    link_precedence TEXT NOT NULL,     -- 'primary' | 'secondary'
    created_at      TEXT NOT NULL,     -- ISO 8601 UTC; server-assigned
    updated_at      TEXT NOT NULL,
    deleted_at      TEXT,
    CHECK (link_precedence IN ('primary', 'secondary')),
    CHECK ((link_precedence = 'primary') = (linked_id IS NULL))
);

CREATE INDEX IF NOT EXISTS contacts_email_idx  ON contacts(email)        WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS contacts_phone_idx  ON contacts(phone_number) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS contacts_linked_idx ON contacts(linked_id)    WHERE deleted_at IS NULL;

PRAGMA user_version = 1;
";
