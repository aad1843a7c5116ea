//! SQL schema for the lifetag SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS records (
    record_id          TEXT PRIMARY KEY,
    full_name          TEXT NOT NULL,
    phone_number       TEXT NOT NULL,   -- primary identifier
    email              TEXT,            -- secondary identifier, nullable
    blood_type         TEXT,
    allergies          TEXT,
    medications        TEXT,
    medical_conditions TEXT,
    address            TEXT,
    date_of_birth      TEXT,
    photo_ref          TEXT,            -- path of an out-of-band upload
    alternate_numbers  TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    emergency_contacts TEXT NOT NULL DEFAULT '[]',  -- JSON array of {name, phone}
    qr_payload         TEXT NOT NULL,   -- assigned at creation, never updated
    created_at         TEXT NOT NULL,   -- ISO 8601 UTC; assigned at creation
    updated_at         TEXT NOT NULL
);

-- Identifiers are matched case-insensitively, so uniqueness must be too.
CREATE UNIQUE INDEX IF NOT EXISTS records_phone_idx
    ON records(LOWER(phone_number));
CREATE UNIQUE INDEX IF NOT EXISTS records_email_idx
    ON records(LOWER(email)) WHERE email IS NOT NULL;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL,       -- stored trimmed and lowercased
    password_hash TEXT NOT NULL,       -- argon2 PHC string
    role          TEXT NOT NULL,       -- 'admin' | 'manager'
    created_at    TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx ON users(LOWER(email));

PRAGMA user_version = 1;
";
