//! SQL schema for the rollcall SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The imported company directory. Attributes are overwritten wholesale by
-- bulk imports; emp_id is the immutable identity.
CREATE TABLE IF NOT EXISTS employees (
    emp_id      TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    position    TEXT,
    unit        TEXT,
    cost_center TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    last_login TEXT
);

CREATE TABLE IF NOT EXISTS meetings (
    id           INTEGER PRIMARY KEY,
    topic        TEXT NOT NULL,
    meeting_date TEXT NOT NULL,   -- ISO calendar date
    start_time   TEXT NOT NULL,   -- HH:MM
    end_time     TEXT NOT NULL,
    room         TEXT,
    floor        TEXT,
    building     TEXT,
    organizer_id INTEGER REFERENCES users(id),
    is_active    INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- One attendance row per (meeting, employee code). The UNIQUE constraint is
-- the only duplicate guard that holds under concurrent submissions.
-- emp_id is free text for manual entries, so no FK to employees.
CREATE TABLE IF NOT EXISTS registrations (
    id            INTEGER PRIMARY KEY,
    meeting_id    INTEGER NOT NULL REFERENCES meetings(id),
    emp_id        TEXT NOT NULL,
    name          TEXT NOT NULL,
    position      TEXT,
    unit          TEXT,
    cost_center   TEXT,
    registered_at TEXT NOT NULL,
    is_manual     INTEGER NOT NULL DEFAULT 0,
    UNIQUE (meeting_id, emp_id)
);

-- Codes are stored hashed; the plaintext only travels through the
-- notification queue.
CREATE TABLE IF NOT EXISTS otp_tokens (
    id         INTEGER PRIMARY KEY,
    email      TEXT NOT NULL,
    code_hash  TEXT NOT NULL,
    purpose    TEXT NOT NULL,    -- 'signup' | 'login'
    expires_at TEXT NOT NULL,
    attempts   INTEGER NOT NULL DEFAULT 0,
    consumed   INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS registrations_meeting_idx ON registrations(meeting_id);
CREATE INDEX IF NOT EXISTS registrations_time_idx    ON registrations(registered_at);
CREATE INDEX IF NOT EXISTS meetings_active_idx       ON meetings(is_active);
CREATE INDEX IF NOT EXISTS otp_tokens_email_idx      ON otp_tokens(email, purpose);

PRAGMA user_version = 1;
";
