//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS manual_students (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    name_folded TEXT NOT NULL,         -- lowercased name, for search
    email       TEXT NOT NULL UNIQUE,  -- already lowercased by the caller
    notes       TEXT,
    added_by    TEXT NOT NULL,
    added_at    TEXT NOT NULL,         -- RFC 3339 UTC, fixed precision
    status      TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'inactive')),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS manual_students_added_idx  ON manual_students(added_at);
CREATE INDEX IF NOT EXISTS manual_students_status_idx ON manual_students(status);

PRAGMA user_version = 1;
";
