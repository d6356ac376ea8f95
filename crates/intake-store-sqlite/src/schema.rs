//! SQL schema for the intake SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per intake. Rows are never updated; only the retention purge
-- deletes them.
CREATE TABLE IF NOT EXISTS intakes (
    submission_id TEXT PRIMARY KEY,
    personal      TEXT NOT NULL,   -- JSON
    immigration   TEXT NOT NULL,   -- JSON
    documents     TEXT NOT NULL DEFAULT '{}',
    consent       TEXT NOT NULL,   -- JSON
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    status        TEXT NOT NULL DEFAULT 'received'
);

CREATE TABLE IF NOT EXISTS intake_files (
    file_id       TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL REFERENCES intakes(submission_id) ON DELETE CASCADE,
    path          TEXT NOT NULL,
    filename      TEXT NOT NULL,
    mime_type     TEXT NOT NULL,
    size          INTEGER NOT NULL CHECK (size >= 0),
    uploaded_at   TEXT NOT NULL,
    UNIQUE (submission_id, path)
);

CREATE INDEX IF NOT EXISTS intakes_created_idx    ON intakes(created_at);
CREATE INDEX IF NOT EXISTS intake_files_parent_idx ON intake_files(submission_id);

PRAGMA user_version = 1;
";
