//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teams (
    team_name TEXT PRIMARY KEY
);

-- rowid order is roster order; ON CONFLICT DO UPDATE keeps the rowid.
CREATE TABLE IF NOT EXISTS users (
    user_id   TEXT PRIMARY KEY,
    username  TEXT NOT NULL,
    team_name TEXT NOT NULL REFERENCES teams(team_name),
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS pull_requests (
    pull_request_id   TEXT PRIMARY KEY,
    pull_request_name TEXT NOT NULL,
    author_id         TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'OPEN',  -- 'OPEN' | 'MERGED'
    created_at        TEXT NOT NULL,                 -- RFC 3339 UTC
    merged_at         TEXT,                          -- set once, never updated
    CHECK ((status = 'MERGED') = (merged_at IS NOT NULL))
);

-- A swap rewrites reviewer_id in place so the slot keeps its position.
CREATE TABLE IF NOT EXISTS pull_request_reviewers (
    slot            INTEGER PRIMARY KEY AUTOINCREMENT,
    pull_request_id TEXT NOT NULL REFERENCES pull_requests(pull_request_id),
    reviewer_id     TEXT NOT NULL,
    UNIQUE (pull_request_id, reviewer_id)
);

CREATE INDEX IF NOT EXISTS users_team_idx     ON users(team_name, is_active);
CREATE INDEX IF NOT EXISTS reviewers_user_idx ON pull_request_reviewers(reviewer_id);

PRAGMA user_version = 1;
";
