//! SQL schema for the Touchline SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per external match_id. Upserts replace every column except
-- id and created_at.
CREATE TABLE IF NOT EXISTS matches (
    id                  TEXT PRIMARY KEY,  -- MatchHandle; stable across upserts
    match_id            TEXT NOT NULL,
    competition         TEXT NOT NULL,
    matchday            INTEGER,
    home_team           TEXT NOT NULL,     -- JSON Team
    away_team           TEXT NOT NULL,     -- JSON Team
    score               TEXT NOT NULL,     -- JSON Score
    kpis                TEXT,              -- JSON Kpis or NULL
    status              TEXT NOT NULL,
    is_live             INTEGER NOT NULL,  -- 0 | 1
    utc_date            TEXT,
    event_timestamp     TEXT,
    processed_timestamp TEXT NOT NULL,     -- fixed-width UTC, compared as text
    event_type          TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    revision            INTEGER NOT NULL   -- from counters.revision
);

-- Monotonic write counter; never reset, so revisions are never reused.
CREATE TABLE IF NOT EXISTS counters (
    name  TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
INSERT OR IGNORE INTO counters (name, value) VALUES ('revision', 0);

CREATE UNIQUE INDEX IF NOT EXISTS matches_match_id_idx  ON matches(match_id);
CREATE UNIQUE INDEX IF NOT EXISTS matches_revision_idx  ON matches(revision);
CREATE INDEX IF NOT EXISTS matches_status_idx    ON matches(status, revision);
CREATE INDEX IF NOT EXISTS matches_is_live_idx   ON matches(is_live, revision);
CREATE INDEX IF NOT EXISTS matches_processed_idx ON matches(processed_timestamp);

PRAGMA user_version = 1;
";
