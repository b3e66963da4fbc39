//! SQL schema for the earshot SQLite store.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// `id` is indexed but deliberately not unique: insert-only mode keeps
/// duplicate rows, upsert mode replaces them itself.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS reddit_posts (
    row_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT    NOT NULL,
    created_at   TEXT    NOT NULL,   -- RFC 3339 UTC
    title        TEXT    NOT NULL DEFAULT '',
    selftext     TEXT    NOT NULL DEFAULT '',
    subreddit    TEXT    NOT NULL DEFAULT '',
    score        INTEGER NOT NULL DEFAULT 0,
    num_comments INTEGER NOT NULL DEFAULT 0,
    created_utc  REAL    NOT NULL
);

CREATE INDEX IF NOT EXISTS reddit_posts_id_idx ON reddit_posts(id);

PRAGMA user_version = 1;
";
