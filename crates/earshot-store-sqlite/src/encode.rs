//! Encoding and decoding helpers between [`PostRecord`] and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; counts as signed integers.

use chrono::{DateTime, Utc};
use earshot_core::post::PostRecord;

use crate::{Error, Result};

/// Column list shared by every `SELECT`, in [`RawRow::from_row`] order.
pub const COLUMNS: &str = "id, created_at, title, selftext, subreddit, score, \
                           num_comments, created_utc";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%keyword%` with `%`, `_` and `\` escaped; pair with `ESCAPE '\'`.
pub fn like_pattern(keyword: &str) -> String {
  let mut out = String::with_capacity(keyword.len() + 2);
  out.push('%');
  for c in keyword.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A row exactly as SQLite returns it.
pub struct RawRow {
  pub id:           String,
  pub created_at:   String,
  pub title:        String,
  pub selftext:     String,
  pub subreddit:    String,
  pub score:        i64,
  pub num_comments: i64,
  pub created_utc:  f64,
}

impl RawRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      created_at:   row.get(1)?,
      title:        row.get(2)?,
      selftext:     row.get(3)?,
      subreddit:    row.get(4)?,
      score:        row.get(5)?,
      num_comments: row.get(6)?,
      created_utc:  row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<PostRecord> {
    Ok(PostRecord {
      id:           self.id,
      created_at:   decode_dt(&self.created_at)?,
      title:        self.title,
      selftext:     self.selftext,
      subreddit:    self.subreddit,
      score:        self.score.max(0) as u64,
      num_comments: self.num_comments.max(0) as u64,
      created_utc:  self.created_utc,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_metacharacters() {
    assert_eq!(like_pattern("dose"), "%dose%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }

  #[test]
  fn datetime_round_trips_through_text() {
    let dt = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }
}
