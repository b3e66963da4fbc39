//! Lenient decoding of rows read back from the hosted table.
//!
//! The table outlives any one writer. Older rows may lack an `id`, carry
//! `created_utc` as an ISO timestamp instead of epoch seconds, or hold nulls
//! in text and count columns. Reads map all of these onto a [`PostRecord`]
//! instead of failing the whole page.

use chrono::{DateTime, NaiveDateTime, Utc};
use earshot_core::post::{PostRecord, epoch_to_utc};
use serde::Deserialize;
use serde_json::Value;

/// One row as the table returns it. Unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoredRow {
  id:           Option<Value>,
  created_at:   Option<String>,
  title:        Option<String>,
  selftext:     Option<String>,
  subreddit:    Option<String>,
  score:        Option<Value>,
  num_comments: Option<Value>,
  created_utc:  Option<Value>,
}

impl StoredRow {
  /// Missing text becomes `""`, missing counts `0`. Each timestamp column
  /// fills in for the other; with neither, the Unix epoch stands in.
  pub fn into_record(self) -> PostRecord {
    let utc_secs = self.created_utc.as_ref().and_then(epoch_secs);
    let created_at = self
      .created_at
      .as_deref()
      .and_then(parse_instant)
      .or_else(|| utc_secs.and_then(epoch_to_utc))
      .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let created_utc = utc_secs.unwrap_or_else(|| instant_secs(created_at));

    PostRecord {
      id: match self.id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
      },
      created_at,
      title: self.title.unwrap_or_default(),
      selftext: self.selftext.unwrap_or_default(),
      subreddit: self.subreddit.unwrap_or_default(),
      score: self.score.as_ref().map(count).unwrap_or(0),
      num_comments: self.num_comments.as_ref().map(count).unwrap_or(0),
      created_utc,
    }
  }
}

/// RFC 3339, or a zone-less Postgres timestamp taken as UTC.
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn instant_secs(dt: DateTime<Utc>) -> f64 {
  dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1_000_000.0
}

/// Epoch seconds from a number, a numeric string or a timestamp string.
fn epoch_secs(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .ok()
      .filter(|secs| secs.is_finite())
      .or_else(|| parse_instant(s.trim()).map(instant_secs)),
    _ => None,
  }
}

fn count(value: &Value) -> u64 {
  match value {
    Value::Number(n) => n
      .as_u64()
      .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
      .unwrap_or(0),
    Value::String(s) => s.trim().parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0),
    _ => 0,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn decode(value: Value) -> PostRecord {
    serde_json::from_value::<StoredRow>(value).unwrap().into_record()
  }

  #[test]
  fn current_rows_pass_through() {
    let record = decode(json!({
      "id": "a1",
      "created_at": "2023-11-14T22:13:20+00:00",
      "title": "hello",
      "selftext": "body",
      "subreddit": "rust",
      "score": 4,
      "num_comments": 2,
      "created_utc": 1700000000.25
    }));
    assert_eq!(record.id, "a1");
    assert_eq!(record.created_at.timestamp(), 1_700_000_000);
    assert_eq!(record.created_utc, 1_700_000_000.25);
    assert_eq!((record.score, record.num_comments), (4, 2));
  }

  #[test]
  fn iso_created_utc_becomes_epoch_seconds() {
    let record = decode(json!({
      "id": 7,
      "created_at": "2024-01-01T00:00:05.123456+00:00",
      "title": "old row",
      "created_utc": "2024-01-01T00:00:00+00:00"
    }));
    assert_eq!(record.id, "7");
    assert_eq!(record.created_utc, 1_704_067_200.0);
    assert_eq!(record.created_at.timestamp_subsec_micros(), 123_456);
  }

  #[test]
  fn nulls_and_missing_columns_take_defaults() {
    let record = decode(json!({
      "title": null,
      "selftext": null,
      "score": null,
      "created_utc": 1700000000.0
    }));
    assert_eq!(record.id, "");
    assert_eq!(record.title, "");
    assert_eq!(record.selftext, "");
    assert_eq!(record.score, 0);
    assert_eq!(record.created_at.timestamp(), 1_700_000_000);
  }

  #[test]
  fn created_at_fills_in_for_missing_created_utc() {
    let record = decode(json!({ "id": "x", "created_at": "2024-01-01 00:00:00" }));
    assert_eq!(record.created_utc, 1_704_067_200.0);

    let record = decode(json!({ "id": "y" }));
    assert_eq!(record.created_at, DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(record.created_utc, 0.0);
  }

  #[test]
  fn negative_or_fractional_counts_clamp() {
    let record = decode(json!({ "score": -3, "num_comments": 2.0 }));
    assert_eq!(record.score, 0);
    assert_eq!(record.num_comments, 2);
  }
}
