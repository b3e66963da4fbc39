//! Post records and the normalizer that produces them.
//!
//! A [`RawPost`] mirrors the `data` object of one Reddit search result, with
//! every field optional because the source omits or nulls them freely. A
//! [`PostRecord`] is the fixed row shape written to storage; it never carries
//! a hole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

// ─── Raw source shape ─────────────────────────────────────────────────────────

/// One post as returned by the source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPost {
  pub id:           Option<String>,
  pub title:        Option<String>,
  pub selftext:     Option<String>,
  pub subreddit:    Option<String>,
  pub score:        Option<i64>,
  pub num_comments: Option<i64>,
  /// Epoch seconds, fractional.
  pub created_utc:  Option<f64>,
}

// ─── Normalized record ────────────────────────────────────────────────────────

/// The only persisted entity: one externally-sourced social post.
///
/// `id` is the natural key used by upsert deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
  pub id:           String,
  pub created_at:   DateTime<Utc>,
  pub title:        String,
  pub selftext:     String,
  pub subreddit:    String,
  pub score:        u64,
  pub num_comments: u64,
  pub created_utc:  f64,
}

// ─── Normalizer ───────────────────────────────────────────────────────────────

/// Map a [`RawPost`] onto a [`PostRecord`], substituting defaults for
/// missing text (`""`) and counts (`0`).
///
/// Posts without an id or a `created_utc` are rejected rather than stored
/// under a guessed key or the Unix epoch.
pub fn normalize(raw: &RawPost) -> Result<PostRecord, NormalizeError> {
  let id = raw
    .id
    .as_deref()
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or(NormalizeError::MissingId)?
    .to_owned();

  let created_utc = raw
    .created_utc
    .ok_or_else(|| NormalizeError::MissingTimestamp { id: id.clone() })?;
  let created_at = epoch_to_utc(created_utc).ok_or_else(|| {
    NormalizeError::InvalidTimestamp { id: id.clone(), value: created_utc }
  })?;

  Ok(PostRecord {
    id,
    created_at,
    title:        text_or_default(&raw.title),
    selftext:     text_or_default(&raw.selftext),
    subreddit:    text_or_default(&raw.subreddit),
    score:        count_or_default(raw.score),
    num_comments: count_or_default(raw.num_comments),
    created_utc,
  })
}

/// Convert fractional epoch seconds to a UTC instant with microsecond
/// precision. Returns `None` for NaN, infinities and out-of-range values.
pub fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
  if !secs.is_finite() {
    return None;
  }
  let micros = (secs * 1_000_000.0).round();
  if micros.abs() >= i64::MAX as f64 {
    return None;
  }
  let micros = micros as i64;
  let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
  DateTime::from_timestamp(micros.div_euclid(1_000_000), nanos)
}

fn text_or_default(value: &Option<String>) -> String {
  value.clone().unwrap_or_default()
}

fn count_or_default(value: Option<i64>) -> u64 {
  value.map(|n| n.max(0) as u64).unwrap_or(0)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn minimal(id: &str, created_utc: f64) -> RawPost {
    RawPost {
      id: Some(id.to_owned()),
      created_utc: Some(created_utc),
      ..RawPost::default()
    }
  }

  #[test]
  fn missing_fields_take_documented_defaults() {
    let record = normalize(&minimal("abc123", 1_700_000_000.0)).unwrap();
    assert_eq!(record.title, "");
    assert_eq!(record.selftext, "");
    assert_eq!(record.subreddit, "");
    assert_eq!(record.score, 0);
    assert_eq!(record.num_comments, 0);
  }

  #[test]
  fn defaults_serialize_as_values_not_nulls() {
    let record = normalize(&minimal("abc123", 1_700_000_000.0)).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    for key in ["title", "selftext", "subreddit", "score", "num_comments"] {
      let value = json.get(key).unwrap_or_else(|| panic!("missing key {key}"));
      assert!(!value.is_null(), "{key} is null");
    }
  }

  #[test]
  fn null_selftext_becomes_empty_string() {
    let raw: RawPost = serde_json::from_str(
      r#"{"id":"x1","title":"hi","selftext":null,"created_utc":1700000000.0}"#,
    )
    .unwrap();
    let record = normalize(&raw).unwrap();
    assert_eq!(record.title, "hi");
    assert_eq!(record.selftext, "");
  }

  #[test]
  fn epoch_is_converted_to_utc() {
    let record = normalize(&minimal("abc123", 1_700_000_000.0)).unwrap();
    assert_eq!(record.created_at.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    assert_eq!(record.created_utc, 1_700_000_000.0);
  }

  #[test]
  fn fractional_epoch_keeps_sub_second_precision() {
    let at = epoch_to_utc(1_700_000_000.25).unwrap();
    assert_eq!(at.timestamp_subsec_millis(), 250);
  }

  #[test]
  fn missing_timestamp_is_rejected() {
    let raw = RawPost { id: Some("abc".into()), ..RawPost::default() };
    assert_eq!(
      normalize(&raw),
      Err(NormalizeError::MissingTimestamp { id: "abc".into() })
    );
  }

  #[test]
  fn non_finite_timestamp_is_rejected() {
    let err = normalize(&minimal("abc", f64::INFINITY)).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidTimestamp { .. }));
  }

  #[test]
  fn missing_or_blank_id_is_rejected() {
    let mut raw = minimal("  ", 1.0);
    assert_eq!(normalize(&raw), Err(NormalizeError::MissingId));
    raw.id = None;
    assert_eq!(normalize(&raw), Err(NormalizeError::MissingId));
  }

  #[test]
  fn negative_counts_clamp_to_zero() {
    let raw = RawPost {
      score: Some(-4),
      num_comments: Some(7),
      ..minimal("abc", 1.0)
    };
    let record = normalize(&raw).unwrap();
    assert_eq!(record.score, 0);
    assert_eq!(record.num_comments, 7);
  }

  #[test]
  fn record_carries_exactly_the_stored_columns() {
    let raw: RawPost = serde_json::from_str(
      r#"{"id":"x1","title":"hi","author":"someone","permalink":"/r/x/1/",
          "over_18":false,"created_utc":1700000000.0}"#,
    )
    .unwrap();
    let json = serde_json::to_value(normalize(&raw).unwrap()).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
      keys,
      [
        "created_at",
        "created_utc",
        "id",
        "num_comments",
        "score",
        "selftext",
        "subreddit",
        "title"
      ]
    );
  }
}
