//! The ingestion pipeline: fetch → normalize → persist.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
  error::IngestError,
  post::{PostRecord, normalize},
  source::PostSource,
  store::{PersistMode, PostStore},
};

/// Counts produced by one [`ingest`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestReport {
  /// Raw posts returned by the source.
  pub fetched:  usize,
  /// Raw posts the normalizer rejected.
  pub skipped:  usize,
  /// Rows the store reported as written.
  pub inserted: usize,
}

/// Fetch `limit` posts for `query` from `source` and persist the normalized
/// records into `store`.
///
/// Under [`PersistMode::Upsert`] a batch holds each id at most once, the
/// last occurrence winning. Insert-only stores receive every record.
///
/// `limit` is passed through unchanged; clamp it with
/// [`clamp_fetch_limit`](crate::source::clamp_fetch_limit) first.
pub async fn ingest<P, S>(
  source: &P,
  store: &S,
  query: &str,
  limit: u32,
) -> Result<IngestReport, IngestError>
where
  P: PostSource,
  S: PostStore,
{
  let raw = source
    .fetch_posts(query, limit)
    .await
    .map_err(|e| IngestError::Source(Box::new(e)))?;

  let fetched = raw.len();
  let records: Vec<PostRecord> = raw
    .iter()
    .filter_map(|post| match normalize(post) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!(error = %e, "skipping post");
        None
      }
    })
    .collect();
  let skipped = fetched - records.len();

  let records = match store.mode() {
    PersistMode::Upsert => last_per_id(records),
    PersistMode::Insert => records,
  };

  let outcome = store
    .persist(&records)
    .await
    .map_err(|e| IngestError::Store(Box::new(e)))?;

  tracing::info!(
    query,
    fetched,
    skipped,
    inserted = outcome.inserted,
    mode = %store.mode(),
    "ingested posts"
  );

  Ok(IngestReport { fetched, skipped, inserted: outcome.inserted })
}

/// Drop every record whose id appears again later in the batch.
fn last_per_id(records: Vec<PostRecord>) -> Vec<PostRecord> {
  let mut seen = HashSet::with_capacity(records.len());
  let mut kept: Vec<PostRecord> = records
    .into_iter()
    .rev()
    .filter(|record| seen.insert(record.id.clone()))
    .collect();
  kept.reverse();
  kept
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::{
    post::RawPost,
    store::{PersistOutcome, ProbeReport, SearchQuery},
  };

  struct CannedSource(Result<Vec<RawPost>, String>);

  impl PostSource for CannedSource {
    type Error = std::io::Error;

    async fn fetch_posts(&self, _query: &str, limit: u32) -> Result<Vec<RawPost>, Self::Error> {
      match &self.0 {
        Ok(posts) => Ok(posts.iter().take(limit as usize).cloned().collect()),
        Err(msg) => Err(std::io::Error::other(msg.clone())),
      }
    }
  }

  #[derive(Default)]
  struct RecordingStore {
    rows:  Mutex<Vec<PostRecord>>,
    calls: Mutex<usize>,
    fail:  bool,
    mode:  PersistMode,
  }

  impl PostStore for RecordingStore {
    type Error = std::io::Error;

    fn mode(&self) -> PersistMode { self.mode }

    async fn persist(&self, records: &[PostRecord]) -> Result<PersistOutcome, Self::Error> {
      *self.calls.lock().unwrap() += 1;
      if self.fail {
        return Err(std::io::Error::other("backend down"));
      }
      self.rows.lock().unwrap().extend_from_slice(records);
      Ok(PersistOutcome { inserted: records.len() })
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<PostRecord>, Self::Error> {
      Ok(vec![])
    }

    async fn list(&self, _limit: u32) -> Result<Vec<PostRecord>, Self::Error> {
      Ok(self.rows.lock().unwrap().clone())
    }

    async fn probe(&self) -> Result<ProbeReport, Self::Error> {
      Ok(ProbeReport { ok: true, code: 200, data: None })
    }
  }

  fn raw(id: &str, created_utc: Option<f64>) -> RawPost {
    RawPost {
      id: Some(id.to_owned()),
      title: Some(format!("post {id}")),
      created_utc,
      ..RawPost::default()
    }
  }

  #[tokio::test]
  async fn valid_posts_are_persisted() {
    let source = CannedSource(Ok(vec![
      raw("a", Some(1.0)),
      raw("b", Some(2.0)),
      raw("c", Some(3.0)),
    ]));
    let store = RecordingStore::default();

    let report = ingest(&source, &store, "microdosing", 5).await.unwrap();
    assert_eq!(report, IngestReport { fetched: 3, skipped: 0, inserted: 3 });
    assert_eq!(store.rows.lock().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn posts_without_timestamp_are_skipped() {
    let source = CannedSource(Ok(vec![raw("a", Some(1.0)), raw("b", None)]));
    let store = RecordingStore::default();

    let report = ingest(&source, &store, "q", 20).await.unwrap();
    assert_eq!(report, IngestReport { fetched: 2, skipped: 1, inserted: 1 });
    let rows = store.rows.lock().unwrap();
    assert_eq!(rows[0].id, "a");
  }

  #[tokio::test]
  async fn source_failure_never_reaches_store() {
    let source = CannedSource(Err("503 Service Unavailable".into()));
    let store = RecordingStore::default();

    let err = ingest(&source, &store, "q", 20).await.unwrap_err();
    assert!(matches!(err, IngestError::Source(_)));
    assert!(err.to_string().contains("503"));
    assert_eq!(*store.calls.lock().unwrap(), 0);
  }

  fn titled(id: &str, title: &str) -> RawPost {
    RawPost { title: Some(title.to_owned()), ..raw(id, Some(1.0)) }
  }

  #[tokio::test]
  async fn upsert_batch_keeps_last_of_each_id() {
    let source = CannedSource(Ok(vec![
      titled("a", "first"),
      titled("b", "other"),
      titled("a", "second"),
    ]));
    let store = RecordingStore { mode: PersistMode::Upsert, ..RecordingStore::default() };

    let report = ingest(&source, &store, "q", 20).await.unwrap();
    assert_eq!(report, IngestReport { fetched: 3, skipped: 0, inserted: 2 });

    let rows = store.rows.lock().unwrap();
    let kept: Vec<(&str, &str)> =
      rows.iter().map(|r| (r.id.as_str(), r.title.as_str())).collect();
    assert_eq!(kept, [("b", "other"), ("a", "second")]);
  }

  #[tokio::test]
  async fn insert_batch_keeps_duplicates() {
    let source = CannedSource(Ok(vec![titled("a", "first"), titled("a", "second")]));
    let store = RecordingStore { mode: PersistMode::Insert, ..RecordingStore::default() };

    let report = ingest(&source, &store, "q", 20).await.unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(store.rows.lock().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn store_failure_is_reported() {
    let source = CannedSource(Ok(vec![raw("a", Some(1.0))]));
    let store = RecordingStore { fail: true, ..RecordingStore::default() };

    let err = ingest(&source, &store, "q", 20).await.unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
  }
}
