//! The SQLite implementation of [`PostStore`].

use std::path::Path;

use earshot_core::{
  post::PostRecord,
  store::{
    PersistMode, PersistOutcome, PostStore, ProbeReport, SearchQuery,
    clamp_query_limit,
  },
};

use crate::{
  Result,
  encode::{COLUMNS, RawRow, encode_dt, like_pattern},
  schema::SCHEMA,
};

/// Rows read by [`PostStore::probe`].
const PROBE_ROWS: i64 = 5;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A post store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  mode: PersistMode,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, mode: PersistMode) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, mode };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory(mode: PersistMode) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, mode };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` over [`COLUMNS`] with the given tail and parameters.
  async fn select(
    &self,
    tail: &'static str,
    pattern: Option<String>,
    limit: i64,
  ) -> Result<Vec<PostRecord>> {
    let raws: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COLUMNS} FROM reddit_posts {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = match pattern {
          Some(p) => stmt
            .query_map(rusqlite::params![p, limit], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map(rusqlite::params![limit], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRow::into_record).collect()
  }
}

impl PostStore for SqliteStore {
  type Error = crate::Error;

  fn mode(&self) -> PersistMode { self.mode }

  async fn persist(&self, records: &[PostRecord]) -> Result<PersistOutcome> {
    if records.is_empty() {
      return Ok(PersistOutcome::default());
    }

    let rows = records.to_vec();
    let mode = self.mode;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut delete =
            tx.prepare_cached("DELETE FROM reddit_posts WHERE id = ?1")?;
          let mut insert = tx.prepare_cached(
            "INSERT INTO reddit_posts (
               id, created_at, title, selftext, subreddit, score,
               num_comments, created_utc
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;

          for row in &rows {
            if mode == PersistMode::Upsert {
              delete.execute(rusqlite::params![row.id])?;
            }
            inserted += insert.execute(rusqlite::params![
              row.id,
              encode_dt(row.created_at),
              row.title,
              row.selftext,
              row.subreddit,
              row.score as i64,
              row.num_comments as i64,
              row.created_utc,
            ])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::debug!(inserted, %mode, "persisted posts");
    Ok(PersistOutcome { inserted })
  }

  async fn search(&self, query: &SearchQuery) -> Result<Vec<PostRecord>> {
    self
      .select(
        "WHERE title LIKE ?1 ESCAPE '\\' OR selftext LIKE ?1 ESCAPE '\\'
         ORDER BY row_id LIMIT ?2",
        Some(like_pattern(&query.keyword)),
        clamp_query_limit(query.limit) as i64,
      )
      .await
  }

  async fn list(&self, limit: u32) -> Result<Vec<PostRecord>> {
    self
      .select("ORDER BY row_id LIMIT ?1", None, clamp_query_limit(limit) as i64)
      .await
  }

  async fn probe(&self) -> Result<ProbeReport> {
    let sample = self.select("ORDER BY row_id LIMIT ?1", None, PROBE_ROWS).await?;
    Ok(ProbeReport {
      ok:   true,
      code: 200,
      data: Some(serde_json::to_value(sample)?),
    })
  }
}
