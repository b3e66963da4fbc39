//! Runtime selection between the configured store backends and reply
//! strategies.

use earshot_core::{
  ReplyError,
  post::PostRecord,
  reply::{ReplyGenerator, ReplyRequest, TemplateReplier},
  store::{PersistMode, PersistOutcome, PostStore, ProbeReport, SearchQuery},
};
use earshot_llm::OpenAiReplier;
use earshot_store_rest::RestStore;
use earshot_store_sqlite::SqliteStore;
use thiserror::Error;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
  #[error(transparent)]
  Rest(#[from] earshot_store_rest::Error),

  #[error(transparent)]
  Sqlite(#[from] earshot_store_sqlite::Error),
}

/// The post store chosen by `store.backend`.
pub enum Store {
  Rest(RestStore),
  Sqlite(SqliteStore),
}

impl PostStore for Store {
  type Error = StoreError;

  fn mode(&self) -> PersistMode {
    match self {
      Store::Rest(s) => s.mode(),
      Store::Sqlite(s) => s.mode(),
    }
  }

  async fn persist(&self, records: &[PostRecord]) -> Result<PersistOutcome, StoreError> {
    Ok(match self {
      Store::Rest(s) => s.persist(records).await?,
      Store::Sqlite(s) => s.persist(records).await?,
    })
  }

  async fn search(&self, query: &SearchQuery) -> Result<Vec<PostRecord>, StoreError> {
    Ok(match self {
      Store::Rest(s) => s.search(query).await?,
      Store::Sqlite(s) => s.search(query).await?,
    })
  }

  async fn list(&self, limit: u32) -> Result<Vec<PostRecord>, StoreError> {
    Ok(match self {
      Store::Rest(s) => s.list(limit).await?,
      Store::Sqlite(s) => s.list(limit).await?,
    })
  }

  async fn probe(&self) -> Result<ProbeReport, StoreError> {
    Ok(match self {
      Store::Rest(s) => s.probe().await?,
      Store::Sqlite(s) => s.probe().await?,
    })
  }
}

// ─── Reply ───────────────────────────────────────────────────────────────────

/// The reply strategy chosen by `reply.strategy`.
pub enum Replier {
  Template(TemplateReplier),
  Delegated(OpenAiReplier),
}

impl ReplyGenerator for Replier {
  async fn suggest(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
    match self {
      Replier::Template(r) => r.suggest(request).await,
      Replier::Delegated(r) => r.suggest(request).await,
    }
  }
}
