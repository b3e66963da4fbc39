//! Wiring for the earshot server binary: configuration, backend selection
//! and the outer middleware stack.

pub mod backend;
pub mod config;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
  Router,
  http::{HeaderValue, Method},
};
use earshot_api::{AppState, ScrapePolicy};
use earshot_core::{reply::TemplateReplier, stub::StubProviders};
use earshot_llm::{OpenAiConfig, OpenAiReplier};
use earshot_reddit::{RedditClient, RedditConfig};
use earshot_store_rest::{RestStore, RestStoreConfig};
use earshot_store_sqlite::SqliteStore;
use secrecy::{ExposeSecret, SecretString};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{
  backend::{Replier, Store},
  config::{ConfigError, ReplyStrategy, ServerConfig, StoreBackend},
};

pub type ServerState = AppState<Store, RedditClient, Replier>;

fn copy_secret(secret: &SecretString) -> SecretString {
  SecretString::new(secret.expose_secret().into())
}

/// Open the configured store.
pub async fn build_store(cfg: &ServerConfig) -> anyhow::Result<Store> {
  let store = &cfg.store;
  match store.backend {
    StoreBackend::Rest => {
      let (Some(url), Some(service_key)) = (store.url.clone(), store.service_key.as_ref())
      else {
        return Err(ConfigError::MissingCredential("SUPABASE_URL / SUPABASE_SERVICE_KEY").into());
      };
      let rest = RestStore::new(RestStoreConfig {
        url,
        service_key: copy_secret(service_key),
        table: store.table.clone(),
        mode: store.mode,
        timeout: cfg.http_timeout(),
      })
      .context("failed to build REST store client")?;
      Ok(Store::Rest(rest))
    }
    StoreBackend::Sqlite => {
      let sqlite = SqliteStore::open(&store.sqlite_path, store.mode)
        .await
        .with_context(|| format!("failed to open store at {:?}", store.sqlite_path))?;
      Ok(Store::Sqlite(sqlite))
    }
  }
}

/// Build the reply strategy. A delegated strategy without a key still
/// starts; each suggestion then fails with a configuration error.
pub fn build_replier(cfg: &ServerConfig) -> anyhow::Result<Replier> {
  match cfg.reply.strategy {
    ReplyStrategy::Template => Ok(Replier::Template(TemplateReplier)),
    ReplyStrategy::Delegated => {
      if cfg.reply.api_key.is_none() {
        tracing::warn!("delegated replies selected but OPENAI_API_KEY is not set");
      }
      let defaults = OpenAiConfig::default();
      let replier = OpenAiReplier::new(OpenAiConfig {
        api_key:  cfg.reply.api_key.as_ref().map(copy_secret),
        model:    cfg.reply.model.clone().unwrap_or(defaults.model),
        base_url: cfg.reply.base_url.clone().unwrap_or(defaults.base_url),
        timeout:  cfg.http_timeout(),
      })
      .context("failed to build reply client")?;
      Ok(Replier::Delegated(replier))
    }
  }
}

pub fn build_source(cfg: &ServerConfig) -> anyhow::Result<RedditClient> {
  let defaults = RedditConfig::default();
  RedditClient::new(RedditConfig {
    base_url:   cfg.reddit.base_url.clone().unwrap_or(defaults.base_url),
    user_agent: cfg.reddit.user_agent.clone().unwrap_or(defaults.user_agent),
    timeout:    cfg.http_timeout(),
  })
  .context("failed to build Reddit client")
}

/// Construct every dependency once. Fails before anything is served.
pub async fn build_state(cfg: &ServerConfig) -> anyhow::Result<ServerState> {
  cfg.validate()?;

  Ok(AppState {
    store:   Arc::new(build_store(cfg).await?),
    source:  Arc::new(build_source(cfg)?),
    replier: Arc::new(build_replier(cfg)?),
    stubs:   Arc::new(StubProviders::demo()),
    scrape:  Arc::new(ScrapePolicy {
      allow_get: cfg.scrape.allow_get,
      token:     cfg.scrape.token.as_ref().map(copy_secret),
    }),
  })
}

/// CORS for the configured origins. Unparseable origins are skipped.
pub fn cors(cfg: &ServerConfig) -> CorsLayer {
  let origins: Vec<HeaderValue> = cfg
    .origins()
    .into_iter()
    .filter_map(|origin| match HeaderValue::from_str(origin) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin, "ignoring invalid allowed origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers(Any)
}

/// The API router wrapped in request tracing and CORS.
pub fn app(state: ServerState, cfg: &ServerConfig) -> Router {
  earshot_api::router(state)
    .layer(cors(cfg))
    .layer(TraceLayer::new_for_http())
}
