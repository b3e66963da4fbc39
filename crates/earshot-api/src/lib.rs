//! JSON HTTP surface for earshot.
//!
//! Exposes an axum [`Router`] backed by any [`PostStore`], [`PostSource`] and
//! [`ReplyGenerator`]. CORS, tracing and transport concerns are the caller's
//! responsibility.

pub mod auth;
pub mod error;
pub mod extract;
pub mod posts;
pub mod reply;
pub mod scrape;
pub mod social;
pub mod status;

use std::sync::Arc;

use axum::{
  Router,
  routing::{MethodRouter, get, post},
};
use earshot_core::{
  reply::ReplyGenerator, source::PostSource, store::PostStore,
  stub::StubProviders,
};

pub use auth::ScrapePolicy;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Built once at startup.
pub struct AppState<S, P, G> {
  pub store:   Arc<S>,
  pub source:  Arc<P>,
  pub replier: Arc<G>,
  pub stubs:   Arc<StubProviders>,
  pub scrape:  Arc<ScrapePolicy>,
}

impl<S, P, G> Clone for AppState<S, P, G> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      source:  Arc::clone(&self.source),
      replier: Arc::clone(&self.replier),
      stubs:   Arc::clone(&self.stubs),
      scrape:  Arc::clone(&self.scrape),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S, P, G>(state: AppState<S, P, G>) -> Router
where
  S: PostStore + 'static,
  P: PostSource + 'static,
  G: ReplyGenerator + 'static,
{
  let scrape: MethodRouter<AppState<S, P, G>> = if state.scrape.allow_get {
    get(scrape::handler::<S, P, G>).post(scrape::handler::<S, P, G>)
  } else {
    post(scrape::handler::<S, P, G>)
  };

  Router::new()
    // Liveness
    .route("/", get(status::root))
    .route("/hello", get(status::hello))
    .route("/supabase-test", get(status::storage_probe::<S, P, G>))
    // Stored posts
    .route("/supabase/reddit_posts", get(posts::list::<S, P, G>))
    .route("/supabase/reddit_posts/search", get(posts::search::<S, P, G>))
    // Ingestion
    .route("/scrape/reddit", scrape)
    // Placeholder platforms
    .route("/twitter/search", get(social::twitter::<S, P, G>))
    .route("/instagram/search", get(social::instagram::<S, P, G>))
    .route("/facebook/search", get(social::facebook::<S, P, G>))
    // Replies
    .route("/ai/reply-suggestion", post(reply::suggest::<S, P, G>))
    .with_state(state)
}
