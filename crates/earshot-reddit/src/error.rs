//! Error type for `earshot-reddit`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("request to reddit failed: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("reddit returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("malformed reddit response: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
