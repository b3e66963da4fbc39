//! Runtime configuration.
//!
//! Sources, lowest precedence first: an optional TOML file, `EARSHOT_*`
//! environment variables (`__` between sections, e.g.
//! `EARSHOT_STORE__BACKEND=sqlite`), then the well-known variables in
//! [`WELL_KNOWN_ENV`].

use std::{path::Path, path::PathBuf, time::Duration};

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use earshot_core::store::PersistMode;

/// Plain environment variables mapped onto config keys.
pub const WELL_KNOWN_ENV: &[(&str, &str)] = &[
  ("SUPABASE_URL", "store.url"),
  ("SUPABASE_SERVICE_KEY", "store.service_key"),
  ("OPENAI_API_KEY", "reply.api_key"),
  ("ALLOWED_ORIGINS", "allowed_origins"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to load configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("missing required credential {0}")]
  MissingCredential(&'static str),
}

/// Blank values count as absent.
fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
  let raw = Option::<String>::deserialize(d)?;
  Ok(
    raw
      .filter(|s| !s.trim().is_empty())
      .map(|s| SecretString::new(s.into())),
  )
}

// ─── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
  #[default]
  Rest,
  Sqlite,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
  pub backend:     StoreBackend,
  pub url:         Option<String>,
  #[serde(deserialize_with = "secret")]
  pub service_key: Option<SecretString>,
  pub table:       String,
  pub sqlite_path: PathBuf,
  pub mode:        PersistMode,
}

impl Default for StoreSettings {
  fn default() -> Self {
    Self {
      backend:     StoreBackend::Rest,
      url:         None,
      service_key: None,
      table:       "reddit_posts".to_owned(),
      sqlite_path: PathBuf::from("earshot.db"),
      mode:        PersistMode::Upsert,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
  pub base_url:   Option<String>,
  pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReplyStrategy {
  #[default]
  Template,
  Delegated,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplySettings {
  pub strategy: ReplyStrategy,
  #[serde(deserialize_with = "secret")]
  pub api_key:  Option<SecretString>,
  pub model:    Option<String>,
  pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
  pub allow_get: bool,
  #[serde(deserialize_with = "secret")]
  pub token:     Option<SecretString>,
}

impl Default for ScrapeSettings {
  fn default() -> Self { Self { allow_get: true, token: None } }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// Comma-separated list of origins allowed by CORS.
  pub allowed_origins:   String,
  pub http_timeout_secs: u64,
  pub store:             StoreSettings,
  pub reddit:            RedditSettings,
  pub reply:             ReplySettings,
  pub scrape:            ScrapeSettings,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "0.0.0.0".to_owned(),
      port:              8000,
      allowed_origins:   "http://localhost:3000".to_owned(),
      http_timeout_secs: 10,
      store:             StoreSettings::default(),
      reddit:            RedditSettings::default(),
      reply:             ReplySettings::default(),
      scrape:            ScrapeSettings::default(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` and the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::load_with(path, |name| std::env::var(name).ok())
  }

  /// Load from `path`, `EARSHOT_*` variables and `lookup` for the
  /// well-known variables.
  pub fn load_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    let mut builder = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("EARSHOT")
          .prefix_separator("_")
          .separator("__"),
      );

    for (var, key) in WELL_KNOWN_ENV {
      let value = lookup(var).filter(|v| !v.trim().is_empty());
      builder = builder.set_override_option(*key, value)?;
    }

    Ok(builder.build()?.try_deserialize()?)
  }

  /// Reject configurations that cannot serve requests correctly.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.store.backend == StoreBackend::Rest {
      if self.store.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
        return Err(ConfigError::MissingCredential("SUPABASE_URL"));
      }
      if self.store.service_key.is_none() {
        return Err(ConfigError::MissingCredential("SUPABASE_SERVICE_KEY"));
      }
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn http_timeout(&self) -> Duration { Duration::from_secs(self.http_timeout_secs) }

  pub fn origins(&self) -> Vec<&str> {
    self
      .allowed_origins
      .split(',')
      .map(str::trim)
      .filter(|o| !o.is_empty())
      .collect()
  }
}
