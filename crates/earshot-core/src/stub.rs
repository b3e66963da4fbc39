//! Placeholder providers for platforms without a live integration.
//!
//! Each provider fabricates a small, deterministic set of posts from the
//! keyword and an index. Nothing here performs I/O or is persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Hard cap on fabricated results, whatever limit the caller asks for.
pub const MAX_STUB_RESULTS: usize = 10;

/// Limit used by the HTTP surface when the caller gives none.
pub const DEFAULT_STUB_LIMIT: usize = 50;

// ─── Platform ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
  Reddit,
  Twitter,
  Instagram,
  Facebook,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One fabricated post. Serialized without a tag; each platform keeps its own
/// field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StubPost {
  Tweet {
    id:     String,
    author: String,
    text:   String,
    likes:  u32,
    url:    String,
  },
  Instagram {
    id:      String,
    author:  String,
    caption: String,
    likes:   u32,
    url:     String,
  },
  Facebook {
    id:        String,
    page:      String,
    message:   String,
    reactions: u32,
    url:       String,
  },
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// A source of posts for one platform, keyed by search keyword.
pub trait StubProvider: Send + Sync {
  fn platform(&self) -> Platform;

  /// Return at most `min(limit, MAX_STUB_RESULTS)` posts about `keyword`.
  fn fetch(&self, keyword: &str, limit: usize) -> Vec<StubPost>;
}

fn indices(limit: usize) -> std::ops::Range<u32> {
  0..limit.min(MAX_STUB_RESULTS) as u32
}

pub struct DemoTwitter;

impl StubProvider for DemoTwitter {
  fn platform(&self) -> Platform { Platform::Twitter }

  fn fetch(&self, keyword: &str, limit: usize) -> Vec<StubPost> {
    indices(limit)
      .map(|i| StubPost::Tweet {
        id:     format!("tw_{i}"),
        author: format!("@demo_user_{i}"),
        text:   format!("Demo tweet about {keyword} #{i}"),
        likes:  10 + i,
        url:    format!("https://twitter.com/demo_user_{i}/status/{}", 1000 + i),
      })
      .collect()
  }
}

pub struct DemoInstagram;

impl StubProvider for DemoInstagram {
  fn platform(&self) -> Platform { Platform::Instagram }

  fn fetch(&self, keyword: &str, limit: usize) -> Vec<StubPost> {
    indices(limit)
      .map(|i| StubPost::Instagram {
        id:      format!("ig_{i}"),
        author:  format!("demo_ig_user_{i}"),
        caption: format!("Demo Instagram post about {keyword} #{i}"),
        likes:   20 + i,
        url:     format!("https://instagram.com/p/DEMO{i}"),
      })
      .collect()
  }
}

pub struct DemoFacebook;

impl StubProvider for DemoFacebook {
  fn platform(&self) -> Platform { Platform::Facebook }

  fn fetch(&self, keyword: &str, limit: usize) -> Vec<StubPost> {
    indices(limit)
      .map(|i| StubPost::Facebook {
        id:        format!("fb_{i}"),
        page:      format!("Demo FB Page {i}"),
        message:   format!("Demo Facebook post about {keyword} #{i}"),
        reactions: 5 + i,
        url:       format!("https://facebook.com/demo_page_{i}/posts/{}", 2000 + i),
      })
      .collect()
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// The provider used for each non-ingested platform.
///
/// Swapping a fixture for a live implementation is a call to
/// [`StubProviders::with`]; the HTTP surface only sees this registry.
pub struct StubProviders {
  providers: HashMap<Platform, Box<dyn StubProvider>>,
}

impl StubProviders {
  pub fn empty() -> Self {
    Self { providers: HashMap::new() }
  }

  /// Fixture providers for Twitter, Instagram and Facebook.
  pub fn demo() -> Self {
    Self::empty()
      .with(DemoTwitter)
      .with(DemoInstagram)
      .with(DemoFacebook)
  }

  /// Register `provider`, replacing any provider for the same platform.
  pub fn with(mut self, provider: impl StubProvider + 'static) -> Self {
    self.providers.insert(provider.platform(), Box::new(provider));
    self
  }

  pub fn get(&self, platform: Platform) -> Option<&dyn StubProvider> {
    self.providers.get(&platform).map(|p| p.as_ref())
  }
}

impl Default for StubProviders {
  fn default() -> Self { Self::demo() }
}
