//! The `PostSource` trait: where raw posts come from.

use std::future::Future;

use crate::post::RawPost;

/// Search query used when the caller gives none.
pub const DEFAULT_QUERY: &str = "ai automation";

/// Result count requested from the source when the caller gives none.
pub const DEFAULT_FETCH_LIMIT: u32 = 20;

/// Largest result count ever requested from the source.
pub const MAX_FETCH_LIMIT: u32 = 200;

/// Clamp a caller-supplied fetch limit into `1..=MAX_FETCH_LIMIT`.
///
/// Sources do not validate limits themselves; callers clamp first.
pub fn clamp_fetch_limit(limit: u32) -> u32 {
  limit.clamp(1, MAX_FETCH_LIMIT)
}

/// A single-shot search against an external post source.
///
/// Implementations make exactly one request per call: no retry, no
/// pagination, no caching.
pub trait PostSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch up to `limit` of the newest posts matching `query`.
  fn fetch_posts<'a>(
    &'a self,
    query: &'a str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RawPost>, Self::Error>> + Send + 'a;
}
