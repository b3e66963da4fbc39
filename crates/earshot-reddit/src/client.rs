//! The HTTP client behind Reddit ingestion.

use std::time::Duration;

use earshot_core::{post::RawPost, source::PostSource};
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

/// Default public endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Identifying client header sent with every request.
pub const DEFAULT_USER_AGENT: &str = "earshot-scraper/0.1";

/// Connection settings for the Reddit search endpoint.
#[derive(Debug, Clone)]
pub struct RedditConfig {
  pub base_url:   String,
  pub user_agent: String,
  pub timeout:    Duration,
}

impl Default for RedditConfig {
  fn default() -> Self {
    Self {
      base_url:   DEFAULT_BASE_URL.to_owned(),
      user_agent: DEFAULT_USER_AGENT.to_owned(),
      timeout:    Duration::from_secs(10),
    }
  }
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Listing {
  data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingData {
  children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
  #[serde(default)]
  data: RawPost,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Client for `GET {base_url}/search.json`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RedditClient {
  client: Client,
  config: RedditConfig,
}

impl RedditClient {
  pub fn new(config: RedditConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()
      .map_err(Error::Build)?;
    Ok(Self { client, config })
  }

  fn search_url(&self) -> String {
    format!("{}/search.json", self.config.base_url.trim_end_matches('/'))
  }

  /// Search for the newest posts from the past day matching `query`.
  ///
  /// `limit` is forwarded as-is; callers clamp it.
  pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<RawPost>> {
    tracing::debug!(query, limit, "searching reddit");

    let resp = self
      .client
      .get(self.search_url())
      .query(&[
        ("q", query.to_owned()),
        ("sort", "new".to_owned()),
        ("limit", limit.to_string()),
        ("t", "day".to_owned()),
      ])
      .send()
      .await
      .map_err(Error::Transport)?;

    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let listing: Listing = serde_json::from_str(&body)?;
    Ok(listing.data.children.into_iter().map(|c| c.data).collect())
  }
}

impl PostSource for RedditClient {
  type Error = Error;

  async fn fetch_posts(&self, query: &str, limit: u32) -> Result<Vec<RawPost>> {
    self.search(query, limit).await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use earshot_core::post::normalize;
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
  };

  use super::*;

  fn client_for(server: &MockServer) -> RedditClient {
    RedditClient::new(RedditConfig {
      base_url: server.uri(),
      ..RedditConfig::default()
    })
    .unwrap()
  }

  fn child(id: &str, created_utc: f64) -> serde_json::Value {
    json!({
      "kind": "t3",
      "data": {
        "id": id,
        "title": format!("Post {id}"),
        "selftext": "",
        "subreddit": "microdosing",
        "score": 12,
        "num_comments": 3,
        "created_utc": created_utc,
        "permalink": format!("/r/microdosing/comments/{id}/post/"),
      }
    })
  }

  #[tokio::test]
  async fn sends_fixed_search_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/search.json"))
      .and(query_param("q", "microdosing"))
      .and(query_param("sort", "new"))
      .and(query_param("limit", "5"))
      .and(query_param("t", "day"))
      .and(header("user-agent", DEFAULT_USER_AGENT))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})),
      )
      .expect(1)
      .mount(&server)
      .await;

    let posts = client_for(&server).fetch_posts("microdosing", 5).await.unwrap();
    assert!(posts.is_empty());
  }

  #[tokio::test]
  async fn three_items_yield_three_normalized_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/search.json"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "kind": "Listing",
        "data": {
          "children": [
            child("a1", 1_700_000_000.0),
            child("b2", 1_700_000_060.0),
            child("c3", 1_700_000_120.5),
          ]
        }
      })))
      .mount(&server)
      .await;

    let raw = client_for(&server).fetch_posts("microdosing", 5).await.unwrap();
    let records: Vec<_> = raw.iter().map(|p| normalize(p).unwrap()).collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].created_at.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    assert_eq!(records[1].created_at.to_rfc3339(), "2023-11-14T22:14:20+00:00");
    assert_eq!(records[2].created_at.timestamp(), 1_700_000_120);
    assert_eq!(records[2].created_at.timestamp_subsec_millis(), 500);
    assert_eq!(records[0].subreddit, "microdosing");
    assert_eq!(records[0].score, 12);
  }

  #[tokio::test]
  async fn missing_children_is_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "Listing"})))
      .mount(&server)
      .await;

    let posts = client_for(&server).fetch_posts("q", 20).await.unwrap();
    assert!(posts.is_empty());
  }

  #[tokio::test]
  async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
      .mount(&server)
      .await;

    let err = client_for(&server).fetch_posts("q", 20).await.unwrap_err();
    match err {
      Error::Status { status, body } => {
        assert_eq!(status, 429);
        assert_eq!(body, "Too Many Requests");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn malformed_json_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
      .mount(&server)
      .await;

    let err = client_for(&server).fetch_posts("q", 20).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
  }
}
