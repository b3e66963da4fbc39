//! The hosted REST implementation of [`PostStore`].

use std::time::Duration;

use earshot_core::{
  post::PostRecord,
  store::{
    PersistMode, PersistOutcome, PostStore, ProbeReport, SearchQuery,
    clamp_query_limit,
  },
};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::{Error, Result, filter::keyword_filter, row::StoredRow};

/// Rows read by [`PostStore::probe`].
const PROBE_ROWS: u32 = 5;

/// Connection settings for the hosted REST database.
#[derive(Debug)]
pub struct RestStoreConfig {
  /// Project URL, e.g. `https://xyz.supabase.co`.
  pub url:         String,
  pub service_key: SecretString,
  pub table:       String,
  pub mode:        PersistMode,
  pub timeout:     Duration,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Post store reached over PostgREST.
pub struct RestStore {
  client: Client,
  config: RestStoreConfig,
}

impl RestStore {
  pub fn new(config: RestStoreConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Build)?;
    Ok(Self { client, config })
  }

  fn table_url(&self) -> String {
    format!(
      "{}/rest/v1/{}",
      self.config.url.trim_end_matches('/'),
      self.config.table
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    let key = self.config.service_key.expose_secret();
    req.header("apikey", key).bearer_auth(key)
  }

  /// Fail on a non-2xx status, otherwise return the body text.
  async fn body_of(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body });
    }
    Ok(body)
  }

  async fn select(&self, params: &[(&str, String)]) -> Result<Vec<PostRecord>> {
    let resp = self
      .auth(self.client.get(self.table_url()))
      .query(&[("select", "*")])
      .query(params)
      .send()
      .await
      .map_err(Error::Transport)?;

    let body = Self::body_of(resp).await?;
    let rows: Vec<StoredRow> = serde_json::from_str(&body)?;
    Ok(rows.into_iter().map(StoredRow::into_record).collect())
  }
}

impl PostStore for RestStore {
  type Error = Error;

  fn mode(&self) -> PersistMode { self.config.mode }

  async fn persist(&self, records: &[PostRecord]) -> Result<PersistOutcome> {
    if records.is_empty() {
      return Ok(PersistOutcome::default());
    }

    let mut req = self.auth(self.client.post(self.table_url())).json(records);
    req = match self.config.mode {
      PersistMode::Insert => req.header("Prefer", "return=representation"),
      PersistMode::Upsert => req
        .query(&[("on_conflict", "id")])
        .header("Prefer", "resolution=merge-duplicates,return=representation"),
    };

    tracing::debug!(rows = records.len(), mode = %self.config.mode, "writing posts");
    let resp = req.send().await.map_err(Error::Transport)?;
    let body = Self::body_of(resp).await?;

    // Count what came back; a bodiless success wrote nothing we can vouch for.
    let inserted = if body.trim().is_empty() {
      0
    } else {
      serde_json::from_str::<Vec<Value>>(&body)?.len()
    };
    Ok(PersistOutcome { inserted })
  }

  async fn search(&self, query: &SearchQuery) -> Result<Vec<PostRecord>> {
    self
      .select(&[
        ("or", keyword_filter(&query.keyword)),
        ("limit", clamp_query_limit(query.limit).to_string()),
      ])
      .await
  }

  async fn list(&self, limit: u32) -> Result<Vec<PostRecord>> {
    self
      .select(&[("limit", clamp_query_limit(limit).to_string())])
      .await
  }

  async fn probe(&self) -> Result<ProbeReport> {
    let resp = self
      .auth(self.client.get(self.table_url()))
      .query(&[("select", "*".to_owned()), ("limit", PROBE_ROWS.to_string())])
      .send()
      .await
      .map_err(Error::Transport)?;

    let code = resp.status().as_u16();
    let body = resp.text().await.map_err(Error::Transport)?;
    let data = if body.is_empty() {
      None
    } else {
      Some(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    };

    Ok(ProbeReport { ok: code == 200, code, data })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::DateTime;
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
  };

  use super::*;

  fn store_for(server: &MockServer, mode: PersistMode) -> RestStore {
    RestStore::new(RestStoreConfig {
      url:         server.uri(),
      service_key: SecretString::new("service-key".into()),
      table:       "reddit_posts".to_owned(),
      mode,
      timeout:     Duration::from_secs(5),
    })
    .unwrap()
  }

  fn record(id: &str, title: &str) -> PostRecord {
    PostRecord {
      id:           id.to_owned(),
      created_at:   DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
      title:        title.to_owned(),
      selftext:     String::new(),
      subreddit:    "microdosing".to_owned(),
      score:        1,
      num_comments: 0,
      created_utc:  1_700_000_000.0,
    }
  }

  #[tokio::test]
  async fn empty_persist_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(201))
      .expect(0)
      .mount(&server)
      .await;

    let outcome = store_for(&server, PersistMode::Upsert).persist(&[]).await.unwrap();
    assert_eq!(outcome.inserted, 0);
  }

  #[tokio::test]
  async fn upsert_merges_on_id() {
    let server = MockServer::start().await;
    let rows = vec![record("a1", "first")];
    Mock::given(method("POST"))
      .and(path("/rest/v1/reddit_posts"))
      .and(query_param("on_conflict", "id"))
      .and(header("apikey", "service-key"))
      .and(header("authorization", "Bearer service-key"))
      .and(body_json(&rows))
      .respond_with(ResponseTemplate::new(201).set_body_json(&rows))
      .expect(1)
      .mount(&server)
      .await;

    let outcome = store_for(&server, PersistMode::Upsert).persist(&rows).await.unwrap();
    assert_eq!(outcome.inserted, 1);

    let requests = server.received_requests().await.unwrap();
    let prefer = requests[0].headers.get("prefer").unwrap().to_str().unwrap();
    assert_eq!(prefer, "resolution=merge-duplicates,return=representation");
  }

  #[tokio::test]
  async fn insert_mode_sends_plain_insert() {
    let server = MockServer::start().await;
    let rows = vec![record("a1", "first")];
    Mock::given(method("POST"))
      .and(path("/rest/v1/reddit_posts"))
      .and(header("prefer", "return=representation"))
      .respond_with(ResponseTemplate::new(201).set_body_json(&rows))
      .expect(1)
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Insert);
    assert_eq!(store.persist(&rows).await.unwrap().inserted, 1);

    let requests = server.received_requests().await.unwrap();
    assert!(
      !requests[0].url.query().unwrap_or("").contains("on_conflict"),
      "insert must not upsert: {}",
      requests[0].url
    );
  }

  #[tokio::test]
  async fn count_reflects_backend_reply_not_input() {
    let server = MockServer::start().await;
    let sent = vec![record("a1", "x"), record("b2", "y"), record("c3", "z")];
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(201).set_body_json(&sent[..2]))
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Upsert);
    assert_eq!(store.persist(&sent).await.unwrap().inserted, 2);
  }

  #[tokio::test]
  async fn bodiless_success_reports_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(201))
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Upsert);
    assert_eq!(store.persist(&[record("a1", "x")]).await.unwrap().inserted, 0);
  }

  #[tokio::test]
  async fn backend_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(409)
          .set_body_json(json!({"code": "23505", "message": "duplicate key"})),
      )
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Insert);
    let err = store.persist(&[record("a1", "x")]).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 409, .. }));
    assert!(err.to_string().contains("duplicate key"));
  }

  #[tokio::test]
  async fn search_filters_both_columns_and_clamps_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/rest/v1/reddit_posts"))
      .and(query_param("select", "*"))
      .and(query_param(
        "or",
        r#"(title.ilike."*dose*",selftext.ilike."*dose*")"#,
      ))
      .and(query_param("limit", "500"))
      .respond_with(ResponseTemplate::new(200).set_body_json(vec![record("a1", "Dose log")]))
      .expect(1)
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Upsert);
    let query = SearchQuery { keyword: "dose".into(), limit: 1000 };
    let found = store.search(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Dose log");
  }

  #[tokio::test]
  async fn list_decodes_rows_with_extra_columns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(query_param("limit", "100"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
        "id": "a1",
        "created_at": "2023-11-14T22:13:20+00:00",
        "title": "hello",
        "selftext": "",
        "subreddit": "rust",
        "score": 4,
        "num_comments": 2,
        "created_utc": 1700000000.0,
        "inserted_at": "2024-01-01T00:00:00+00:00"
      }])))
      .mount(&server)
      .await;

    let rows = store_for(&server, PersistMode::Upsert).list(100).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_at.timestamp(), 1_700_000_000);
    assert_eq!(rows[0].subreddit, "rust");
  }

  #[tokio::test]
  async fn legacy_rows_do_not_fail_reads() {
    let server = MockServer::start().await;
    let legacy = json!([
      {
        "id": 7,
        "created_at": "2024-01-01T00:00:00+00:00",
        "title": "old dose notes",
        "selftext": null,
        "subreddit": "microdosing",
        "score": 3,
        "num_comments": null,
        "created_utc": "2024-01-01T00:00:00+00:00"
      },
      { "title": "no id", "created_utc": 1700000000.0 }
    ]);
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(&legacy))
      .mount(&server)
      .await;

    let store = store_for(&server, PersistMode::Upsert);
    let rows = store.list(10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "7");
    assert_eq!(rows[0].created_utc, 1_704_067_200.0);
    assert_eq!(rows[0].selftext, "");
    assert_eq!(rows[0].num_comments, 0);
    assert_eq!(rows[1].id, "");
    assert_eq!(rows[1].created_at.timestamp(), 1_700_000_000);

    let query = SearchQuery { keyword: "dose".into(), limit: 10 };
    assert_eq!(store.search(&query).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn writes_send_only_table_columns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
      .mount(&server)
      .await;

    store_for(&server, PersistMode::Upsert)
      .persist(&[record("a1", "x")])
      .await
      .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let mut columns: Vec<&str> =
      body[0].as_object().unwrap().keys().map(String::as_str).collect();
    columns.sort_unstable();
    assert_eq!(
      columns,
      [
        "created_at",
        "created_utc",
        "id",
        "num_comments",
        "score",
        "selftext",
        "subreddit",
        "title"
      ]
    );
  }

  #[tokio::test]
  async fn read_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
      .mount(&server)
      .await;

    let err = store_for(&server, PersistMode::Upsert).list(10).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 401, .. }));
  }

  #[tokio::test]
  async fn probe_reports_status_without_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(query_param("limit", "5"))
      .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no table"})))
      .mount(&server)
      .await;

    let report = store_for(&server, PersistMode::Upsert).probe().await.unwrap();
    assert!(!report.ok);
    assert_eq!(report.code, 404);
    assert_eq!(report.data, Some(json!({"message": "no table"})));
  }
}
