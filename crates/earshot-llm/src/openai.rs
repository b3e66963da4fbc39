//! OpenAI Responses API reply strategy.

use std::time::Duration;

use earshot_core::{
  ReplyError,
  reply::{ReplyGenerator, ReplyRequest, build_prompt, system_instructions},
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Settings for [`OpenAiReplier`].
#[derive(Debug)]
pub struct OpenAiConfig {
  /// `None` keeps the service running but fails every suggestion with a
  /// configuration error.
  pub api_key:  Option<SecretString>,
  pub model:    String,
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for OpenAiConfig {
  fn default() -> Self {
    Self {
      api_key:  None,
      model:    DEFAULT_MODEL.to_owned(),
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(10),
    }
  }
}

/// Forwards a composed prompt to the Responses API and returns its text.
pub struct OpenAiReplier {
  client: Client,
  config: OpenAiConfig,
}

impl OpenAiReplier {
  pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  async fn call_api(&self, api_key: &SecretString, prompt: String) -> Result<String, ReplyError> {
    let request = ResponsesRequest {
      model:        &self.config.model,
      instructions: system_instructions(),
      input:        prompt,
    };
    let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));

    tracing::debug!(model = %self.config.model, "requesting reply suggestion");
    let response = self
      .client
      .post(&url)
      .bearer_auth(api_key.expose_secret())
      .json(&request)
      .send()
      .await
      .map_err(|e| ReplyError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(ReplyError::Upstream(format!("API returned {status}: {body}")));
    }

    let body: ResponsesResponse = response
      .json()
      .await
      .map_err(|e| ReplyError::Upstream(format!("invalid response: {e}")))?;

    let text = body
      .output
      .into_iter()
      .filter(|item| item.r#type == "message")
      .flat_map(|item| item.content)
      .filter(|c| c.r#type == "output_text")
      .map(|c| c.text)
      .collect::<String>();

    let text = text.trim();
    if text.is_empty() {
      return Err(ReplyError::Upstream("empty response".to_owned()));
    }
    Ok(text.to_owned())
  }
}

impl ReplyGenerator for OpenAiReplier {
  async fn suggest(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
    let api_key = self
      .config
      .api_key
      .as_ref()
      .ok_or_else(|| ReplyError::Config("OPENAI_API_KEY is not set".to_owned()))?;
    self.call_api(api_key, build_prompt(request)).await
  }
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ResponsesRequest<'a> {
  model:        &'a str,
  instructions: String,
  input:        String,
}

#[derive(Deserialize)]
struct ResponsesResponse {
  #[serde(default)]
  output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
  r#type:  String,
  #[serde(default)]
  content: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct ContentItem {
  r#type: String,
  #[serde(default)]
  text:   String,
}
