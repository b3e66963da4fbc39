//! Reply suggestions: the request shape, the strategy trait, the template
//! strategy, and the prompt handed to delegated strategies.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{error::ReplyError, stub::Platform};

/// Characters of post body quoted by the template strategy.
pub const TEMPLATE_BODY_LIMIT: usize = 500;

/// Characters of post body included in a delegated prompt.
pub const PROMPT_BODY_LIMIT: usize = 800;

/// Appended to any body cut at a character limit.
pub const ELLIPSIS: &str = "...";

/// Platform assumed when a request names none.
pub const DEFAULT_PLATFORM: &str = "reddit";

/// Safety framing shared by every strategy.
pub const SAFETY_GUIDELINES: &str = "\
- Be warm, empathetic and non-judgmental.
- Do not give medical or legal advice, and never encourage illegal activity.
- Encourage the person to consult a qualified professional (doctor, \
pharmacist, therapist or lawyer) about their specific situation.
- Keep it to one short paragraph suitable for a public reply.";

// ─── Request ─────────────────────────────────────────────────────────────────

/// The post a suggestion is requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
  pub title:     String,
  #[serde(default)]
  pub selftext:  Option<String>,
  #[serde(default)]
  pub subreddit: Option<String>,
  #[serde(default)]
  pub platform:  Option<String>,
}

impl ReplyRequest {
  pub fn body(&self) -> &str {
    self.selftext.as_deref().unwrap_or("").trim()
  }

  pub fn community(&self) -> &str {
    self.subreddit.as_deref().unwrap_or("").trim()
  }

  /// The requested platform, [`DEFAULT_PLATFORM`] when absent or blank.
  pub fn platform(&self) -> &str {
    self
      .platform
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .unwrap_or(DEFAULT_PLATFORM)
  }

  fn is_reddit(&self) -> bool {
    matches!(self.platform().parse(), Ok(Platform::Reddit))
  }

  /// Where the post was made, e.g. ` in r/microdosing` or ` on twitter`.
  fn location(&self) -> String {
    match (self.community(), self.is_reddit()) {
      ("", true) => String::new(),
      ("", false) => format!(" on {}", self.platform()),
      (community, true) => format!(" in r/{}", community.trim_start_matches("r/")),
      (community, false) => format!(" in {community}"),
    }
  }
}

/// Cut `text` to at most `max` characters, marking the cut with [`ELLIPSIS`].
pub fn truncate_chars(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
    None => text.to_owned(),
  }
}

// ─── Strategy trait ──────────────────────────────────────────────────────────

/// Produces a suggested reply for a post.
pub trait ReplyGenerator: Send + Sync {
  fn suggest<'a>(
    &'a self,
    request: &'a ReplyRequest,
  ) -> impl Future<Output = Result<String, ReplyError>> + Send + 'a;
}

// ─── Template strategy ───────────────────────────────────────────────────────

/// Fills a fixed prose template. Deterministic, no I/O, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReplier;

impl TemplateReplier {
  pub fn compose(&self, request: &ReplyRequest) -> String {
    let title = request.title.trim();
    let opening = if title.is_empty() {
      format!("Hi there, thank you for sharing your post{}.", request.location())
    } else {
      format!("Hi there, thank you for sharing \"{title}\"{}.", request.location())
    };

    let body = match request.body() {
      "" => "Even without many details, it's clear this matters to you, and \
             it's a completely fair thing to ask about."
        .to_owned(),
      text => format!(
        "You wrote: \"{}\" It sounds like you've put real thought into this, \
         and your experience deserves to be taken seriously.",
        truncate_chars(text, TEMPLATE_BODY_LIMIT)
      ),
    };

    format!(
      "{opening} {body} I can't offer medical or legal advice, and I'd never \
       encourage anything illegal, but you don't have to figure this out \
       alone. Please consider talking it through with a qualified \
       professional, like a doctor, pharmacist, therapist or lawyer, who can \
       look at your specific situation. Wishing you all the best."
    )
  }
}

impl ReplyGenerator for TemplateReplier {
  async fn suggest(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
    Ok(self.compose(request))
  }
}

// ─── Delegated prompt ────────────────────────────────────────────────────────

/// System instructions for delegated strategies.
pub fn system_instructions() -> String {
  format!(
    "You help a community manager draft replies to social media posts. \
     Follow these rules:\n{SAFETY_GUIDELINES}\nReply with the suggested text \
     only."
  )
}

/// The user prompt for delegated strategies. The body is cut at
/// [`PROMPT_BODY_LIMIT`] characters.
pub fn build_prompt(request: &ReplyRequest) -> String {
  let community = match request.community() {
    "" => "(none)",
    c => c,
  };
  let body = match request.body() {
    "" => "(no body text)".to_owned(),
    text => truncate_chars(text, PROMPT_BODY_LIMIT),
  };

  format!(
    "Suggest a reply to this post.\n\n\
     Platform: {}\n\
     Community: {community}\n\
     Title: {}\n\
     Body: {body}\n\n\
     Guidelines:\n{SAFETY_GUIDELINES}",
    request.platform(),
    request.title.trim(),
  )
}
