//! Delegated reply suggestions through an external text-generation API.

mod openai;

pub use openai::{OpenAiConfig, OpenAiReplier};
