//! Reddit public search as an earshot [`PostSource`](earshot_core::source::PostSource).
//!
//! Unauthenticated and single-shot: one `GET /search.json` per call.

mod client;

pub mod error;

pub use client::{RedditClient, RedditConfig};
pub use error::{Error, Result};
