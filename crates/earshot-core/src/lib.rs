//! Core types and trait definitions for earshot, a social listening backend.
//!
//! This crate is free of HTTP and database dependencies. Adapters implement
//! [`source::PostSource`], [`store::PostStore`] and [`reply::ReplyGenerator`];
//! the API layer depends only on these abstractions.

// Native `async fn` in traits; the futures are bounded `Send` explicitly.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ingest;
pub mod post;
pub mod reply;
pub mod source;
pub mod store;
pub mod stub;

pub use error::{IngestError, NormalizeError, ReplyError};
