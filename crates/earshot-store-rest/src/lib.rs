//! Hosted REST backend for the earshot post store.
//!
//! Speaks the PostgREST dialect exposed by Supabase under `/rest/v1`,
//! authenticated with a service key.

mod filter;
mod row;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RestStore, RestStoreConfig};
