//! Thin HTTP layer over the platform backend: wire types mirroring the API
//! contract, and a client that attaches a bearer token when one is available.

mod client;
mod types;

pub use client::{ApiClient, ApiError, NoAuth, TokenSource};
pub use types::*;
