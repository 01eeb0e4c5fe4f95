//! API access for the movie catalog
//!
//! - `proxy`: ordered CORS relay chain
//! - `validate`: envelope probing for relay noise
//! - `fetch`: direct-then-relay resilient fetching
//! - `normalize`: the three upstream dialects to one canonical model
//! - `client`: endpoint construction and typed results

pub mod client;
pub mod fetch;
pub mod normalize;
pub mod proxy;
pub mod validate;

pub use client::{CatalogClient, CatalogPage};
pub use fetch::{FetchError, ResilientFetcher};
pub use proxy::{ProxyChain, ProxyRelay};
