//! phimcli - resilient movie-catalog browser
//!
//! Fetches movie listings and metadata from a third-party streaming API
//! that cannot be relied on to answer a direct request, falling back
//! through an ordered chain of public CORS relays with response
//! validation, and resolves per-episode playback sources.
//!
//! # Modules
//!
//! - `models` - Canonical data model (queries, items, details, sources)
//! - `api` - Relay chain, resilient fetching, dialect normalization
//! - `session` - Query state machine and page auto-aggregation
//! - `playback` - Source resolution and player lifecycle
//! - `config` - Persisted theme preference

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod playback;
pub mod session;

// Re-export commonly used types
pub use models::{
    CatalogItem, CatalogQuery, EpisodeSource, FilterKind,
    MovieDetail, PaginationState, ServerGroup,
};

pub use api::{CatalogClient, CatalogPage, FetchError, ProxyChain, ProxyRelay, ResilientFetcher};
pub use config::{Config, Theme};
pub use playback::{resolve, HlsPlayer, PlaybackController, PlaybackDecision};
pub use session::{CatalogSession, SessionError, SessionState};
