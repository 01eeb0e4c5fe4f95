//! Data structures and types for phimcli
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: browse queries, list items, movie details
//! - **Sources**: server groups and per-episode stream sources
//! - **Fetch**: per-route attempt records for the resilience layer
//! - **Pagination**: auto-aggregation bookkeeping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Catalog Query
// =============================================================================

/// Filter dimension for a catalog query. Exactly one is active at a time;
/// a new query replaces the old one wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Category,
    Genre,
    Country,
    Year,
    Search,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Category => write!(f, "category"),
            FilterKind::Genre => write!(f, "genre"),
            FilterKind::Country => write!(f, "country"),
            FilterKind::Year => write!(f, "year"),
            FilterKind::Search => write!(f, "search"),
        }
    }
}

/// A single catalog query. Page position is tracked separately in
/// [`PaginationState`]; the query only says *what* is being browsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub kind: FilterKind,
    pub value: String,
}

impl CatalogQuery {
    /// Browse the default "latest" listing
    pub fn latest() -> Self {
        Self::category("latest")
    }

    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Category,
            value: slug.into(),
        }
    }

    pub fn genre(slug: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Genre,
            value: slug.into(),
        }
    }

    pub fn country(slug: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Country,
            value: slug.into(),
        }
    }

    pub fn year(year: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Year,
            value: year.into(),
        }
    }

    pub fn search(keyword: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Search,
            value: keyword.into(),
        }
    }

    /// Search result sets are complete after a single call and never
    /// auto-paginate.
    pub fn is_search(&self) -> bool {
        self.kind == FilterKind::Search
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

// =============================================================================
// Catalog Models
// =============================================================================

/// A single listing entry, normalized from whichever upstream dialect
/// produced it. All fields are plain strings; absent upstream values become
/// `""` so consumers never render the literal "null". `slug` is the unique
/// routing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    pub slug: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub current_episode: String,
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.year.is_empty() {
            write!(f, " ({})", self.year)?;
        }
        if !self.quality.is_empty() {
            write!(f, " [{}]", self.quality)?;
        }
        Ok(())
    }
}

/// Full detail-page payload for one movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    pub slug: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub current_episode: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub servers: Vec<ServerGroup>,
}

impl MovieDetail {
    /// Look up an episode source by 0-based server and episode index
    pub fn episode(&self, server: usize, episode: usize) -> Option<&EpisodeSource> {
        self.servers.get(server)?.episodes.get(episode)
    }

    /// Total episode count across all server groups
    pub fn episode_count(&self) -> usize {
        self.servers.iter().map(|s| s.episodes.len()).sum()
    }
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.year.is_empty() {
            write!(f, " ({})", self.year)?;
        }
        write!(f, " - {} server(s)", self.servers.len())
    }
}

// =============================================================================
// Source Models
// =============================================================================

/// One hosting provider's episode list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGroup {
    pub server_name: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeSource>,
}

/// A playable episode entry. Either URL may be blank (dead episode), one
/// may be present, or both; the embed URL wins at playback time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSource {
    pub display_name: String,
    #[serde(default)]
    pub embed_url: String,
    #[serde(default)]
    pub hls_url: String,
}

impl EpisodeSource {
    /// True when at least one non-blank URL is present
    pub fn has_source(&self) -> bool {
        !self.embed_url.trim().is_empty() || !self.hls_url.trim().is_empty()
    }
}

impl fmt::Display for EpisodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.has_source() { "" } else { " (no source)" };
        write!(f, "{}{}", self.display_name, marker)
    }
}

// =============================================================================
// Fetch Models
// =============================================================================

/// Which route an HTTP attempt went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Direct request to the target URL
    Direct,
    /// Relay proxy at this position in the chain (0-based)
    Proxy(usize),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Direct => write!(f, "direct"),
            Route::Proxy(i) => write!(f, "proxy#{}", i),
        }
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Transport-level failure (timeout, DNS, connect, non-2xx)
    Rejected(String),
    /// Body arrived but was not a recognizable API payload
    InvalidShape,
}

/// Transient record of one route attempt. Used for fallback diagnostics
/// only; never persisted.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub route: Route,
    pub outcome: AttemptOutcome,
    pub latency: Duration,
}

impl fmt::Display for FetchAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match &self.outcome {
            AttemptOutcome::Success => "ok".to_string(),
            AttemptOutcome::Rejected(e) => format!("rejected: {}", e),
            AttemptOutcome::InvalidShape => "invalid shape".to_string(),
        };
        write!(f, "{} {} in {}ms", self.route, outcome, self.latency.as_millis())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Auto-load at most this many pages per query before yielding to the
/// caller (bounds worst-case latency at 5 sequential fetches).
pub const AUTO_LOAD_CEILING: u32 = 5;

/// Bookkeeping for the auto-aggregation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
    pub auto_load_ceiling: u32,
}

impl PaginationState {
    pub fn new() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            auto_load_ceiling: AUTO_LOAD_CEILING,
        }
    }

    /// More pages exist upstream beyond what has been fetched
    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// The auto-aggregation loop may fetch another page
    pub fn should_auto_load(&self) -> bool {
        self.has_more() && self.current_page < self.auto_load_ceiling
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
