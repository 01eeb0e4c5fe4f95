//! Upstream response normalization
//!
//! The catalog API has three deployments with three different response
//! shapes. Callers never learn which one answered: a structural probe
//! picks the dialect and a per-dialect mapping converges on the canonical
//! model.
//!
//! - post lists: bare array of `{title, link, image}` (slug parsed from
//!   the link)
//! - item envelopes: `{items: [...]}` with near-canonical field names
//! - detail envelopes: `{movie: {...}}` or a bare detail object

use serde_json::Value;

use crate::models::{CatalogItem, EpisodeSource, MovieDetail, ServerGroup};

// =============================================================================
// List Normalization
// =============================================================================

/// Map any list-shaped payload to canonical catalog items
pub fn normalize_list(payload: &Value) -> Vec<CatalogItem> {
    list_entries(payload)
        .iter()
        .map(|entry| normalize_item(entry))
        .collect()
}

/// Locate the entry array inside whichever envelope is in effect
fn list_entries(payload: &Value) -> Vec<Value> {
    if let Some(posts) = payload.as_array() {
        return posts.clone();
    }
    if let Some(items) = payload.get("items").and_then(Value::as_array) {
        return items.clone();
    }
    if let Some(items) = payload
        .get("data")
        .and_then(|d| d.get("items"))
        .and_then(Value::as_array)
    {
        return items.clone();
    }
    if let Some(items) = payload.get("data").and_then(Value::as_array) {
        return items.clone();
    }
    Vec::new()
}

/// One entry from any dialect to a canonical item
fn normalize_item(entry: &Value) -> CatalogItem {
    let name = text(entry, &["name", "title"]);
    let slug = {
        let explicit = text(entry, &["slug"]);
        if explicit.is_empty() {
            extract_slug(&text(entry, &["link"]))
        } else {
            explicit
        }
    };

    CatalogItem {
        name,
        original_name: text(entry, &["original_name"]),
        slug,
        poster_url: text(entry, &["thumb_url", "poster_url", "image"]),
        quality: text(entry, &["quality"]),
        language: text(entry, &["language", "lang"]),
        year: text(entry, &["year"]),
        current_episode: text(entry, &["current_episode"]),
    }
}

/// Extract a routing slug from a detail-page link.
///
/// Recognized path segments are `/m/`, `/s/`, and `/phim/`; anything else
/// falls back to the final path segment with the query string stripped.
pub fn extract_slug(link: &str) -> String {
    if link.is_empty() {
        return String::new();
    }

    if let Ok(re) = regex::Regex::new(r"/(?:m|s|phim)/([^/?]+)") {
        if let Some(caps) = re.captures(link) {
            if let Some(m) = caps.get(1) {
                return m.as_str().to_string();
            }
        }
    }

    let path = link.split(|c| c == '?' || c == '#').next().unwrap_or("");
    path.rsplit('/').next().unwrap_or("").to_string()
}

// =============================================================================
// Detail Normalization
// =============================================================================

/// Map a detail-shaped payload to a canonical [`MovieDetail`].
///
/// Returns `None` when no detail object can be located at all (the
/// payload validated as an envelope but holds nothing usable).
pub fn normalize_detail(payload: &Value, requested_slug: &str) -> Option<MovieDetail> {
    // The detail object arrives under a `movie` key or as the bare body
    let movie = match payload.get("movie") {
        Some(inner) if inner.is_object() => inner,
        _ if payload.is_object() => payload,
        _ => return None,
    };

    let name = text(movie, &["name", "title"]);
    if name.is_empty() {
        return None;
    }

    let slug = {
        let explicit = text(movie, &["slug"]);
        if explicit.is_empty() {
            requested_slug.to_string()
        } else {
            explicit
        }
    };

    Some(MovieDetail {
        name,
        original_name: text(movie, &["original_name"]),
        slug,
        poster_url: text(movie, &["thumb_url", "poster_url", "image"]),
        quality: text(movie, &["quality"]),
        language: text(movie, &["language", "lang"]),
        year: text(movie, &["year"]),
        current_episode: text(movie, &["current_episode"]),
        description: text(movie, &["description", "synopsis", "content"]),
        category_tags: flatten_categories(movie),
        servers: normalize_servers(movie),
    })
}

/// Flatten category data to an ordered tag list.
///
/// Two upstream forms: an array of `{name}`, or an object of groups each
/// holding a `list` of `{name}`. Group encounter order and in-group item
/// order are both preserved.
fn flatten_categories(movie: &Value) -> Vec<String> {
    let mut tags = Vec::new();

    match movie.get("category") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                push_name(entry, &mut tags);
            }
        }
        Some(Value::Object(groups)) => {
            for group in groups.values() {
                if let Some(list) = group.get("list").and_then(Value::as_array) {
                    for entry in list {
                        push_name(entry, &mut tags);
                    }
                }
            }
        }
        _ => {}
    }

    // One deployment ships plain string tags instead of category groups
    if tags.is_empty() {
        if let Some(entries) = movie.get("tags").and_then(Value::as_array) {
            for entry in entries {
                push_name(entry, &mut tags);
            }
        }
    }

    tags
}

fn push_name(entry: &Value, tags: &mut Vec<String>) {
    match entry {
        Value::String(s) if !s.is_empty() => tags.push(s.clone()),
        Value::Object(_) => {
            let name = text(entry, &["name"]);
            if !name.is_empty() {
                tags.push(name);
            }
        }
        _ => {}
    }
}

/// Map either server-list form to canonical server groups.
///
/// Canonical: `episodes: [{server_name, server_data|items: [...]}]`.
/// Link-list: `linkList: [{title, directLinks: [{title, link}]}]`, where
/// a bare `link` feeds both the embed and HLS slots.
fn normalize_servers(movie: &Value) -> Vec<ServerGroup> {
    let raw_servers = movie
        .get("episodes")
        .or_else(|| movie.get("linkList"))
        .and_then(Value::as_array);

    let Some(raw_servers) = raw_servers else {
        return Vec::new();
    };

    raw_servers
        .iter()
        .enumerate()
        .map(|(server_index, server)| {
            let server_name = {
                let explicit = text(server, &["server_name", "title", "name"]);
                if explicit.is_empty() {
                    format!("Server {}", server_index + 1)
                } else {
                    explicit
                }
            };

            let raw_episodes = server
                .get("server_data")
                .or_else(|| server.get("items"))
                .or_else(|| server.get("directLinks"))
                .and_then(Value::as_array);

            let episodes = raw_episodes
                .map(|entries| {
                    entries
                        .iter()
                        .enumerate()
                        .map(|(episode_index, entry)| normalize_episode(entry, episode_index))
                        .collect()
                })
                .unwrap_or_default();

            ServerGroup {
                server_name,
                episodes,
            }
        })
        .collect()
}

fn normalize_episode(entry: &Value, index: usize) -> EpisodeSource {
    let display_name = {
        let explicit = text(entry, &["name", "title"]);
        if explicit.is_empty() {
            format!("Episode {}", index + 1)
        } else {
            explicit
        }
    };

    let mut embed_url = text(entry, &["link_embed", "embed"]);
    let mut hls_url = text(entry, &["link_m3u8", "m3u8"]);

    // Link-list deployments carry one undifferentiated link per episode
    if embed_url.is_empty() && hls_url.is_empty() {
        let link = text(entry, &["link"]);
        if !link.is_empty() {
            embed_url = link.clone();
            hls_url = link;
        }
    }

    EpisodeSource {
        display_name,
        embed_url,
        hls_url,
    }
}

// =============================================================================
// Pagination Extraction
// =============================================================================

/// Read the upstream-reported total page count, defaulting to 1.
///
/// Shapes observed: `paginate.total_page`, `paginate.totalPages`, and
/// `data.params.pagination.total_page`.
pub fn total_pages(payload: &Value) -> u32 {
    let paginate = payload
        .get("paginate")
        .or_else(|| {
            payload
                .get("data")
                .and_then(|d| d.get("params"))
                .and_then(|p| p.get("pagination"))
        })
        .unwrap_or(&Value::Null);

    for key in ["total_page", "totalPages"] {
        if let Some(value) = paginate.get(key) {
            if let Some(n) = value.as_u64() {
                return n.max(1) as u32;
            }
            if let Some(n) = value.as_str().and_then(|s| s.parse::<u32>().ok()) {
                return n.max(1);
            }
        }
    }

    1
}

// =============================================================================
// Field Helper
// =============================================================================

/// First non-empty value among `keys`, as text. Numbers are rendered so
/// `year: 2024` and `year: "2024"` are the same to callers; everything
/// absent becomes `""`, never null.
fn text(entry: &Value, keys: &[&str]) -> String {
    for key in keys {
        match entry.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    String::new()
}

// =============================================================================
// Unit Tests
// =============================================================================
