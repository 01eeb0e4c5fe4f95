//! Response-shape validation
//!
//! Relay proxies routinely answer HTTP 200 with non-API content: captcha
//! pages, quota-exceeded JSON, empty bodies. Status checking alone cannot
//! tell those apart from a real payload, so every parsed body is probed
//! for the upstream's envelope before it is accepted.

use serde_json::Value;

/// Keys a legitimate API object exposes at the top level. A bare array is
/// also legitimate (one deployment returns post lists that way).
const ENVELOPE_KEYS: [&str; 5] = ["items", "data", "movie", "status", "title"];

/// Decide whether a parsed body is a real API payload or proxy noise
pub fn is_valid_payload(body: &Value) -> bool {
    match body {
        Value::Array(_) => true,
        Value::Object(map) => ENVELOPE_KEYS.iter().any(|key| map.contains_key(*key)),
        _ => false,
    }
}
