//! CORS relay chain
//!
//! The upstream API sets no CORS headers and the original deployment had
//! no server of its own, so requests that cannot go direct are rewritten
//! through public relay services. The chain is a fixed preference ranking
//! (most reliable historically first); it is never reordered at runtime.

use std::fmt;

/// How a relay expects the target URL to be passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayStyle {
    /// Target appended percent-encoded: `{base}{urlencode(target)}`
    Query { base: String },
    /// Target appended verbatim: `{base}{target}`
    Path { base: String },
}

/// A single relay: a name for diagnostics and a pure URL rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRelay {
    name: String,
    style: RelayStyle,
}

impl ProxyRelay {
    pub fn query(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: RelayStyle::Query { base: base.into() },
        }
    }

    pub fn path(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: RelayStyle::Path { base: base.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrite a target URL into this relay's calling convention
    pub fn relay_url(&self, target: &str) -> String {
        match &self.style {
            RelayStyle::Query { base } => {
                format!("{}{}", base, urlencoding::encode(target))
            }
            RelayStyle::Path { base } => format!("{}{}", base, target),
        }
    }
}

impl fmt::Display for ProxyRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Ordered, fixed sequence of relays tried after the direct attempt fails
#[derive(Debug, Clone)]
pub struct ProxyChain {
    relays: Vec<ProxyRelay>,
}

impl ProxyChain {
    /// Build a chain from explicit relays (tests point this at a mock
    /// server; runtime code uses [`ProxyChain::default`])
    pub fn new(relays: Vec<ProxyRelay>) -> Self {
        Self { relays }
    }

    /// Chain with no relays: direct-only fetching
    pub fn none() -> Self {
        Self { relays: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyRelay> {
        self.relays.iter()
    }
}

impl Default for ProxyChain {
    fn default() -> Self {
        Self::new(vec![
            ProxyRelay::query("codetabs", "https://api.codetabs.com/v1/proxy?quest="),
            ProxyRelay::query("corsproxy", "https://corsproxy.org/?"),
            ProxyRelay::path("thingproxy", "https://thingproxy.freeboard.io/fetch/"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_style_encodes_target() {
        let relay = ProxyRelay::query("codetabs", "https://api.codetabs.com/v1/proxy?quest=");
        assert_eq!(
            relay.relay_url("https://app.example.com/v1/posts?page=1"),
            "https://api.codetabs.com/v1/proxy?quest=https%3A%2F%2Fapp.example.com%2Fv1%2Fposts%3Fpage%3D1"
        );
    }

    #[test]
    fn test_path_style_appends_raw() {
        let relay = ProxyRelay::path("thingproxy", "https://thingproxy.freeboard.io/fetch/");
        assert_eq!(
            relay.relay_url("https://app.example.com/v1/posts"),
            "https://thingproxy.freeboard.io/fetch/https://app.example.com/v1/posts"
        );
    }

    #[test]
    fn test_default_chain_order_is_fixed() {
        let chain = ProxyChain::default();
        let names: Vec<&str> = chain.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["codetabs", "corsproxy", "thingproxy"]);
    }

    #[test]
    fn test_empty_chain() {
        let chain = ProxyChain::none();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
    }
}
