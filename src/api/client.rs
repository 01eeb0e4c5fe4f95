//! Catalog API client
//!
//! Endpoint construction over the resilient fetcher. The upstream's base
//! path and filters follow the deployment this client was written
//! against; everything shape-related is delegated to the normalizer so
//! callers only ever see canonical models.

use crate::api::fetch::{FetchError, ResilientFetcher};
use crate::api::normalize;
use crate::api::proxy::ProxyChain;
use crate::models::{CatalogItem, CatalogQuery, FilterKind, MovieDetail};

const DEFAULT_BASE_URL: &str = "https://app.gogophim.com/v1";

/// One fetched listing page, already normalized
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_pages: u32,
}

/// Client for the movie-catalog API
pub struct CatalogClient {
    base_url: String,
    fetcher: ResilientFetcher,
}

impl CatalogClient {
    /// Client against the production deployment with the default relay
    /// chain
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetcher: ResilientFetcher::new(),
        }
    }

    /// Direct-only client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher: ResilientFetcher::with_chain(ProxyChain::none()),
        }
    }

    /// Client with full control over base URL and fetcher
    pub fn with_fetcher(base_url: impl Into<String>, fetcher: ResilientFetcher) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
        }
    }

    /// Fetch one listing page for a query
    pub async fn list(&self, query: &CatalogQuery, page: u32) -> Result<CatalogPage, FetchError> {
        let url = self.list_url(query, page);
        let payload = self.fetcher.fetch_json(&url).await?;

        Ok(CatalogPage {
            items: normalize::normalize_list(&payload),
            total_pages: normalize::total_pages(&payload),
        })
    }

    /// Fetch and normalize a movie's detail page. `Ok(None)` means the
    /// upstream answered with a valid envelope that held no usable movie.
    pub async fn detail(&self, slug: &str) -> Result<Option<MovieDetail>, FetchError> {
        let url = format!(
            "{}/meta?type=movie&slug={}",
            self.base_url,
            urlencoding::encode(slug)
        );
        let payload = self.fetcher.fetch_json(&url).await?;
        Ok(normalize::normalize_detail(&payload, slug))
    }

    /// Build the listing URL for a query's page
    fn list_url(&self, query: &CatalogQuery, page: u32) -> String {
        match query.kind {
            FilterKind::Category => {
                let filter = Self::category_filter(&query.value);
                format!(
                    "{}/posts?filter={}&page={}&limit=24",
                    self.base_url, filter, page
                )
            }
            FilterKind::Genre => format!(
                "{}/posts?genre={}&page={}&limit=24",
                self.base_url, query.value, page
            ),
            // Upstream exposes no country/year filter; fall back to the
            // latest listing
            FilterKind::Country | FilterKind::Year => format!(
                "{}/posts?filter=latest&page={}&limit=24",
                self.base_url, page
            ),
            FilterKind::Search => format!(
                "{}/search?query={}&page=1&limit=20",
                self.base_url,
                urlencoding::encode(&query.value)
            ),
        }
    }

    /// Category slugs the UI uses mapped to upstream filter names
    fn category_filter(slug: &str) -> &str {
        match slug {
            "phim-moi-cap-nhat" => "latest",
            other => other,
        }
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url_category() {
        let client = CatalogClient::with_base_url("http://api");
        assert_eq!(
            client.list_url(&CatalogQuery::category("phim-le"), 2),
            "http://api/posts?filter=phim-le&page=2&limit=24"
        );
    }

    #[test]
    fn test_list_url_category_alias() {
        let client = CatalogClient::with_base_url("http://api");
        assert_eq!(
            client.list_url(&CatalogQuery::category("phim-moi-cap-nhat"), 1),
            "http://api/posts?filter=latest&page=1&limit=24"
        );
    }

    #[test]
    fn test_list_url_genre() {
        let client = CatalogClient::with_base_url("http://api");
        assert_eq!(
            client.list_url(&CatalogQuery::genre("hanh-dong"), 3),
            "http://api/posts?genre=hanh-dong&page=3&limit=24"
        );
    }

    #[test]
    fn test_list_url_country_year_fall_back_to_latest() {
        let client = CatalogClient::with_base_url("http://api");
        assert_eq!(
            client.list_url(&CatalogQuery::country("han-quoc"), 1),
            "http://api/posts?filter=latest&page=1&limit=24"
        );
        assert_eq!(
            client.list_url(&CatalogQuery::year("2024"), 2),
            "http://api/posts?filter=latest&page=2&limit=24"
        );
    }

    #[test]
    fn test_list_url_search_encodes_keyword() {
        let client = CatalogClient::with_base_url("http://api");
        assert_eq!(
            client.list_url(&CatalogQuery::search("the batman"), 1),
            "http://api/search?query=the%20batman&page=1&limit=20"
        );
    }
}
