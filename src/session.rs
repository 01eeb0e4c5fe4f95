//! Catalog session and fetch orchestration
//!
//! Owns the current query, the accumulated result set, and the
//! Idle → Loading → {Ready, Failed} state machine. Pagination is an
//! explicit loop here, not recursive self-continuation: after a
//! successful first page the session keeps pulling pages in increasing
//! order until the upstream runs out, the auto-load ceiling is hit, or a
//! later page fails (which is swallowed: a partial set beats discarding
//! a good first page).

use log::warn;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{CatalogClient, CatalogPage, FetchError};
use crate::models::{CatalogItem, CatalogQuery, PaginationState};

// =============================================================================
// Session State
// =============================================================================

/// Where the session is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No query has been loaded yet
    #[default]
    Idle,
    /// A query (or its auto-aggregation sub-loop) is in flight
    Loading,
    /// The current query's result set is complete (possibly partial if a
    /// later page failed)
    Ready,
    /// The current query's first page could not be loaded
    Failed,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }
}

// =============================================================================
// Session Errors
// =============================================================================

#[derive(Error, Debug)]
pub enum SessionError {
    /// A load is already in flight; the caller must wait for it
    #[error("A load is already in progress")]
    Busy,

    /// The first page of a query could not be reached
    #[error(transparent)]
    Unreachable(#[from] FetchError),

    /// The response arrived for a query that has since been replaced
    #[error("Query was superseded before its results arrived")]
    Superseded,
}

// =============================================================================
// Catalog Session
// =============================================================================

/// Owned session state: one active query, one result set. Replaces any
/// implicit shared state; callers hold exactly one of these per view.
pub struct CatalogSession {
    client: CatalogClient,
    state: SessionState,
    query: CatalogQuery,
    /// Identity of the query currently owning the result set. Results
    /// tagged with an older id are dropped instead of overwriting newer
    /// state.
    query_id: Uuid,
    items: Vec<CatalogItem>,
    pagination: PaginationState,
}

impl CatalogSession {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            state: SessionState::Idle,
            query: CatalogQuery::latest(),
            query_id: Uuid::new_v4(),
            items: Vec::new(),
            pagination: PaginationState::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// More pages can be requested manually. Search result sets are
    /// complete after one call and never report more.
    pub fn has_more(&self) -> bool {
        !self.query.is_search() && self.pagination.has_more()
    }

    /// Replace the current query and load it, auto-aggregating pages.
    ///
    /// Always resets to page 1 and clears the accumulated set. Rejected
    /// with [`SessionError::Busy`] while a prior load is in flight. A
    /// first-page failure moves the session to `Failed` with nothing
    /// accumulated; failures on later pages keep the partial set.
    pub async fn set_query(&mut self, query: CatalogQuery) -> Result<(), SessionError> {
        if self.state.is_loading() {
            return Err(SessionError::Busy);
        }

        self.query = query;
        self.query_id = Uuid::new_v4();
        let issued = self.query_id;
        self.items.clear();
        self.pagination = PaginationState::new();
        self.state = SessionState::Loading;

        // Page 1 is fatal: nothing partial to show yet
        match self.client.list(&self.query, 1).await {
            Ok(page) => {
                if !self.apply_page(issued, 1, page) {
                    return Err(SessionError::Superseded);
                }
            }
            Err(err) => {
                self.items.clear();
                self.state = SessionState::Failed;
                return Err(err.into());
            }
        }

        // Auto-aggregation: strictly increasing page order, each page
        // appended before the next is requested
        while !self.query.is_search() && self.pagination.should_auto_load() {
            let next = self.pagination.current_page + 1;
            match self.client.list(&self.query, next).await {
                Ok(page) => {
                    if !self.apply_page(issued, next, page) {
                        return Err(SessionError::Superseded);
                    }
                }
                Err(err) => {
                    // A later page failing is not worth discarding the
                    // pages already shown
                    warn!(
                        "page {} of {} failed, keeping {} items: {}",
                        next,
                        self.query,
                        self.items.len(),
                        err
                    );
                    break;
                }
            }
        }

        self.state = SessionState::Ready;
        Ok(())
    }

    /// Fetch exactly one more page past the auto-load ceiling (the
    /// collaborator's explicit "load more" action). Returns how many
    /// items were appended; failures past page 1 are swallowed.
    pub async fn request_more(&mut self) -> Result<usize, SessionError> {
        if self.state.is_loading() {
            return Err(SessionError::Busy);
        }
        if !self.has_more() {
            return Ok(0);
        }

        let issued = self.query_id;
        let next = self.pagination.current_page + 1;
        self.state = SessionState::Loading;

        match self.client.list(&self.query, next).await {
            Ok(page) => {
                let appended = page.items.len();
                if !self.apply_page(issued, next, page) {
                    return Err(SessionError::Superseded);
                }
                self.state = SessionState::Ready;
                Ok(appended)
            }
            Err(err) => {
                warn!("manual page {} of {} failed: {}", next, self.query, err);
                self.state = SessionState::Ready;
                Ok(0)
            }
        }
    }

    /// Append a fetched page if it still belongs to the current query.
    /// Returns false when the result arrived for a superseded query and
    /// was dropped.
    fn apply_page(&mut self, issued: Uuid, page: u32, result: CatalogPage) -> bool {
        if self.query_id != issued {
            warn!("dropping stale page {} for superseded query", page);
            return false;
        }

        self.items.extend(result.items);
        self.pagination.current_page = page;
        self.pagination.total_pages = if self.query.is_search() {
            // Search is complete after one call
            1
        } else {
            result.total_pages
        };
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str) -> CatalogItem {
        CatalogItem {
            name: slug.to_string(),
            original_name: String::new(),
            slug: slug.to_string(),
            poster_url: String::new(),
            quality: String::new(),
            language: String::new(),
            year: String::new(),
            current_episode: String::new(),
        }
    }

    fn offline_session() -> CatalogSession {
        CatalogSession::new(CatalogClient::with_base_url("http://127.0.0.1:9"))
    }

    #[test]
    fn test_fresh_session_is_idle() {
        let session = offline_session();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.items().is_empty());
        assert!(!session.has_more());
    }

    #[test]
    fn test_apply_page_appends_in_order() {
        let mut session = offline_session();
        let issued = session.query_id;

        assert!(session.apply_page(
            issued,
            1,
            CatalogPage {
                items: vec![item("a"), item("b")],
                total_pages: 3,
            },
        ));
        assert!(session.apply_page(
            issued,
            2,
            CatalogPage {
                items: vec![item("c")],
                total_pages: 3,
            },
        ));

        let slugs: Vec<&str> = session.items().iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(session.pagination().current_page, 2);
        assert_eq!(session.pagination().total_pages, 3);
        assert!(session.has_more());
    }

    #[test]
    fn test_apply_page_drops_stale_results() {
        let mut session = offline_session();
        let stale = Uuid::new_v4();

        assert!(!session.apply_page(
            stale,
            1,
            CatalogPage {
                items: vec![item("late-arrival")],
                total_pages: 8,
            },
        ));
        assert!(session.items().is_empty());
        assert_eq!(session.pagination().total_pages, 1);
    }

    #[test]
    fn test_search_forces_single_page() {
        let mut session = offline_session();
        session.query = CatalogQuery::search("batman");
        let issued = session.query_id;

        assert!(session.apply_page(
            issued,
            1,
            CatalogPage {
                items: vec![item("result")],
                total_pages: 40,
            },
        ));
        // Upstream claims 40 pages; search is complete anyway
        assert_eq!(session.pagination().total_pages, 1);
        assert!(!session.has_more());
    }

    #[test]
    fn test_state_predicates() {
        assert!(SessionState::Loading.is_loading());
        assert!(!SessionState::Ready.is_loading());
        assert!(SessionState::Ready.is_ready());
        assert!(!SessionState::Failed.is_ready());
        assert_eq!(SessionState::default(), SessionState::Idle);
    }
}
