//! CatalogSession tests
//!
//! State transitions and the auto-aggregation loop: page ordering, the
//! 5-page ceiling, search single-shot behavior, and partial-set
//! semantics when a later page fails.

use mockito::{Matcher, Mock, Server, ServerGuard};
use phimcli::api::CatalogClient;
use phimcli::models::CatalogQuery;
use phimcli::session::{CatalogSession, SessionState};

/// Mock one listing page with `count` items and a reported page total
async fn mock_page(server: &mut ServerGuard, page: u32, count: usize, total: u32) -> Mock {
    let items: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"name": "p{page}-{i}", "slug": "p{page}-{i}"}}"#))
        .collect();
    let body = format!(
        r#"{{"items": [{}], "paginate": {{"total_page": {}}}}}"#,
        items.join(","),
        total
    );

    server
        .mock("GET", "/posts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter".into(), "latest".into()),
            Matcher::UrlEncoded("page".into(), page.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

// =============================================================================
// Auto-Aggregation Tests
// =============================================================================

#[tokio::test]
async fn test_auto_aggregation_stops_at_ceiling() {
    let mut server = Server::new_async().await;

    // Upstream reports 10 pages; the session must fetch exactly 5
    let mut mocks = Vec::new();
    for page in 1..=5 {
        mocks.push(mock_page(&mut server, page, 2, 10).await);
    }
    let page6 = server
        .mock("GET", "/posts")
        .match_query(Matcher::UrlEncoded("page".into(), "6".into()))
        .expect(0)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();

    for mock in &mocks {
        mock.assert_async().await;
    }
    page6.assert_async().await;

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.items().len(), 10);
    assert_eq!(session.pagination().current_page, 5);
    assert_eq!(session.pagination().total_pages, 10);
    assert!(session.has_more());

    // Items arrive in strict page order
    let slugs: Vec<&str> = session.items().iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(slugs[0], "p1-0");
    assert_eq!(slugs[1], "p1-1");
    assert_eq!(slugs[2], "p2-0");
    assert_eq!(slugs[8], "p5-0");
    assert_eq!(slugs[9], "p5-1");
}

#[tokio::test]
async fn test_auto_aggregation_stops_when_pages_run_out() {
    let mut server = Server::new_async().await;

    let page1 = mock_page(&mut server, 1, 3, 2).await;
    let page2 = mock_page(&mut server, 2, 1, 2).await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();

    page1.assert_async().await;
    page2.assert_async().await;

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.items().len(), 4);
    assert!(!session.has_more());
}

#[tokio::test]
async fn test_single_page_listing() {
    let mut server = Server::new_async().await;
    let page1 = mock_page(&mut server, 1, 5, 1).await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();

    page1.assert_async().await;
    assert_eq!(session.items().len(), 5);
    assert!(!session.has_more());
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_search_never_auto_paginates() {
    let mut server = Server::new_async().await;

    // Upstream claims 40 pages; search must issue exactly one request
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("query".into(), "batman".into()))
        .with_status(200)
        .with_body(
            r#"{"items": [{"name": "The Batman", "slug": "the-batman"}],
                "paginate": {"total_page": 40}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session
        .set_query(CatalogQuery::search("batman"))
        .await
        .unwrap();

    search.assert_async().await;
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.items().len(), 1);
    // Search results are complete after one call
    assert!(!session.has_more());
}

// =============================================================================
// Failure Semantics Tests
// =============================================================================

#[tokio::test]
async fn test_first_page_failure_fails_the_query() {
    let mut server = Server::new_async().await;

    let page1 = server
        .mock("GET", "/posts")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    let result = session.set_query(CatalogQuery::latest()).await;

    page1.assert_async().await;
    assert!(result.is_err());
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.items().is_empty());
}

#[tokio::test]
async fn test_later_page_failure_keeps_partial_set() {
    let mut server = Server::new_async().await;

    let page1 = mock_page(&mut server, 1, 3, 10).await;
    let page2 = server
        .mock("GET", "/posts")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    // Aggregation stops at the failed page; page 3 is never requested
    let page3 = server
        .mock("GET", "/posts")
        .match_query(Matcher::UrlEncoded("page".into(), "3".into()))
        .expect(0)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    let result = session.set_query(CatalogQuery::latest()).await;

    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;

    // A later page's transient failure is swallowed
    assert!(result.is_ok());
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.items().len(), 3);
}

#[tokio::test]
async fn test_empty_result_is_ready_not_failed() {
    let mut server = Server::new_async().await;

    let _page1 = server
        .mock("GET", "/posts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": [], "paginate": {"total_page": 1}}"#)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.items().is_empty());
}

// =============================================================================
// Manual Pagination Tests
// =============================================================================

#[tokio::test]
async fn test_request_more_fetches_one_page_past_ceiling() {
    let mut server = Server::new_async().await;

    let mut mocks = Vec::new();
    for page in 1..=5 {
        mocks.push(mock_page(&mut server, page, 1, 10).await);
    }
    let page6 = mock_page(&mut server, 6, 1, 10).await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();
    assert_eq!(session.items().len(), 5);

    let appended = session.request_more().await.unwrap();

    page6.assert_async().await;
    assert_eq!(appended, 1);
    assert_eq!(session.items().len(), 6);
    assert_eq!(session.pagination().current_page, 6);
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_request_more_without_more_pages_is_noop() {
    let mut server = Server::new_async().await;
    let _page1 = mock_page(&mut server, 1, 2, 1).await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();

    let appended = session.request_more().await.unwrap();
    assert_eq!(appended, 0);
    assert_eq!(session.items().len(), 2);
}

#[tokio::test]
async fn test_request_more_failure_is_swallowed() {
    let mut server = Server::new_async().await;

    let mut mocks = Vec::new();
    mocks.push(mock_page(&mut server, 1, 2, 10).await);
    for page in 2..=5 {
        mocks.push(mock_page(&mut server, page, 1, 10).await);
    }
    let _page6 = server
        .mock("GET", "/posts")
        .match_query(Matcher::UrlEncoded("page".into(), "6".into()))
        .with_status(500)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();
    let before = session.items().len();

    let appended = session.request_more().await.unwrap();
    assert_eq!(appended, 0);
    assert_eq!(session.items().len(), before);
    assert_eq!(session.state(), SessionState::Ready);
}

// =============================================================================
// Query Replacement Tests
// =============================================================================

#[tokio::test]
async fn test_new_query_clears_accumulated_items() {
    let mut server = Server::new_async().await;

    let _page1 = mock_page(&mut server, 1, 4, 1).await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("query".into(), "tenet".into()))
        .with_status(200)
        .with_body(r#"{"items": [{"name": "Tenet", "slug": "tenet"}]}"#)
        .create_async()
        .await;

    let mut session = CatalogSession::new(CatalogClient::with_base_url(server.url()));
    session.set_query(CatalogQuery::latest()).await.unwrap();
    assert_eq!(session.items().len(), 4);

    // The new query fully replaces the old result set
    session
        .set_query(CatalogQuery::search("tenet"))
        .await
        .unwrap();
    search.assert_async().await;
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.items()[0].slug, "tenet");
}
