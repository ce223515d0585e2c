mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;
use sortable_table::{
    Fetcher, LoadError, Mode, RefreshOutcome, SortDirection, SortState, SortableTable, TableOptions,
};
use tabledom::Document;

fn remote_table(doc: &Document, fetcher: Arc<dyn Fetcher>) -> SortableTable {
    let options = TableOptions::new().url("products").base_url(BASE);
    SortableTable::with_fetcher(doc, columns(), options, fetcher).unwrap()
}

fn url(sort: &str, order: &str) -> String {
    format!("{BASE}/products?_sort={sort}&_order={order}")
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_click_requests_sorted_url() {
    let doc = Document::new();
    let page = doc.create_container("body");
    let fetcher = Arc::new(StaticFetcher::new().respond(&url("price", "asc"), products_json()));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);
    table.render(page);

    assert_eq!(click(&table, "price"), 1);
    table.settled().await;

    assert_eq!(
        fetcher.requests(),
        vec!["https://example.test/products?_sort=price&_order=asc".to_string()]
    );
    assert_eq!(table.fetch_url().as_str(), url("price", "asc"));
    assert_eq!(titles(&table.rows()), vec!["Lamp", "Chair", "Desk"]);
    assert!(table.last_error().is_none());
}

#[tokio::test]
async fn test_initialize_requests_current_sort() {
    let doc = Document::new();
    let response = json!([
        {"id": "desk", "title": "Desk", "price": 300},
        {"id": "lamp", "title": "Lamp", "price": 40},
        {"id": "chair", "title": "Chair", "price": 120}
    ]);
    let fetcher = Arc::new(StaticFetcher::new().respond(&url("price", "desc"), response));
    let options = TableOptions::new()
        .url("products")
        .base_url(BASE)
        .sorted("price", SortDirection::Descending);
    let table = SortableTable::with_fetcher(
        &doc,
        columns(),
        options,
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
    )
    .unwrap();

    assert_eq!(table.mode(), Mode::Remote);
    assert_eq!(table.initialize().await.unwrap(), RefreshOutcome::Applied);
    assert_eq!(fetcher.requests(), vec![url("price", "desc")]);
    // Server order is rendered as received.
    assert_eq!(rendered_titles(&table), vec!["Desk", "Lamp", "Chair"]);
}

#[tokio::test]
async fn test_object_response_rows_in_document_order() {
    let doc = Document::new();
    let response = json!({
        "b": {"title": "Chair", "price": 120},
        "a": {"title": "Lamp", "price": 40}
    });
    let fetcher = Arc::new(StaticFetcher::new().respond(&url("title", "asc"), response));
    let table = remote_table(&doc, fetcher);

    table.initialize().await.unwrap();
    assert_eq!(rendered_titles(&table), vec!["Chair", "Lamp"]);
}

#[tokio::test]
async fn test_sort_params_overwritten_in_place() {
    let doc = Document::new();
    let fetcher = Arc::new(
        StaticFetcher::new()
            .respond(&url("title", "asc"), products_json())
            .respond(&url("price", "asc"), products_json())
            .respond(&url("price", "desc"), products_json()),
    );
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    table.initialize().await.unwrap();
    click(&table, "price");
    table.settled().await;
    click(&table, "price");
    table.settled().await;

    assert_eq!(
        fetcher.requests(),
        vec![url("title", "asc"), url("price", "asc"), url("price", "desc")]
    );
    assert_eq!(table.sort_state(), Some(SortState::descending("price")));
}

#[tokio::test]
async fn test_caller_params_kept_alongside_sort() {
    let doc = Document::new();
    let expected = format!("{BASE}/products?title_like=lamp&_sort=price&_order=asc");
    let fetcher = Arc::new(StaticFetcher::new().respond(&expected, products_json()));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    table.set_fetch_param("title_like", "lamp");
    click(&table, "price");
    table.settled().await;

    assert_eq!(fetcher.requests(), vec![expected]);
    assert!(table.last_error().is_none());
}

#[tokio::test]
async fn test_non_sortable_click_does_not_fetch() {
    let doc = Document::new();
    let fetcher = Arc::new(StaticFetcher::new());
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    click(&table, "images");
    table.settled().await;

    assert!(fetcher.requests().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failed_refresh_keeps_rows() {
    let doc = Document::new();
    let fetcher = Arc::new(
        StaticFetcher::new()
            .respond(&url("title", "asc"), products_json())
            .fail(&url("price", "asc"), 500),
    );
    let table = remote_table(&doc, fetcher);
    table.initialize().await.unwrap();

    let err = table.refresh(SortState::ascending("price")).await.unwrap_err();

    assert!(err.is_load());
    assert!(matches!(err, sortable_table::Error::Load(LoadError::Http { status: 500, .. })));
    assert_eq!(rendered_titles(&table), vec!["Lamp", "Chair", "Desk"]);
    assert!(!table.is_loading());
}

#[tokio::test]
async fn test_click_failure_recorded() {
    let doc = Document::new();
    let fetcher = Arc::new(StaticFetcher::new().fail(&url("price", "asc"), 503));
    let table = remote_table(&doc, fetcher);

    click(&table, "price");
    table.settled().await;

    assert!(table.last_error().unwrap().contains("503"));
    assert_eq!(table.sort_state(), Some(SortState::ascending("price")));
}

#[tokio::test]
async fn test_malformed_body_is_load_error() {
    let doc = Document::new();
    let fetcher = Arc::new(StaticFetcher::new().respond(&url("title", "asc"), json!("nope")));
    let table = remote_table(&doc, fetcher);

    let err = table.initialize().await.unwrap_err();
    assert!(matches!(err, sortable_table::Error::Load(LoadError::Parse { .. })));
}

// ============================================================================
// Latest wins
// ============================================================================

fn price_response() -> serde_json::Value {
    json!([{"title": "from price"}])
}

fn name_response() -> serde_json::Value {
    json!([{"title": "from name"}])
}

#[tokio::test]
async fn test_latest_refresh_wins_when_answered_last() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let name = fetcher.expect(&url("title", "desc"));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    let older = table.refresh(SortState::ascending("price"));
    let newer = table.refresh(SortState::descending("title"));
    let respond = async {
        tokio::task::yield_now().await;
        price.send(Ok(price_response())).unwrap();
        tokio::task::yield_now().await;
        name.send(Ok(name_response())).unwrap();
    };
    let (older, newer, ()) = tokio::join!(older, newer, respond);

    assert_eq!(older.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(newer.unwrap(), RefreshOutcome::Applied);
    assert_eq!(rendered_titles(&table), vec!["from name"]);
    assert!(!table.is_loading());
}

#[tokio::test]
async fn test_latest_refresh_wins_when_answered_first() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let name = fetcher.expect(&url("title", "desc"));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    let older = table.refresh(SortState::ascending("price"));
    let newer = table.refresh(SortState::descending("title"));
    let respond = async {
        tokio::task::yield_now().await;
        name.send(Ok(name_response())).unwrap();
        tokio::task::yield_now().await;
        price.send(Ok(price_response())).unwrap();
    };
    let (older, newer, ()) = tokio::join!(older, newer, respond);

    assert_eq!(newer.unwrap(), RefreshOutcome::Applied);
    assert_eq!(older.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(rendered_titles(&table), vec!["from name"]);
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn test_superseded_failure_is_not_an_error() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let name = fetcher.expect(&url("title", "desc"));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    let older = table.refresh(SortState::ascending("price"));
    let newer = table.refresh(SortState::descending("title"));
    let respond = async {
        tokio::task::yield_now().await;
        price.send(Err(LoadError::http(500, "boom"))).unwrap();
        name.send(Ok(name_response())).unwrap();
    };
    let (older, newer, ()) = tokio::join!(older, newer, respond);

    assert_eq!(older.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(newer.unwrap(), RefreshOutcome::Applied);
}

#[tokio::test]
async fn test_loading_flag_while_in_flight() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let response = fetcher.expect(&url("price", "asc"));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    let refresh = table.refresh(SortState::ascending("price"));
    let respond = async {
        tokio::task::yield_now().await;
        assert!(table.is_loading());
        response.send(Ok(products_json())).unwrap();
    };
    let (outcome, ()) = tokio::join!(refresh, respond);

    assert_eq!(outcome.unwrap(), RefreshOutcome::Applied);
    assert!(!table.is_loading());
}

#[tokio::test]
async fn test_sync_sort_supersedes_in_flight_refresh() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let response = fetcher.expect(&url("price", "asc"));
    let options = TableOptions::new().url("products").base_url(BASE).data(products());
    let table = SortableTable::with_fetcher(
        &doc,
        columns(),
        options,
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
    )
    .unwrap();

    let refresh = table.refresh(SortState::ascending("price"));
    let interrupt = async {
        tokio::task::yield_now().await;
        table.sort("title", SortDirection::Descending).unwrap();
        response.send(Ok(price_response())).unwrap();
    };
    let (outcome, ()) = tokio::join!(refresh, interrupt);

    assert_eq!(outcome.unwrap(), RefreshOutcome::Superseded);
    assert_eq!(rendered_titles(&table), vec!["Lamp", "Desk", "Chair"]);
}

#[tokio::test]
async fn test_destroy_discards_late_response() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let response = fetcher.expect(&url("price", "asc"));
    let table = remote_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    let refresh = table.refresh(SortState::ascending("price"));
    let teardown = async {
        tokio::task::yield_now().await;
        table.destroy();
        response.send(Ok(products_json())).unwrap();
    };
    let (outcome, ()) = tokio::join!(refresh, teardown);

    assert_eq!(outcome.unwrap(), RefreshOutcome::Superseded);
    assert!(doc.is_empty());
}

// ============================================================================
// Latest wins through header clicks
// ============================================================================

fn price_desc_table(doc: &Document, fetcher: Arc<dyn Fetcher>) -> SortableTable {
    let options = TableOptions::new()
        .url("products")
        .base_url(BASE)
        .sorted("price", SortDirection::Descending);
    SortableTable::with_fetcher(doc, columns(), options, fetcher).unwrap()
}

fn title_response() -> serde_json::Value {
    json!([{"title": "from title"}])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_last_click_wins_when_answered_last() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let title = fetcher.expect(&url("title", "asc"));
    let table = price_desc_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    click(&table, "price");
    click(&table, "title");

    assert_eq!(table.fetch_url().as_str(), url("title", "asc"));
    assert!(table.is_loading());

    price.send(Ok(price_response())).unwrap();
    title.send(Ok(title_response())).unwrap();
    table.settled().await;

    assert_eq!(table.sort_state(), Some(SortState::ascending("title")));
    assert_eq!(rendered_titles(&table), vec!["from title"]);
    assert!(!table.is_loading());
    assert!(table.last_error().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_last_click_wins_when_answered_first() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let title = fetcher.expect(&url("title", "asc"));
    let table = price_desc_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    click(&table, "price");
    click(&table, "title");

    title.send(Ok(title_response())).unwrap();
    price.send(Ok(price_response())).unwrap();
    table.settled().await;

    assert_eq!(table.sort_state(), Some(SortState::ascending("title")));
    assert_eq!(rendered_titles(&table), vec!["from title"]);
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn test_last_click_wins_on_current_thread() {
    let doc = Document::new();
    let fetcher = Arc::new(ScriptedFetcher::new());
    let price = fetcher.expect(&url("price", "asc"));
    let title = fetcher.expect(&url("title", "asc"));
    let table = price_desc_table(&doc, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

    click(&table, "price");
    click(&table, "title");
    title.send(Ok(title_response())).unwrap();
    price.send(Ok(price_response())).unwrap();
    table.settled().await;

    assert_eq!(rendered_titles(&table), vec!["from title"]);
    assert_eq!(table.fetch_url().as_str(), url("title", "asc"));
}
