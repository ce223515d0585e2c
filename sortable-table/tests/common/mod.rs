#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use sortable_table::{Column, Fetcher, LoadError, Row, SortType, SortableTable};
use tabledom::{Event, MouseButton, NodeId};
use tokio::sync::oneshot;
use url::Url;

pub const BASE: &str = "https://example.test";

pub fn columns() -> Vec<Column> {
    vec![
        Column::new("images", "Image"),
        Column::new("title", "Name").sortable(SortType::String),
        Column::new("price", "Price").sortable(SortType::Number),
    ]
}

pub fn products() -> Vec<Row> {
    vec![
        Row::new().with("id", "lamp").with("title", "Lamp").with("price", 40),
        Row::new().with("id", "chair").with("title", "Chair").with("price", 120),
        Row::new().with("id", "desk").with("title", "Desk").with("price", 300),
    ]
}

pub fn products_json() -> Value {
    json!([
        {"id": "lamp", "title": "Lamp", "price": 40},
        {"id": "chair", "title": "Chair", "price": 120},
        {"id": "desk", "title": "Desk", "price": 300}
    ])
}

pub fn titles(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r.display_value("title")).collect()
}

/// Titles as rendered in the body, read back from the document.
pub fn rendered_titles(table: &SortableTable) -> Vec<String> {
    let doc = table.document();
    let body = table.sub_elements().body;
    doc.children(body)
        .into_iter()
        .filter_map(|row| doc.children(row).get(1).map(|cell| doc.text_content(*cell)))
        .collect()
}

/// The title span inside a header cell, where a real click would land.
pub fn header_span(table: &SortableTable, column_id: &str) -> NodeId {
    let doc = table.document();
    let cell = table.header_cell(column_id).unwrap();
    doc.query(cell, |n| n.tag == "span").unwrap()
}

pub fn click(table: &SortableTable, column_id: &str) -> usize {
    table
        .document()
        .dispatch(&Event::pointer_down(header_span(table, column_id)))
}

pub fn right_click(table: &SortableTable, column_id: &str) -> usize {
    table.document().dispatch(&Event::PointerDown {
        target: header_span(table, column_id),
        button: MouseButton::Right,
    })
}

// ============================================================================
// Fetchers
// ============================================================================

/// Answers immediately from fixtures keyed by full URL.
#[derive(Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, body: Value) -> Self {
        self.responses.lock().unwrap().insert(url.to_string(), body);
        self
    }

    pub fn fail(self, url: &str, status: u16) -> Self {
        self.failures.lock().unwrap().insert(url.to_string(), status);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<Value, LoadError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(status) = self.failures.lock().unwrap().get(url.as_str()) {
            return Err(LoadError::http(*status, "fixture failure"));
        }
        self.responses
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| LoadError::http(404, format!("no fixture for {url}")))
    }
}

/// Holds each response until the test releases it.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<String, oneshot::Receiver<Result<Value, LoadError>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending response for `url`.
    pub fn expect(&self, url: &str) -> oneshot::Sender<Result<Value, LoadError>> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().insert(url.to_string(), rx);
        tx
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<Value, LoadError> {
        self.requests.lock().unwrap().push(url.to_string());
        let pending = self.script.lock().unwrap().remove(url.as_str());
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LoadError::parse("response dropped"))),
            None => Err(LoadError::http(404, format!("unexpected request {url}"))),
        }
    }
}
