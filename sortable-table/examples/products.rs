//! Products Example
//!
//! Loads the product catalogue from the course backend, sorts it by price
//! through a simulated header click, and prints the resulting markup.
//!
//! Pass `--local` to sort in memory after a single load.

use std::fs::File;

use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use sortable_table::markup::image_cell;
use sortable_table::{Column, SortDirection, SortType, SortableTable, TableOptions};
use tabledom::{Document, Event};

fn columns() -> Vec<Column> {
    vec![
        Column::new("images", "Image").renderer(image_cell),
        Column::new("title", "Name").sortable(SortType::String),
        Column::new("quantity", "Quantity").sortable(SortType::Number),
        Column::new("price", "Price").sortable(SortType::Number),
        Column::new("sales", "Sales").sortable(SortType::Number),
    ]
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Ok(log_file) = File::create("products.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let local = std::env::args().any(|a| a == "--local");
    let options = TableOptions::new()
        .url("api/rest/products")
        .sorted("title", SortDirection::Ascending)
        .sort_locally(local);

    let doc = Document::new();
    let page = doc.create_container("body");
    let table = match SortableTable::new(&doc, columns(), options) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    table.render(page);

    if let Err(e) = table.initialize().await {
        eprintln!("Error: {}", e);
        return;
    }
    println!("loaded {} products ({:?} mode)", table.row_count(), table.mode());

    if let Some(price) = table.header_cell("price") {
        doc.dispatch(&Event::pointer_down(price));
        table.settled().await;
    }
    if let Some(e) = table.last_error() {
        eprintln!("Error: {}", e);
    }

    println!("sorted by {:?}, requested {}", table.sort_state(), table.fetch_url());
    if let Some(html) = doc.to_html(page) {
        println!("{html}");
    }

    table.destroy();
}
