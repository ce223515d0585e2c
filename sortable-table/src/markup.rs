//! Markup builder: pure functions from columns and rows to tree descriptions.

use tabledom::Element;

use crate::column::Column;
use crate::row::Row;

pub const CELL_CLASS: &str = "sortable-table__cell";
pub const ROW_CLASS: &str = "sortable-table__row";
pub const TABLE_CLASS: &str = "sortable-table";
pub const LOADING_CLASS: &str = "sortable-table_loading";

/// `data-element` names of the addressable regions.
pub mod regions {
    pub const CONTAINER: &str = "productsContainer";
    pub const HEADER: &str = "header";
    pub const BODY: &str = "body";
    pub const LOADING: &str = "loading";
    pub const EMPTY_PLACEHOLDER: &str = "emptyPlaceholder";
    pub const ARROW: &str = "arrow";
}

/// One header cell per column, in configured order.
///
/// Each cell carries `data-id` and `data-sortable` so a click can be
/// resolved from the node alone.
pub fn build_header(columns: &[Column]) -> Vec<Element> {
    columns.iter().map(build_header_cell).collect()
}

pub fn build_header_cell(column: &Column) -> Element {
    Element::div()
        .class(CELL_CLASS)
        .data("id", column.id.as_str())
        .data("sortable", column.sortable.to_string())
        .child(Element::span().text(column.title.as_str()))
}

/// One row element per row, in the order given.
pub fn build_rows(columns: &[Column], rows: &[Row]) -> Vec<Element> {
    rows.iter().map(|row| build_row(columns, row)).collect()
}

/// Rows with an `id` field link to their product page.
pub fn build_row(columns: &[Column], row: &Row) -> Element {
    let element = match row.get("id") {
        Some(_) => Element::anchor(format!("/products/{}", row.display_value("id"))),
        None => Element::div(),
    };
    element.class(ROW_CLASS).children(build_cell(columns, row))
}

/// The cells of one row. Custom renderers own their whole cell; every other
/// column gets a text cell, empty when the row lacks the field.
pub fn build_cell(columns: &[Column], row: &Row) -> Vec<Element> {
    columns
        .iter()
        .map(|column| match &column.renderer {
            Some(renderer) => renderer.render(row),
            None => Element::div()
                .class(CELL_CLASS)
                .text(row.display_value(&column.id)),
        })
        .collect()
}

/// The complete widget: header, body, loading line and empty placeholder.
pub fn build_table(columns: &[Column], rows: &[Row]) -> Element {
    Element::div()
        .data("element", regions::CONTAINER)
        .class("products-list__container")
        .child(
            Element::div()
                .class(TABLE_CLASS)
                .child(
                    Element::div()
                        .data("element", regions::HEADER)
                        .class("sortable-table__header")
                        .class(ROW_CLASS)
                        .children(build_header(columns)),
                )
                .child(
                    Element::div()
                        .data("element", regions::BODY)
                        .class("sortable-table__body")
                        .children(build_rows(columns, rows)),
                )
                .child(
                    Element::div()
                        .data("element", regions::LOADING)
                        .class("loading-line")
                        .class("sortable-table__loading-line"),
                )
                .child(build_empty_placeholder()),
        )
}

pub fn build_empty_placeholder() -> Element {
    Element::div()
        .data("element", regions::EMPTY_PLACEHOLDER)
        .class("sortable-table__empty-placeholder")
        .child(
            Element::div()
                .child(Element::paragraph().text("No products satisfies your filter criteria"))
                .child(
                    Element::button()
                        .class("button-primary-outline")
                        .text("Reset all filters"),
                ),
        )
}

/// The sort direction indicator.
pub fn build_arrow() -> Element {
    Element::span()
        .data("element", regions::ARROW)
        .class("sortable-table__sort-arrow")
        .child(Element::span().class("sort-arrow"))
}

/// Cell renderer for an `images` field holding `[{ "url": .. }, ..]`:
/// shows the first image as a thumbnail.
pub fn image_cell(row: &Row) -> Element {
    let url = row
        .get("images")
        .and_then(|v| v.get(0))
        .and_then(|img| img.get("url"))
        .and_then(|u| u.as_str());
    let cell = Element::div().class(CELL_CLASS);
    match url {
        Some(url) => cell.child(Element::img(url).class("sortable-table-image").attr("alt", "Image")),
        None => cell,
    }
}
