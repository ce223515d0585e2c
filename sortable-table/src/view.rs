//! Table view: the live subtree and its named regions.

use tabledom::{Document, Element, Event, EventKind, ListenerId, NodeId};

use crate::column::Column;
use crate::markup::{self, CELL_CLASS, LOADING_CLASS, ROW_CLASS, regions};
use crate::row::Row;
use crate::sort::SortDirection;

/// Handles to the addressable regions of a rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubElements {
    pub container: NodeId,
    pub table: NodeId,
    pub header: NodeId,
    pub body: NodeId,
    pub loading: NodeId,
    pub empty_placeholder: NodeId,
}

/// Owns one table's subtree inside a [`Document`].
///
/// The view never reorders rows on its own: whatever is handed to
/// [`replace_body`](Self::replace_body) is rendered in that order.
#[derive(Debug)]
pub struct TableView {
    doc: Document,
    columns: Vec<Column>,
    sub: SubElements,
    /// Direction indicator, created on first use and moved between cells.
    arrow: Option<NodeId>,
    listeners: Vec<ListenerId>,
}

impl TableView {
    /// Build the full subtree for `columns` and `rows` as a detached node.
    pub fn construct(doc: &Document, columns: Vec<Column>, rows: &[Row]) -> Self {
        let container = doc.create_element(&markup::build_table(&columns, rows));
        let region = |name: &str| {
            doc.query(container, |n| n.data("element") == Some(name))
                .unwrap_or(container)
        };
        let sub = SubElements {
            container,
            table: doc
                .query(container, |n| n.has_class(markup::TABLE_CLASS))
                .unwrap_or(container),
            header: region(regions::HEADER),
            body: region(regions::BODY),
            loading: region(regions::LOADING),
            empty_placeholder: region(regions::EMPTY_PLACEHOLDER),
        };

        Self {
            doc: doc.clone(),
            columns,
            sub,
            arrow: None,
            listeners: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn element(&self) -> NodeId {
        self.sub.container
    }

    pub fn sub_elements(&self) -> SubElements {
        self.sub
    }

    /// Swap the body rows for `rows`, leaving header and chrome untouched.
    pub fn replace_body(&self, rows: &[Row]) {
        let elements = markup::build_rows(&self.columns, rows);
        if self.doc.replace_children(self.sub.body, &elements).is_none() {
            log::warn!("table body {} is gone; {} row(s) not rendered", self.sub.body, rows.len());
        }
    }

    /// Row nodes currently in the body, in display order.
    pub fn body_rows(&self) -> Vec<NodeId> {
        self.doc
            .children(self.sub.body)
            .into_iter()
            .filter(|n| self.doc.has_class(*n, ROW_CLASS))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.body_rows().len()
    }

    /// Header cell for a column id.
    pub fn header_cell(&self, column_id: &str) -> Option<NodeId> {
        self.doc.query(self.sub.header, |n| {
            n.has_class(CELL_CLASS) && n.data("id") == Some(column_id)
        })
    }

    /// Header cell currently hosting the direction indicator.
    pub fn sorted_cell(&self) -> Option<NodeId> {
        self.arrow.and_then(|arrow| self.doc.parent(arrow))
    }

    pub fn arrow(&self) -> Option<NodeId> {
        self.arrow
    }

    /// Move the indicator to `cell` and mark the cell with `data-order`.
    ///
    /// The previous host loses both the indicator and its `data-order`.
    pub fn place_indicator(&mut self, cell: NodeId, direction: SortDirection) -> bool {
        if !self.doc.contains(cell) {
            return false;
        }
        if let Some(previous) = self.sorted_cell()
            && previous != cell
        {
            self.doc.remove_attr(previous, "data-order");
        }

        let arrow = match self.arrow {
            Some(arrow) if self.doc.contains(arrow) => arrow,
            _ => {
                let arrow = self.doc.create_element(&markup::build_arrow());
                self.arrow = Some(arrow);
                arrow
            }
        };
        self.doc.append_child(cell, arrow);
        self.doc.set_attr(cell, "data-order", direction.as_str())
    }

    pub fn set_loading(&self, loading: bool) {
        self.doc.set_class(self.sub.table, LOADING_CLASS, loading);
    }

    pub fn is_loading(&self) -> bool {
        self.doc.has_class(self.sub.table, LOADING_CLASS)
    }

    /// Register a handler on the header region.
    pub fn listen_header(
        &mut self,
        kind: EventKind,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Option<ListenerId> {
        let id = self.doc.add_event_listener(self.sub.header, kind, handler)?;
        self.listeners.push(id);
        Some(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn release_listeners(&mut self) {
        for id in self.listeners.drain(..) {
            self.doc.remove_event_listener(id);
        }
    }

    /// Append the table to `container`.
    pub fn mount(&mut self, container: NodeId) -> bool {
        self.doc.append_child(container, self.sub.container)
    }

    /// Detach from the container and drop every listener this view registered.
    pub fn unmount(&mut self) {
        self.release_listeners();
        self.doc.detach(self.sub.container);
    }

    /// Unmount and free the whole subtree, indicator included.
    pub fn dispose(&mut self) {
        self.unmount();
        if let Some(arrow) = self.arrow.take() {
            self.doc.remove(arrow);
        }
        self.doc.remove(self.sub.container);
    }

    /// Current description of the rendered subtree.
    pub fn snapshot(&self) -> Option<Element> {
        self.doc.snapshot(self.sub.container)
    }

    pub fn to_html(&self) -> Option<String> {
        self.doc.to_html(self.sub.container)
    }
}
