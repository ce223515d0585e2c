//! Interaction controller: header clicks drive the sort state.

use tabledom::{Document, Event, EventKind, NodeId};

use crate::markup::CELL_CLASS;
use crate::sort::{SortDirection, SortState};
use crate::view::TableView;

/// What a header click resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click did not land on a header cell.
    Missed,
    /// The click landed on a cell whose column is not sortable.
    NotSortable(String),
    /// The sort state moved to this value.
    Sorted(SortState),
}

/// Owns the current sort state and the single header listener.
#[derive(Debug, Default)]
pub struct InteractionController {
    sorted: Option<SortState>,
}

impl InteractionController {
    pub fn new(sorted: Option<SortState>) -> Self {
        Self { sorted }
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sorted.as_ref()
    }

    /// Register `handler` for pointer-down on the header, unless one is
    /// already registered. Returns whether a listener was added.
    pub fn bind(
        &self,
        view: &mut TableView,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> bool {
        if view.listener_count() > 0 {
            return false;
        }
        view.listen_header(EventKind::PointerDown, handler).is_some()
    }

    pub fn unbind(&self, view: &mut TableView) {
        view.release_listeners();
    }

    /// Show the indicator for the current state, if any.
    pub fn sync_indicator(&self, view: &mut TableView) {
        if let Some(state) = &self.sorted
            && let Some(cell) = view.header_cell(&state.column_id)
        {
            view.place_indicator(cell, state.direction);
        }
    }

    /// Apply a header click at `target`.
    ///
    /// Only a sortable cell changes anything: the indicator moves there and
    /// the direction toggles if the column was already sorted, otherwise it
    /// starts ascending.
    pub fn on_header_event(&mut self, view: &mut TableView, target: NodeId) -> ClickOutcome {
        let doc = view.document().clone();
        let Some(cell) = resolve_cell(&doc, view.sub_elements().header, target) else {
            return ClickOutcome::Missed;
        };

        let column_id = doc.attr(cell, "data-id").unwrap_or_default();
        if doc.attr(cell, "data-sortable").as_deref() != Some("true") {
            log::debug!("ignoring click on non-sortable column {column_id}");
            return ClickOutcome::NotSortable(column_id);
        }

        let next = SortState::new(
            column_id.as_str(),
            next_direction(self.sorted.as_ref(), &column_id),
        );
        view.place_indicator(cell, next.direction);
        log::debug!("sort state -> {} {}", next.column_id, next.direction);
        self.sorted = Some(next.clone());
        ClickOutcome::Sorted(next)
    }
}

/// Toggle when re-clicking the sorted column, otherwise start ascending.
pub fn next_direction(current: Option<&SortState>, column_id: &str) -> SortDirection {
    match current {
        Some(state) if state.column_id == column_id => state.direction.toggle(),
        _ => SortDirection::Ascending,
    }
}

/// Nearest header cell at or above `target`, provided it sits inside `header`.
pub fn resolve_cell(doc: &Document, header: NodeId, target: NodeId) -> Option<NodeId> {
    let cell = doc.closest(target, |n| n.has_class(CELL_CLASS))?;
    doc.ancestors(cell).contains(&header).then_some(cell)
}
