//! The sortable table widget.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tabledom::{Document, Event, MouseButton, NodeId};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

use crate::column::{Column, find_column, first_sortable};
use crate::controller::{ClickOutcome, InteractionController};
use crate::error::{ConfigurationError, Error};
use crate::options::TableOptions;
use crate::row::Row;
use crate::sort::{SortDirection, SortState};
use crate::source::{DataSource, FetchTarget, Fetcher, HttpFetcher, Mode, Request, decode_rows};
use crate::view::{SubElements, TableView};

/// Result of a load that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The rows were rendered.
    Applied,
    /// A later request (or a synchronous sort, or `destroy`) made this one
    /// irrelevant; nothing was rendered.
    Superseded,
}

struct TableState {
    view: TableView,
    controller: InteractionController,
    source: DataSource,
    last_error: Option<String>,
    destroyed: bool,
}

impl TableState {
    /// Order the local baseline by `sort` (or leave it as loaded) and render it.
    fn show_local(&mut self, sort: Option<&SortState>) -> Result<(), ConfigurationError> {
        match sort {
            Some(sort) => self.source.sort_local(self.view.columns(), sort)?,
            None => self.source.display_unsorted(),
        }
        self.view.replace_body(self.source.displayed());
        Ok(())
    }

    /// Take the next request ticket and show the loading state. Remote
    /// tables write `sort` into the fetch target in the same step.
    fn begin_load(&mut self, sort: Option<&SortState>) -> Request {
        let request = self.source.issue(sort);
        self.view.set_loading(true);
        request
    }

    fn record_error(&mut self, err: &Error) {
        log::warn!("header click refresh failed: {err}");
        self.last_error = Some(err.to_string());
    }
}

struct Shared {
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<TableState>,
    /// Refreshes started by header clicks.
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    fn read_state(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A sortable grid over local or remote rows.
///
/// Cheap to clone; clones share one table. The table lives in a
/// [`Document`] and listens for `pointerdown` on its header region with a
/// single delegated listener. Clicking a sortable header toggles the sort
/// and refreshes the body: in memory for local tables, by re-fetching with
/// `_sort`/`_order` for remote ones.
///
/// # Example
///
/// ```ignore
/// let doc = Document::new();
/// let page = doc.create_container("body");
/// let table = SortableTable::new(&doc, columns, TableOptions::new().url("api/rest/products"))?;
/// table.render(page);
/// table.initialize().await?;
/// ```
#[derive(Clone)]
pub struct SortableTable {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SortableTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.read_state();
        f.debug_struct("SortableTable")
            .field("mode", &state.source.mode())
            .field("target", &state.source.target().url().as_str())
            .field("sorted", &state.controller.sort_state())
            .field("rows", &state.source.displayed().len())
            .finish()
    }
}

impl SortableTable {
    /// Build a table that loads over HTTP.
    pub fn new(doc: &Document, columns: Vec<Column>, options: TableOptions) -> Result<Self, Error> {
        Self::with_fetcher(doc, columns, options, Arc::new(HttpFetcher::new()))
    }

    /// Build a table with a custom [`Fetcher`].
    ///
    /// Nothing is loaded yet: the supplied `data` is rendered as given and
    /// the initial sort only positions the indicator. Call
    /// [`initialize`](Self::initialize) for the first load.
    pub fn with_fetcher(
        doc: &Document,
        columns: Vec<Column>,
        options: TableOptions,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, Error> {
        let sorted = match options.sorted {
            Some(state) => {
                validate_sort_target(&columns, &state.column_id)?;
                Some(state)
            }
            None => first_sortable(&columns).map(|c| SortState::ascending(c.id.as_str())),
        };
        let target = FetchTarget::resolve(&options.base_url, &options.url)?;
        let mode = Mode::from_sort_locally(options.is_sort_locally);

        let mut view = TableView::construct(doc, columns, &options.data);
        let controller = InteractionController::new(sorted);
        controller.sync_indicator(&mut view);
        let source = DataSource::new(mode, target, options.data, !options.url.is_empty());

        log::debug!("table created: {:?} mode, target {}", mode, source.target());

        let table = Self {
            shared: Arc::new(Shared {
                fetcher,
                state: RwLock::new(TableState {
                    view,
                    controller,
                    source,
                    last_error: None,
                    destroyed: false,
                }),
                pending: Mutex::new(Vec::new()),
            }),
        };
        table.bind_header();
        Ok(table)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Append the table to `container`. Returns `false` if it could not be
    /// mounted (missing container, or the table was destroyed).
    pub fn render(&self, container: NodeId) -> bool {
        {
            let mut state = self.shared.write_state();
            if state.destroyed || !state.view.mount(container) {
                return false;
            }
        }
        self.bind_header();
        true
    }

    /// Detach from the page and release the header listener. The table can
    /// be rendered again afterwards.
    pub fn remove(&self) {
        let mut state = self.shared.write_state();
        let TableState {
            view, controller, ..
        } = &mut *state;
        controller.unbind(view);
        view.unmount();
    }

    /// Detach, release the listener, free every node and drop pending
    /// click refreshes. Later loads resolve as superseded.
    pub fn destroy(&self) {
        {
            let mut state = self.shared.write_state();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            let TableState {
                view, controller, ..
            } = &mut *state;
            controller.unbind(view);
            view.dispose();
        }
        for task in self.shared.lock_pending().drain(..) {
            task.abort();
        }
        log::debug!("table destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.read_state().destroyed
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// First load.
    ///
    /// Remote tables fetch with the current sort. Local tables fetch once
    /// (when a `url` was given) and render the loaded rows sorted by the
    /// current sort; without a `url` the supplied `data` is sorted instead.
    pub async fn initialize(&self) -> Result<RefreshOutcome, Error> {
        let request = {
            let mut state = self.shared.write_state();
            if state.destroyed {
                return Ok(RefreshOutcome::Superseded);
            }
            let sorted = state.controller.sort_state().cloned();
            if !state.source.needs_fetch() {
                state.show_local(sorted.as_ref())?;
                return Ok(RefreshOutcome::Applied);
            }
            state.begin_load(sorted.as_ref())
        };
        self.load(request).await
    }

    /// Re-order for `sort`: in memory for local tables, by re-fetching for
    /// remote ones.
    ///
    /// Only the most recently issued remote refresh is ever rendered; an
    /// older response resolves as [`RefreshOutcome::Superseded`]. On failure
    /// the previous rows stay on screen.
    pub async fn refresh(&self, sort: SortState) -> Result<RefreshOutcome, Error> {
        let request = {
            let mut state = self.shared.write_state();
            if state.destroyed {
                return Ok(RefreshOutcome::Superseded);
            }
            validate_sort_target(state.view.columns(), &sort.column_id)?;
            if state.source.mode() == Mode::Local {
                state.show_local(Some(&sort))?;
                return Ok(RefreshOutcome::Applied);
            }
            state.begin_load(Some(&sort))
        };
        self.load(request).await
    }

    async fn load(&self, request: Request) -> Result<RefreshOutcome, Error> {
        let fetched = self
            .shared
            .fetcher
            .fetch_json(&request.url)
            .await
            .and_then(decode_rows);

        let mut state = self.shared.write_state();
        state.source.settle(request.seq);
        let still_loading = state.source.in_flight() > 0;
        state.view.set_loading(still_loading);
        if state.destroyed {
            return Ok(RefreshOutcome::Superseded);
        }

        let rows = match fetched {
            Ok(rows) => rows,
            Err(err) if state.source.is_latest(request.seq) => {
                log::warn!("load of {} failed: {err}", request.url);
                return Err(err.into());
            }
            Err(err) => {
                log::warn!("superseded load of {} failed: {err}", request.url);
                return Ok(RefreshOutcome::Superseded);
            }
        };

        if !state.source.accept(request.seq, rows) {
            return Ok(RefreshOutcome::Superseded);
        }
        match state.source.mode() {
            Mode::Remote => state.view.replace_body(state.source.displayed()),
            Mode::Local => {
                let sorted = state.controller.sort_state().cloned();
                state.show_local(sorted.as_ref())?;
            }
        }
        log::debug!("rendered {} row(s) from #{}", state.source.displayed().len(), request.seq);
        Ok(RefreshOutcome::Applied)
    }

    /// Wait for every refresh started by a header click.
    pub async fn settled(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.shared.lock_pending());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                let _ = task.await;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Synchronously re-order the rows already held and re-render the body.
    ///
    /// Never fetches. Any remote response still in flight is discarded so
    /// it cannot overwrite this order.
    pub fn sort(&self, column_id: &str, direction: SortDirection) -> Result<(), Error> {
        let mut guard = self.shared.write_state();
        let state = &mut *guard;
        if state.destroyed {
            return Ok(());
        }
        validate_sort_target(state.view.columns(), column_id)?;
        state
            .source
            .sort_now(state.view.columns(), &SortState::new(column_id, direction))?;
        state.view.replace_body(state.source.displayed());
        Ok(())
    }

    fn bind_header(&self) {
        let weak = Arc::downgrade(&self.shared);
        let mut state = self.shared.write_state();
        let TableState {
            view, controller, ..
        } = &mut *state;
        controller.bind(view, move |event| {
            if let Some(shared) = weak.upgrade() {
                SortableTable { shared }.on_header_event(event);
            }
        });
    }

    fn on_header_event(&self, event: &Event) {
        if event.button() != MouseButton::Left {
            return;
        }
        let runtime = Handle::try_current().ok();

        let mut state = self.shared.write_state();
        if state.destroyed {
            return;
        }
        let next = {
            let TableState {
                view, controller, ..
            } = &mut *state;
            match controller.on_header_event(view, event.target()) {
                ClickOutcome::Sorted(next) => next,
                ClickOutcome::Missed | ClickOutcome::NotSortable(_) => return,
            }
        };

        match state.source.mode() {
            Mode::Local => {
                if let Err(err) = state.show_local(Some(&next)) {
                    state.record_error(&err.into());
                }
            }
            Mode::Remote => {
                let Some(runtime) = runtime else {
                    log::warn!(
                        "no async runtime; refresh for {} {} not started",
                        next.column_id,
                        next.direction
                    );
                    return;
                };
                // Ticket order must follow click order, not task start order.
                let request = state.begin_load(Some(&next));
                drop(state);
                self.spawn_load(&runtime, request);
            }
        }
    }

    fn spawn_load(&self, runtime: &Handle, request: Request) {
        let table = self.clone();
        let task = runtime.spawn(async move {
            if let Err(err) = table.load(request).await {
                table.shared.write_state().record_error(&err);
            }
        });

        let mut pending = self.shared.lock_pending();
        pending.retain(|t| !t.is_finished());
        pending.push(task);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn document(&self) -> Document {
        self.shared.read_state().view.document().clone()
    }

    /// Root node of the table.
    pub fn element(&self) -> NodeId {
        self.shared.read_state().view.element()
    }

    pub fn sub_elements(&self) -> SubElements {
        self.shared.read_state().view.sub_elements()
    }

    pub fn header_cell(&self, column_id: &str) -> Option<NodeId> {
        self.shared.read_state().view.header_cell(column_id)
    }

    /// Header cell currently showing the sort indicator.
    pub fn sorted_cell(&self) -> Option<NodeId> {
        self.shared.read_state().view.sorted_cell()
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.shared.read_state().controller.sort_state().cloned()
    }

    pub fn mode(&self) -> Mode {
        self.shared.read_state().source.mode()
    }

    /// Rows in the order currently rendered.
    pub fn rows(&self) -> Vec<Row> {
        self.shared.read_state().source.displayed().to_vec()
    }

    pub fn row_count(&self) -> usize {
        self.shared.read_state().view.row_count()
    }

    pub fn fetch_url(&self) -> Url {
        self.shared.read_state().source.target().url().clone()
    }

    /// Set an extra query parameter (a filter, a page range) sent with every
    /// later load. `_sort` and `_order` are managed by the table.
    pub fn set_fetch_param(&self, key: &str, value: &str) {
        self.shared
            .write_state()
            .source
            .target_mut()
            .set_param(key, value);
    }

    pub fn is_loading(&self) -> bool {
        self.shared.read_state().view.is_loading()
    }

    /// Message of the last failed click-driven refresh.
    pub fn last_error(&self) -> Option<String> {
        self.shared.read_state().last_error.clone()
    }

    pub fn to_html(&self) -> Option<String> {
        self.shared.read_state().view.to_html()
    }
}

/// A sort target must exist and be marked sortable.
fn validate_sort_target(columns: &[Column], column_id: &str) -> Result<(), ConfigurationError> {
    let column = find_column(columns, column_id)
        .ok_or_else(|| ConfigurationError::UnknownColumn(column_id.to_string()))?;
    if !column.sortable {
        return Err(ConfigurationError::NotSortable(column_id.to_string()));
    }
    Ok(())
}
