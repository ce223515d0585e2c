//! Data source adapter: local re-sort or remote re-fetch.
//!
//! The adapter owns the row set. In local mode it keeps the loaded rows as
//! an unsorted baseline and derives every displayed order from it. In remote
//! mode every refresh rewrites the fetch target's sort parameters and the
//! server's response is displayed verbatim.
//!
//! Requests are numbered. A response is only applied if no later request
//! has been issued since (remote) or no later load has landed (local).

mod fetch;
mod target;

pub use fetch::*;
pub use target::*;

use url::Url;

use crate::column::Column;
use crate::error::ConfigurationError;
use crate::row::Row;
use crate::sort::{SortState, sort_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Load once, sort in memory.
    Local,
    /// Fetch on every refresh, trust server order.
    Remote,
}

impl Mode {
    pub fn from_sort_locally(is_sort_locally: bool) -> Self {
        if is_sort_locally { Self::Local } else { Self::Remote }
    }
}

/// A request issued by [`DataSource::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub seq: u64,
    pub url: Url,
}

#[derive(Debug)]
pub struct DataSource {
    mode: Mode,
    target: FetchTarget,
    /// Local mode only: whether the first load goes to the network.
    fetch_on_load: bool,
    /// Authoritative rows: the local baseline or the last remote response.
    rows: Vec<Row>,
    /// Rows in the order currently rendered.
    displayed: Vec<Row>,
    loaded: bool,
    latest: u64,
    applied: u64,
    in_flight: usize,
}

impl DataSource {
    pub fn new(mode: Mode, target: FetchTarget, rows: Vec<Row>, fetch_on_load: bool) -> Self {
        Self {
            mode,
            target,
            fetch_on_load,
            displayed: rows.clone(),
            rows,
            loaded: false,
            latest: 0,
            applied: 0,
            in_flight: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> &FetchTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut FetchTarget {
        &mut self.target
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn displayed(&self) -> &[Row] {
        &self.displayed
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether [`initialize`](crate::SortableTable::initialize) has to hit the network.
    pub fn needs_fetch(&self) -> bool {
        match self.mode {
            Mode::Remote => true,
            Mode::Local => self.fetch_on_load && !self.loaded,
        }
    }

    /// Start a request. In remote mode `state` is written to the target
    /// first; both happen under the caller's lock, so no other refresh can
    /// interleave its parameters.
    pub fn issue(&mut self, state: Option<&SortState>) -> Request {
        if self.mode == Mode::Remote
            && let Some(state) = state
        {
            self.target.set_sort(state);
        }
        self.latest += 1;
        self.in_flight += 1;
        log::debug!("request #{} -> {}", self.latest, self.target);
        Request {
            seq: self.latest,
            url: self.target.url().clone(),
        }
    }

    /// Mark a request as finished, whether or not it was applied.
    pub fn settle(&mut self, seq: u64) {
        self.in_flight = self.in_flight.saturating_sub(1);
        log::trace!("request #{seq} settled, {} in flight", self.in_flight);
    }

    /// Invalidate every request issued so far.
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Store a response. Returns `false` if the response was superseded.
    pub fn accept(&mut self, seq: u64, rows: Vec<Row>) -> bool {
        let fresh = match self.mode {
            Mode::Remote => seq == self.latest,
            Mode::Local => seq > self.applied,
        };
        if !fresh {
            log::warn!("discarding superseded response #{seq}");
            return false;
        }

        self.applied = seq;
        self.loaded = true;
        if self.mode == Mode::Remote {
            self.displayed = rows.clone();
        }
        self.rows = rows;
        true
    }

    /// Reorder the baseline with the sort engine and display the result.
    pub fn sort_local(&mut self, columns: &[Column], state: &SortState) -> Result<(), ConfigurationError> {
        self.displayed = sort_rows(columns, &self.rows, &state.column_id, state.direction)?;
        Ok(())
    }

    /// Like [`sort_local`](Self::sort_local), and also drops any response
    /// still in flight so it cannot overwrite this order.
    pub fn sort_now(&mut self, columns: &[Column], state: &SortState) -> Result<(), ConfigurationError> {
        self.sort_local(columns, state)?;
        self.supersede();
        Ok(())
    }

    /// Display the authoritative rows as they are.
    pub fn display_unsorted(&mut self) {
        self.displayed = self.rows.clone();
    }
}
