//! Viewer state machine.
//!
//! The viewer moves `Idle → Loading → Rendered | Errored` and re-enters
//! `Loading` whenever the user searches, pages, sorts or presses an arrow key.
//! Each fetch carries a sequence number; only the response to the latest one
//! is applied, so a slow response can never overwrite a newer page.
//!
//! Page, sort, arrow and refresh triggers are dropped while a fetch is in
//! flight. A search change always applies, since it supersedes whatever is
//! loading.

use crate::query::{Pagination, SortOrder, TableQuery};

/// Shown when the request exceeded its time limit.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Shown when the request was aborted before completing.
pub const ABORT_MESSAGE: &str = "Request was cancelled.";

/// Shown for any other transport failure.
pub const NETWORK_MESSAGE: &str = "An error occurred while loading table data. Please try again.";

/// Minimum search length for highlighting matches.
pub const HIGHLIGHT_MIN_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Idle,
    Loading,
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    Search(String),
    GotoPage(u64),
    SortBy(String),
    Arrow(Direction),
    Refresh,
}

/// A fetch the caller must perform and report back via [`ViewerState::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: TableQuery,
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    query: TableQuery,
    phase: ViewerPhase,
    seq: u64,
    pagination: Option<Pagination>,
    error: Option<String>,
}

impl ViewerState {
    pub fn new(query: TableQuery) -> Self {
        Self {
            query,
            phase: ViewerPhase::Idle,
            seq: 0,
            pagination: None,
            error: None,
        }
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ViewerPhase::Loading
    }

    /// Sequence number of the latest issued fetch (0 before the first).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Pagination of the last rendered page; `None` when errored.
    pub fn pagination(&self) -> Option<&Pagination> {
        match self.phase {
            ViewerPhase::Errored => None,
            _ => self.pagination.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn total_pages(&self) -> u64 {
        self.pagination.map(|p| p.total_pages).unwrap_or(0)
    }

    /// Start the initial load.
    pub fn begin(&mut self) -> FetchTicket {
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.seq += 1;
        self.phase = ViewerPhase::Loading;
        FetchTicket {
            seq: self.seq,
            query: self.query.clone(),
        }
    }

    /// The query `event` would produce, without changing state.
    ///
    /// Loading is ignored here so that controls rendered for a page can carry
    /// their targets.
    pub fn preview(&self, event: &ViewerEvent) -> Option<TableQuery> {
        let mut next = self.clone();
        if next.phase == ViewerPhase::Loading {
            next.phase = ViewerPhase::Rendered;
        }
        next.handle(event.clone()).map(|ticket| ticket.query)
    }

    /// Apply a user event. Returns a ticket when a fetch must be issued.
    pub fn handle(&mut self, event: ViewerEvent) -> Option<FetchTicket> {
        match event {
            ViewerEvent::Search(term) => {
                let term = term.trim().to_string();
                if term == self.query.search {
                    return None;
                }
                self.query.search = term;
                self.query.page = 1;
                Some(self.issue())
            }
            _ if self.is_loading() => None,
            ViewerEvent::GotoPage(page) => {
                if page < 1 || page > self.total_pages() || page == self.query.page {
                    return None;
                }
                self.query.page = page;
                Some(self.issue())
            }
            ViewerEvent::SortBy(column) => {
                if column.is_empty() {
                    return None;
                }
                if column == self.query.orderby {
                    self.query.order = self.query.order.toggled();
                } else {
                    self.query.orderby = column;
                    self.query.order = SortOrder::Asc;
                }
                self.query.page = 1;
                Some(self.issue())
            }
            ViewerEvent::Arrow(Direction::Prev) => {
                let page = self.query.page.saturating_sub(1);
                self.handle(ViewerEvent::GotoPage(page))
            }
            ViewerEvent::Arrow(Direction::Next) => {
                let page = self.query.page + 1;
                self.handle(ViewerEvent::GotoPage(page))
            }
            ViewerEvent::Refresh => Some(self.issue()),
        }
    }

    /// Apply the outcome of fetch `seq`. Returns `false` for a stale response,
    /// which leaves the state untouched.
    pub fn complete(&mut self, seq: u64, outcome: Result<Pagination, String>) -> bool {
        if seq != self.seq || self.phase != ViewerPhase::Loading {
            return false;
        }
        match outcome {
            Ok(pagination) => {
                self.pagination = Some(pagination);
                self.error = None;
                self.phase = ViewerPhase::Rendered;
            }
            Err(message) => {
                self.error = Some(message);
                self.phase = ViewerPhase::Errored;
            }
        }
        true
    }

    /// Whether matches of the current search should be highlighted.
    pub fn highlights(&self) -> bool {
        self.query.search.chars().count() >= HIGHLIGHT_MIN_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(total_items: u64) -> ViewerState {
        let mut state = ViewerState::new(TableQuery::default());
        let ticket = state.begin();
        let pagination = Pagination::compute(&ticket.query, total_items);
        assert!(state.complete(ticket.seq, Ok(pagination)));
        state
    }

    fn finish(state: &mut ViewerState, ticket: &FetchTicket, total_items: u64) {
        let pagination = Pagination::compute(&ticket.query, total_items);
        assert!(state.complete(ticket.seq, Ok(pagination)));
    }

    #[test]
    fn initial_load_renders() {
        let state = rendered(45);
        assert_eq!(state.phase(), ViewerPhase::Rendered);
        assert_eq!(state.pagination().unwrap().total_pages, 3);
    }

    #[test]
    fn page_clicks_are_bounded() {
        let mut state = rendered(45);
        assert!(state.handle(ViewerEvent::GotoPage(1)).is_none());
        assert!(state.handle(ViewerEvent::GotoPage(0)).is_none());
        assert!(state.handle(ViewerEvent::GotoPage(4)).is_none());
        let ticket = state.handle(ViewerEvent::GotoPage(3)).unwrap();
        assert_eq!(ticket.query.page, 3);
        assert_eq!(ticket.query.offset(), 40);
    }

    #[test]
    fn triggers_are_dropped_while_loading() {
        let mut state = rendered(45);
        let ticket = state.handle(ViewerEvent::GotoPage(2)).unwrap();
        assert!(state.is_loading());
        assert!(state.handle(ViewerEvent::GotoPage(3)).is_none());
        assert!(state.handle(ViewerEvent::SortBy("id".into())).is_none());
        assert!(state.handle(ViewerEvent::Arrow(Direction::Next)).is_none());
        assert!(state.handle(ViewerEvent::Refresh).is_none());
        finish(&mut state, &ticket, 45);
        assert_eq!(state.query().page, 2);
    }

    #[test]
    fn sorting_toggles_and_resets_page() {
        let mut state = rendered(45);
        let ticket = state.handle(ViewerEvent::GotoPage(2)).unwrap();
        finish(&mut state, &ticket, 45);

        let ticket = state.handle(ViewerEvent::SortBy("name".into())).unwrap();
        assert_eq!(ticket.query.orderby, "name");
        assert_eq!(ticket.query.order, SortOrder::Asc);
        assert_eq!(ticket.query.page, 1);
        finish(&mut state, &ticket, 45);

        let ticket = state.handle(ViewerEvent::SortBy("name".into())).unwrap();
        assert_eq!(ticket.query.order, SortOrder::Desc);
        finish(&mut state, &ticket, 45);

        let ticket = state.handle(ViewerEvent::SortBy("id".into())).unwrap();
        assert_eq!(ticket.query.orderby, "id");
        assert_eq!(ticket.query.order, SortOrder::Asc);
    }

    #[test]
    fn arrows_stop_at_the_edges() {
        let mut state = rendered(30);
        assert!(state.handle(ViewerEvent::Arrow(Direction::Prev)).is_none());
        let ticket = state.handle(ViewerEvent::Arrow(Direction::Next)).unwrap();
        assert_eq!(ticket.query.page, 2);
        finish(&mut state, &ticket, 30);
        assert!(state.handle(ViewerEvent::Arrow(Direction::Next)).is_none());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut state = rendered(100);
        let first = state.handle(ViewerEvent::Search("ab".into())).unwrap();
        let second = state.handle(ViewerEvent::Search("abc".into())).unwrap();
        assert!(second.seq > first.seq);

        let stale = Pagination::compute(&first.query, 50);
        assert!(!state.complete(first.seq, Ok(stale)));
        assert!(state.is_loading());

        finish(&mut state, &second, 7);
        assert_eq!(state.query().search, "abc");
        assert_eq!(state.pagination().unwrap().total_items, 7);
    }

    #[test]
    fn search_resets_page_and_ignores_repeats() {
        let mut state = rendered(100);
        let ticket = state.handle(ViewerEvent::GotoPage(4)).unwrap();
        finish(&mut state, &ticket, 100);

        let ticket = state.handle(ViewerEvent::Search("  foo ".into())).unwrap();
        assert_eq!(ticket.query.search, "foo");
        assert_eq!(ticket.query.page, 1);
        finish(&mut state, &ticket, 3);
        assert!(state.handle(ViewerEvent::Search("foo".into())).is_none());
    }

    #[test]
    fn errors_hide_pagination() {
        let mut state = rendered(100);
        let ticket = state.handle(ViewerEvent::Refresh).unwrap();
        assert!(state.complete(ticket.seq, Err(TIMEOUT_MESSAGE.to_string())));
        assert_eq!(state.phase(), ViewerPhase::Errored);
        assert_eq!(state.error(), Some(TIMEOUT_MESSAGE));
        assert!(state.pagination().is_none());
    }

    #[test]
    fn preview_does_not_mutate() {
        let state = rendered(100);
        let target = state.preview(&ViewerEvent::GotoPage(2)).unwrap();
        assert_eq!(target.page, 2);
        assert_eq!(state.query().page, 1);
        assert_eq!(state.seq(), 1);
    }

    #[test]
    fn highlight_needs_two_characters() {
        let mut state = ViewerState::new(TableQuery::default());
        state.handle(ViewerEvent::Search("a".into()));
        assert!(!state.highlights());
        state.handle(ViewerEvent::Search("ab".into()));
        assert!(state.highlights());
    }
}
