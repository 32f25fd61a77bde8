//! Trailing-debounce search as an explicit state machine.
//!
//! Two monotonic counters do all the bookkeeping: `generation` identifies the
//! latest keystroke (a debounce ticket is only honoured if nothing was typed
//! after it) and `issued` identifies the latest dispatched request (a response
//! is only applied if no newer request was issued after it).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    Pending,
    Resolved,
    Failed,
}

/// Handed out per keystroke; redeemed when the quiet period elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
    query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    seq: u64,
    query: String,
}

impl SearchRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// A newer keystroke or action replaced this one; do nothing.
    Superseded,
    /// Query too short: show the unfiltered collection, skip the network.
    Reset,
    Dispatch(SearchRequest),
}

#[derive(Debug, Clone)]
pub struct SearchController {
    min_len: usize,
    generation: u64,
    issued: u64,
    phase: SearchPhase,
}

impl SearchController {
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len,
            generation: 0,
            issued: 0,
            phase: SearchPhase::Idle,
        }
    }

    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    pub fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.min_len
    }

    /// Restarts the quiet period. Any earlier ticket becomes stale.
    pub fn keystroke(&mut self, query: &str) -> DebounceTicket {
        self.generation += 1;
        self.phase = SearchPhase::Debouncing;
        DebounceTicket {
            generation: self.generation,
            query: query.to_string(),
        }
    }

    pub fn debounce_elapsed(&mut self, ticket: &DebounceTicket) -> SearchStep {
        if ticket.generation != self.generation {
            return SearchStep::Superseded;
        }
        self.issue(&ticket.query)
    }

    /// Immediate lookup, bypassing the quiet period. Also cancels a pending
    /// debounce so its ticket cannot fire afterwards.
    pub fn search_now(&mut self, query: &str) -> SearchStep {
        self.generation += 1;
        self.issue(query)
    }

    fn issue(&mut self, query: &str) -> SearchStep {
        // A reset is a newer outcome than any request still in flight.
        self.issued += 1;
        if !self.is_searchable(query) {
            self.phase = SearchPhase::Idle;
            return SearchStep::Reset;
        }
        self.phase = SearchPhase::Pending;
        SearchStep::Dispatch(SearchRequest {
            seq: self.issued,
            query: query.to_string(),
        })
    }

    pub fn is_current(&self, request: &SearchRequest) -> bool {
        request.seq == self.issued
    }

    /// Records the outcome of `request`. Returns false, leaving the phase
    /// alone, when the request is stale.
    pub fn settle(&mut self, request: &SearchRequest, succeeded: bool) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.phase = if succeeded {
            SearchPhase::Resolved
        } else {
            SearchPhase::Failed
        };
        true
    }

    /// Invalidates pending tickets and in-flight requests. Used when another
    /// action takes over the filtered slot.
    pub fn supersede(&mut self) {
        self.generation += 1;
        self.issued += 1;
        self.phase = SearchPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dispatched(step: SearchStep) -> SearchRequest {
        match step {
            SearchStep::Dispatch(request) => request,
            other => panic!("expected a dispatch, got {other:?}"),
        }
    }

    #[test]
    fn only_the_last_keystroke_dispatches() {
        let mut search = SearchController::new(2);
        let li = search.keystroke("li");
        let lib = search.keystroke("lib");

        assert_eq!(search.debounce_elapsed(&li), SearchStep::Superseded);
        let request = dispatched(search.debounce_elapsed(&lib));
        assert_eq!(request.query(), "lib");
        assert_eq!(search.phase(), &SearchPhase::Pending);
    }

    #[test]
    fn short_queries_reset_without_dispatch() {
        let mut search = SearchController::new(2);
        let ticket = search.keystroke("l");
        assert_eq!(search.debounce_elapsed(&ticket), SearchStep::Reset);
        assert_eq!(search.search_now(""), SearchStep::Reset);
        assert_eq!(search.phase(), &SearchPhase::Idle);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let search = SearchController::new(2);
        assert!(!search.is_searchable("é"));
        assert!(search.is_searchable("éa"));
    }

    #[test]
    fn newer_request_makes_older_response_stale() {
        let mut search = SearchController::new(2);
        let first = dispatched(search.search_now("caf"));
        let second = dispatched(search.search_now("cafe"));

        assert!(!search.settle(&first, true));
        assert_eq!(search.phase(), &SearchPhase::Pending);
        assert!(search.settle(&second, false));
        assert_eq!(search.phase(), &SearchPhase::Failed);
    }

    #[test]
    fn reset_outdates_in_flight_request() {
        let mut search = SearchController::new(2);
        let request = dispatched(search.search_now("gym"));
        assert_eq!(search.search_now("g"), SearchStep::Reset);
        assert!(!search.is_current(&request));
    }

    #[test]
    fn search_now_cancels_pending_debounce() {
        let mut search = SearchController::new(2);
        let ticket = search.keystroke("hall");
        dispatched(search.search_now("hostel"));
        assert_eq!(search.debounce_elapsed(&ticket), SearchStep::Superseded);
    }

    #[test]
    fn supersede_invalidates_everything() {
        let mut search = SearchController::new(2);
        let request = dispatched(search.search_now("hall"));
        let ticket = search.keystroke("hostel");

        search.supersede();

        assert!(!search.is_current(&request));
        assert_eq!(search.debounce_elapsed(&ticket), SearchStep::Superseded);
        assert_eq!(search.phase(), &SearchPhase::Idle);
    }
}
