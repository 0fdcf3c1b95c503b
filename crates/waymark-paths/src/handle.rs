use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use waymark_core::CancelToken;

use crate::SearchError;

/// Lifecycle of one asynchronous search. Terminal states are final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SearchState {
    /// Queued, not yet picked up by a worker.
    Idle = 0,
    Expanding = 1,
    Succeeded = 2,
    Failed = 3,
    Cancelled = 4,
}

impl SearchState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SearchState::Idle,
            1 => SearchState::Expanding,
            2 => SearchState::Succeeded,
            3 => SearchState::Failed,
            _ => SearchState::Cancelled,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SearchState::Succeeded | SearchState::Failed | SearchState::Cancelled
        )
    }
}

/// Caller's side of an asynchronous search.
///
/// Cancelling is cooperative: a search that already finished keeps its
/// outcome, one that has not delivered yet delivers nothing.
#[derive(Clone, Debug)]
pub struct SearchHandle {
    token: CancelToken,
    state: Arc<AtomicU8>,
}

impl SearchHandle {
    pub(crate) fn new(token: CancelToken) -> Self {
        Self {
            token,
            state: Arc::new(AtomicU8::new(SearchState::Idle as u8)),
        }
    }

    /// Stop the search. Also stops every other search sharing the engine
    /// this handle came from.
    pub fn cancel(&self) {
        self.token.cancel();
        if !self.transition(SearchState::Idle, SearchState::Cancelled) {
            self.transition(SearchState::Expanding, SearchState::Cancelled);
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.state() == SearchState::Cancelled
    }

    pub fn state(&self) -> SearchState {
        SearchState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// The token this search observes.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    fn transition(&self, from: SearchState, to: SearchState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Worker side: claim the search. Fails if it was cancelled while queued.
    pub(crate) fn begin(&self) -> bool {
        if self.token.is_cancelled() {
            self.transition(SearchState::Idle, SearchState::Cancelled);
            return false;
        }
        self.transition(SearchState::Idle, SearchState::Expanding)
    }

    /// Worker side: settle the outcome, then hand it to exactly one callback
    /// unless cancellation won the race.
    pub(crate) fn settle<T>(
        &self,
        result: Result<T, SearchError>,
        on_ok: impl FnOnce(T),
        on_err: impl FnOnce(SearchError),
    ) {
        let cancelled = self.token.is_cancelled();
        match result {
            Ok(value) if !cancelled => {
                if self.transition(SearchState::Expanding, SearchState::Succeeded) {
                    on_ok(value);
                }
            }
            Err(err) if !cancelled && err != SearchError::Cancelled => {
                if self.transition(SearchState::Expanding, SearchState::Failed) {
                    log::debug!("search failed: {err}");
                    on_err(err);
                }
            }
            _ => {
                self.transition(SearchState::Expanding, SearchState::Cancelled);
            }
        }
    }
}
