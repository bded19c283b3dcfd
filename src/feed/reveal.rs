/// Progressive reveal of the feed
///
/// The grid shows a prefix of the derived feed that grows one page at a
/// time. Two things grow it:
/// - a one-shot timer armed on every reset
/// - the trailing sentinel scrolling into view
///
/// Both are represented by handles issued by the controller. A reset
/// invalidates every handle issued before it, so a timer or sentinel event
/// that arrives late for an old query is ignored.

use tracing::trace;

use super::view::ViewMode;

/// Default number of photos revealed per batch
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Handle of the pending auto-reveal timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    generation: u64,
}

/// Handle of a sentinel observer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelRegistration {
    generation: u64,
    id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// More photos remain to be shown
    Revealing,
    /// The whole feed is visible
    Complete,
}

#[derive(Debug, Clone)]
pub struct RevealController {
    page_size: usize,
    /// Requested prefix length; may exceed `total`
    budget: usize,
    total: usize,
    mode: ViewMode,
    /// Bumped on every reset
    generation: u64,
    pending_timer: Option<u64>,
    sentinel: Option<u64>,
    next_sentinel_id: u64,
}

impl RevealController {
    /// A page size of 0 is treated as 1
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            budget: page_size,
            total: 0,
            mode: ViewMode::Grid,
            generation: 0,
            pending_timer: None,
            sentinel: None,
            next_sentinel_id: 0,
        }
    }

    /// Number of feed entries currently shown in the grid
    pub fn visible_count(&self) -> usize {
        self.budget.min(self.total)
    }

    pub fn phase(&self) -> RevealPhase {
        if self.budget >= self.total {
            RevealPhase::Complete
        } else {
            RevealPhase::Revealing
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == RevealPhase::Complete
    }

    /// Reset after the category, tab, shuffle epoch or view mode changed.
    ///
    /// Shows the first page again, cancels the pending timer, drops the
    /// sentinel registration and arms a new timer. The caller scrolls the
    /// viewport back to the top.
    pub fn on_query_changed(&mut self, total: usize, mode: ViewMode) -> TimerTicket {
        self.generation += 1;
        self.budget = self.page_size;
        self.total = total;
        self.mode = mode;
        self.pending_timer = Some(self.generation);
        self.sentinel = None;

        trace!(generation = self.generation, total, ?mode, "reveal reset");
        TimerTicket { generation: self.generation }
    }

    /// The feed length changed without a reset (photo added or removed)
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// The auto-reveal timer fired. Returns whether more photos became
    /// visible.
    pub fn on_timer_elapsed(&mut self, ticket: TimerTicket) -> bool {
        if self.pending_timer != Some(ticket.generation) {
            trace!(generation = ticket.generation, "stale reveal timer ignored");
            return false;
        }

        self.pending_timer = None;
        self.advance()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer.is_some()
    }

    /// Register an observer for the trailing sentinel.
    ///
    /// Returns `None` in map mode or when nothing is left to reveal.
    /// An existing live registration is returned unchanged.
    pub fn observe_sentinel(&mut self) -> Option<SentinelRegistration> {
        if self.mode != ViewMode::Grid || self.is_complete() {
            self.sentinel = None;
            return None;
        }

        let id = match self.sentinel {
            Some(id) => id,
            None => {
                self.next_sentinel_id += 1;
                self.sentinel = Some(self.next_sentinel_id);
                self.next_sentinel_id
            }
        };

        Some(SentinelRegistration { generation: self.generation, id })
    }

    /// Tear down the sentinel observer (leaving grid mode, closing the view)
    pub fn release_sentinel(&mut self) {
        self.sentinel = None;
    }

    #[cfg(test)]
    pub fn is_observing(&self) -> bool {
        self.sentinel.is_some()
    }

    /// The sentinel scrolled into view. Returns whether more photos became
    /// visible.
    pub fn on_sentinel_visible(&mut self, registration: SentinelRegistration) -> bool {
        let live = registration.generation == self.generation && self.sentinel == Some(registration.id);
        if !live || self.mode != ViewMode::Grid {
            trace!(id = registration.id, "stale sentinel event ignored");
            return false;
        }

        let advanced = self.advance();
        if self.is_complete() {
            self.sentinel = None;
        }
        advanced
    }

    fn advance(&mut self) -> bool {
        let before = self.visible_count();
        self.budget = (self.budget + self.page_size).min(self.total).max(self.budget);
        let advanced = self.visible_count() > before;

        if advanced {
            trace!(visible = self.visible_count(), total = self.total, "revealed next page");
        }
        advanced
    }
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
