use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one fetch started through [`FetchGeneration::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Monotonic request counter. Only the most recently started fetch may
/// publish its result; anything that resolves after a newer fetch began is
/// dropped.
#[derive(Debug, Default)]
pub struct FetchGeneration {
    latest: AtomicU64,
}

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Writes `value` into `target` if `ticket` is still the newest fetch.
    pub fn apply<T>(&self, ticket: FetchTicket, value: T, target: &mut T) -> bool {
        if self.is_current(ticket) {
            *target = value;
            true
        } else {
            tracing::debug!("discarding stale fetch result (generation {})", ticket.0);
            false
        }
    }
}
