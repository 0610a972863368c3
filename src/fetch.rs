//! Guards against out-of-order completion of asynchronous fetches.
//!
//! Each fetch takes a [`Ticket`] from its slot's [`Generation`] before it starts; only the
//! response carrying the latest ticket is allowed to update state.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Generation {
    current: AtomicU64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating every ticket handed out before
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

/// Caller-owned "reload" counter; bumping it asks a mounted form to re-fetch its record
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reload(u64);

impl Reload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self) -> Self {
        self.0 += 1;
        *self
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Generation, Reload};

    #[test]
    fn test_only_latest_ticket_is_current() {
        let generation = Generation::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_reload_bump() {
        let mut reload = Reload::new();
        assert_eq!(reload.value(), 0);
        assert_eq!(reload.bump(), reload);
        assert_eq!(reload.value(), 1);
    }
}
