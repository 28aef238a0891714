//! Page cursor sequencing.
//!
//! [`PageCursor`] holds the position of a paginated feed:
//! - The key to request next (opaque, caller-defined)
//! - Whether the last page signalled end-of-data
//! - A reset generation, so a fetch started before `reset()` cannot move
//!   the cursor after it
//!
//! The async paginator in `feed-client` wraps this type; keeping it pure
//! makes the last-reset-wins rule testable without a runtime.

/// Position of a paginated feed.
#[derive(Debug, Clone)]
pub struct PageCursor<K> {
    /// Key restored by `reset()`.
    initial: K,
    /// Key for the next request.
    current: K,
    /// Set when a short page was received.
    end_reached: bool,
    /// Incremented on every reset.
    generation: u64,
}

/// Snapshot taken when a fetch starts.
///
/// Committing a ticket whose generation is stale is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket<K> {
    /// Key the fetch was issued with.
    pub key: K,
    generation: u64,
}

impl<K: Clone> PageCursor<K> {
    /// Create a cursor positioned at `initial`.
    pub fn new(initial: K) -> Self {
        Self {
            current: initial.clone(),
            initial,
            end_reached: false,
            generation: 0,
        }
    }

    /// Key the next fetch will use.
    pub fn current(&self) -> &K {
        &self.current
    }

    /// Key restored by `reset()`.
    pub fn initial(&self) -> &K {
        &self.initial
    }

    /// Whether the feed reported no more pages.
    pub fn is_end_reached(&self) -> bool {
        self.end_reached
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Take a ticket for a fetch starting now.
    pub fn checkout(&self) -> PageTicket<K> {
        PageTicket {
            key: self.current.clone(),
            generation: self.generation,
        }
    }

    /// Whether `ticket` was taken before the latest reset.
    pub fn is_stale(&self, ticket: &PageTicket<K>) -> bool {
        ticket.generation != self.generation
    }

    /// Advance to `next` after a fetch completed.
    ///
    /// Returns `false` (and changes nothing) when the cursor was reset while
    /// the fetch was in flight.
    pub fn commit(&mut self, ticket: &PageTicket<K>, next: K, end_reached: bool) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        self.current = next;
        self.end_reached = end_reached;
        true
    }

    /// Restore the initial key and clear end-of-data.
    ///
    /// Does not touch any cache; callers clear their own data if needed.
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
        self.end_reached = false;
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_key() {
        let cursor = PageCursor::new(1u32);
        assert_eq!(*cursor.current(), 1);
        assert!(!cursor.is_end_reached());
    }

    #[test]
    fn commit_advances() {
        let mut cursor = PageCursor::new(1u32);
        let ticket = cursor.checkout();
        assert_eq!(ticket.key, 1);

        assert!(cursor.commit(&ticket, 2, false));
        assert_eq!(*cursor.current(), 2);
    }

    #[test]
    fn commit_records_end_of_data() {
        let mut cursor = PageCursor::new(0u64);
        let ticket = cursor.checkout();
        cursor.commit(&ticket, 5, true);
        assert!(cursor.is_end_reached());
    }

    #[test]
    fn reset_restores_initial_and_clears_end() {
        let mut cursor = PageCursor::new(1u32);
        let ticket = cursor.checkout();
        cursor.commit(&ticket, 9, true);

        cursor.reset();

        assert_eq!(*cursor.current(), 1);
        assert!(!cursor.is_end_reached());
        assert_eq!(cursor.generation(), 1);
    }

    #[test]
    fn stale_ticket_does_not_move_cursor() {
        let mut cursor = PageCursor::new(1u32);
        let in_flight = cursor.checkout();

        // Reset while the fetch is outstanding
        cursor.reset();

        assert!(cursor.is_stale(&in_flight));
        assert!(!cursor.commit(&in_flight, 2, true));
        assert_eq!(*cursor.current(), 1);
        assert!(!cursor.is_end_reached());
    }

    #[test]
    fn fresh_ticket_after_reset_commits() {
        let mut cursor = PageCursor::new(1u32);
        cursor.reset();
        let ticket = cursor.checkout();
        assert!(cursor.commit(&ticket, 2, false));
        assert_eq!(*cursor.current(), 2);
    }

    #[test]
    fn works_with_string_keys() {
        let mut cursor = PageCursor::new(String::new());
        let ticket = cursor.checkout();
        cursor.commit(&ticket, "after:42".to_string(), false);
        assert_eq!(cursor.current(), "after:42");
        assert_eq!(cursor.initial(), "");
    }
}
