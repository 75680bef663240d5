//! Render targets for creatives.
//!
//! A [`Surface`] stands in for the DOM element an ad view owns. Every
//! render cycle claims a [`RenderTicket`] before it starts waiting on the
//! network; when the result arrives it writes through that ticket.
//!
//! Write rules:
//!
//! - The whole markup is replaced under one lock, so two writes never
//!   interleave.
//! - A write from a ticket older than the one that last wrote is
//!   [`WriteStatus::Stale`] and is dropped (newest claim wins; within one
//!   ticket the last write wins).
//! - After [`Surface::detach`] every write is [`WriteStatus::Detached`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ticket handed out by [`Surface::claim`] for one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(u64);

/// Result of a write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The markup was replaced.
    Applied,
    /// A newer render cycle already wrote; the markup is unchanged.
    Stale,
    /// The surface was torn down; the markup is unchanged.
    Detached,
}

impl WriteStatus {
    /// Whether the write reached the surface.
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    markup: String,
    last_claimed: u64,
    last_written: u64,
    writes: u64,
    detached: bool,
}

/// A shared, cloneable handle to one render target.
#[derive(Debug, Clone)]
pub struct Surface {
    id: Arc<str>,
    state: Arc<Mutex<SurfaceState>>,
}

impl Surface {
    /// Create an empty, attached surface.
    pub fn new(id: &str) -> Self {
        Self {
            id: Arc::from(id),
            state: Arc::new(Mutex::new(SurfaceState::default())),
        }
    }

    /// Identifier of the surface (usually the slot code).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Claim a ticket for a new render cycle.
    pub fn claim(&self) -> RenderTicket {
        let mut state = self.lock();
        state.last_claimed = state.last_claimed.saturating_add(1);
        RenderTicket(state.last_claimed)
    }

    /// Replace the markup if `ticket` is still current.
    pub fn write(&self, ticket: RenderTicket, markup: &str) -> WriteStatus {
        let mut state = self.lock();
        if state.detached {
            return WriteStatus::Detached;
        }
        if ticket.0 < state.last_written {
            return WriteStatus::Stale;
        }
        markup.clone_into(&mut state.markup);
        state.last_written = ticket.0;
        state.writes = state.writes.saturating_add(1);
        WriteStatus::Applied
    }

    /// Tear the surface down; later writes are discarded.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    /// Whether the surface still accepts writes.
    pub fn is_attached(&self) -> bool {
        !self.lock().detached
    }

    /// Current markup.
    pub fn markup(&self) -> String {
        self.lock().markup.clone()
    }

    /// Number of applied writes.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        // The state is plain data; a panic mid-write cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_markup() {
        let surface = Surface::new("slot");
        let ticket = surface.claim();
        assert_eq!(surface.write(ticket, "<p>one</p>"), WriteStatus::Applied);
        assert_eq!(surface.write(ticket, "<p>two</p>"), WriteStatus::Applied);
        assert_eq!(surface.markup(), "<p>two</p>");
        assert_eq!(surface.write_count(), 2);
    }

    #[test]
    fn older_ticket_cannot_overwrite_newer() {
        let surface = Surface::new("slot");
        let old = surface.claim();
        let new = surface.claim();
        assert_eq!(surface.write(new, "fresh"), WriteStatus::Applied);
        assert_eq!(surface.write(old, "late"), WriteStatus::Stale);
        assert_eq!(surface.markup(), "fresh");
    }

    #[test]
    fn older_ticket_may_write_before_newer_arrives() {
        let surface = Surface::new("slot");
        let old = surface.claim();
        let new = surface.claim();
        assert!(surface.write(old, "first").is_applied());
        assert!(surface.write(new, "second").is_applied());
        assert_eq!(surface.markup(), "second");
    }

    #[test]
    fn detached_surface_drops_writes() {
        let surface = Surface::new("slot");
        let ticket = surface.claim();
        assert!(surface.write(ticket, "kept").is_applied());
        surface.detach();
        assert!(!surface.is_attached());
        assert_eq!(surface.write(ticket, "lost"), WriteStatus::Detached);
        assert_eq!(surface.markup(), "kept");
    }

    #[test]
    fn concurrent_writers_never_interleave() {
        let surface = Surface::new("slot");
        let a = "a".repeat(4096);
        let b = "b".repeat(4096);
        let handles: Vec<_> = [a.clone(), b.clone()]
            .into_iter()
            .map(|markup| {
                let surface = surface.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let ticket = surface.claim();
                        surface.write(ticket, &markup);
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }
        let markup = surface.markup();
        assert!(markup == a || markup == b);
    }
}
