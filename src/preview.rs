//! Latest-wins coordination for live previews
//!
//! Every edit requests a new preview. Renders run wherever the caller likes
//! and may finish out of order; only the newest request's result is ever
//! applied to the shared slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle for one requested preview
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl PreviewTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A newer request exists; the worker may stop early
    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }
}

/// What `complete` did with a finished preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: T,
}

/// Issues preview tickets and holds the most recently applied result
#[derive(Debug)]
pub struct PreviewCoordinator<T> {
    latest: Arc<AtomicU64>,
    slot: Mutex<Option<Slot<T>>>,
}

impl<T> Default for PreviewCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PreviewCoordinator<T> {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            slot: Mutex::new(None),
        }
    }

    /// Start a new preview, superseding every earlier ticket
    pub fn request(&self) -> PreviewTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        PreviewTicket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Apply `value` if `ticket` is still the newest request
    pub fn complete(&self, ticket: &PreviewTicket, value: T) -> Completion {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let stale_slot = slot
            .as_ref()
            .is_some_and(|current| current.generation >= ticket.generation);
        if ticket.is_superseded() || stale_slot {
            tracing::debug!("discarding superseded preview {}", ticket.generation);
            return Completion::Discarded;
        }
        *slot = Some(Slot {
            generation: ticket.generation,
            value,
        });
        Completion::Applied
    }

    /// Generation of the applied preview, if any
    pub fn applied_generation(&self) -> Option<u64> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.generation)
    }

    /// Run `f` against the applied preview
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(slot.as_ref().map(|s| &s.value))
    }
}

impl<T: Clone> PreviewCoordinator<T> {
    /// Clone of the applied preview
    pub fn current(&self) -> Option<T> {
        self.with_current(|v| v.cloned())
    }
}
