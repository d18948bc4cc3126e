//! Single in-flight operation guard
//!
//! A flow runs at most one remote operation at a time. Overlapping
//! attempts are rejected instead of queued. Resetting the flow bumps the
//! epoch so a result arriving from before the reset is discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, SigningError};

const IDLE: u64 = 0;

#[derive(Debug, Default)]
pub struct OperationGuard {
    in_flight: AtomicU64,
    next_ticket: AtomicU64,
    epoch: AtomicU64,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard for one operation
    pub fn begin(&self) -> Result<OperationTicket<'_>> {
        let id = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight
            .compare_exchange(IDLE, id, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SigningError::OperationInProgress)?;

        Ok(OperationTicket {
            guard: self,
            id,
            epoch: self.epoch.load(Ordering::SeqCst),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) != IDLE
    }

    /// Invalidate every outstanding ticket and free the guard
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(IDLE, Ordering::SeqCst);
    }
}

/// Proof of owning the guard; released on drop
#[derive(Debug)]
pub struct OperationTicket<'a> {
    guard: &'a OperationGuard,
    id: u64,
    epoch: u64,
}

impl OperationTicket<'_> {
    /// False once the flow was reset after this ticket was issued
    pub fn is_current(&self) -> bool {
        self.guard.epoch.load(Ordering::SeqCst) == self.epoch
    }

    pub fn ensure_current(&self) -> Result<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(SigningError::SessionReset)
        }
    }
}

impl Drop for OperationTicket<'_> {
    fn drop(&mut self) {
        // a ticket from before a reset must not release a newer operation
        let _ = self.guard.in_flight.compare_exchange(
            self.id,
            IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}
