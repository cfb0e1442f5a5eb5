//! Cooperative cancellation for in-flight searches.
//!
//! A new search replaces any outstanding one: the caller cancels the old
//! token and hands a fresh clone of the new one through every network-call
//! boundary. Stages check the token before each external call and unwind
//! with `NeurolitError::Cancelled` so a stale response can never overwrite
//! current state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{NeurolitError, Result};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` if the token has been cancelled.
    /// Call before every external request.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(NeurolitError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_passes_checkpoint() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.checkpoint().is_ok());
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(
            clone.checkpoint(),
            Err(NeurolitError::Cancelled)
        ));
    }
}
