/////////////////////////////////////////////////////////////////////////////////////////////
//
// Cooperative cancellation and deadline checks shared by the partitioner and local solves.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Cooperative cancellation for long-running interpolations.
use crate::error::InterpError;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

/// A cloneable flag that asks a running interpolation to stop.
///
/// The interpolator polls the flag between partition scans and before each
/// subdomain solve, so a solve already in progress finishes first.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Cancel token and deadline bundled for polling from worker threads.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopCheck {
    pub(crate) token: Option<CancelToken>,
    pub(crate) deadline: Option<Instant>,
}

impl StopCheck {
    #[inline]
    pub(crate) fn check(&self) -> Result<(), InterpError> {
        if let Some(token) = &self.token {
            if token.is_cancelled() {
                return Err(InterpError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(InterpError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn stop_check_reports_cancel_before_deadline() {
        let token = CancelToken::new();
        token.cancel();
        let check = StopCheck {
            token: Some(token),
            deadline: Some(Instant::now()),
        };
        assert_eq!(check.check(), Err(InterpError::Cancelled));
    }

    #[test]
    fn stop_check_reports_passed_deadline() {
        let check = StopCheck {
            token: None,
            deadline: Some(Instant::now()),
        };
        assert_eq!(check.check(), Err(InterpError::DeadlineExceeded));

        let later = StopCheck {
            token: None,
            deadline: Some(Instant::now() + Duration::from_secs(3600)),
        };
        assert!(later.check().is_ok());
    }
}
