/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running processes.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for long-running computations.

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Progress events emitted during an interpolation.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Summary of the problem about to be solved.
    Configuration {
        num_nodes: usize,
        num_targets: usize,
        num_polynomials: usize,
    },

    /// One density scan of the automatic grid sizer.
    PartitionScan {
        nx: usize,
        ny: usize,
        min_halo_nodes: usize,
        threshold: usize,
    },

    /// The subdomain grid that will be used.
    PartitionChosen { nx: usize, ny: usize },

    /// A subdomain's local system was solved and evaluated.
    SubdomainSolved {
        completed: usize,
        total: usize,
        progress: f64,
    },

    /// The interpolation finished.
    Finished {
        elapsed: Duration,
        num_targets: usize,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards partition scans, subdomain completions and the
/// final summary over a bounded channel to a listener thread.
///
/// [`ProgressSink::emit`] is called from rayon workers while subdomains are
/// solved, so it never blocks.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs `handler` for each [`ProgressMsg`] of an
/// interpolation run.
///
/// A run emits one `Configuration`, a `PartitionScan` per automatic grid tried,
/// one `PartitionChosen`, a `SubdomainSolved` per subdomain (in completion order
/// when solving in parallel), and finally `Finished` plus a summary `Message`.
/// Messages are dropped rather than blocking the solve when `buffer` is full, so
/// size it to at least the expected subdomain count if every update matters.
/// The thread exits once every clone of the returned sink has been dropped,
/// which includes the interpolator holding it.
///
/// ### Example
/// ```
/// use phs_rbf::progress::{closure_sink, ProgressMsg, ProgressSink};
///
/// let (sink, listener) = closure_sink(256, |msg| {
///     if let ProgressMsg::SubdomainSolved { completed, total, .. } = msg {
///         println!("{completed}/{total} subdomains");
///     }
/// });
/// sink.emit(ProgressMsg::SubdomainSolved { completed: 1, total: 4, progress: 0.25 });
/// drop(sink);
/// listener.join().unwrap();
/// ```
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Fraction of subdomains completed, in `[0, 1]`.
#[inline]
pub(crate) fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        completed as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_sink_delivers_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let (sink, handle) = closure_sink(16, move |msg| {
            if let ProgressMsg::PartitionChosen { nx, ny } = msg {
                seen_in.lock().unwrap().push((nx, ny));
            }
        });

        sink.emit(ProgressMsg::PartitionChosen { nx: 4, ny: 2 });
        sink.emit(ProgressMsg::Message {
            message: "ignored".into(),
        });
        drop(sink);
        handle.join().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(4, 2)]);
    }

    #[test]
    fn fraction_handles_empty_work() {
        assert_eq!(progress_fraction(0, 0), 1.0);
        assert_eq!(progress_fraction(1, 4), 0.25);
    }
}
