// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Progress reporting and cooperative cancellation.

Everything the pipeline tells the outside world during a run goes through a
[ProgressListener]. The listener also carries the cancellation flag: block
actions consult [ProgressListener::is_cancelled] between children, so a
cancelled run stops at the next action boundary with the mask in whatever
(well-defined) state the completed actions left it.
 */

use std::sync::atomic::{AtomicBool, Ordering};

/// Callbacks for one flagging run. All methods have empty defaults; a
/// listener overrides what it cares about.
pub trait ProgressListener: Send + Sync {
    /// An action is about to perform.
    fn on_action_start(&self, _name: &str) {}

    /// Coarse progress inside a block: `done` of `total` children finished.
    fn on_progress(&self, _done: usize, _total: usize) {}

    /// The action reported by the last `on_action_start` finished.
    fn on_action_end(&self) {}

    /// A fatal error is propagating out of the run.
    fn on_error(&self, _error: &dyn std::error::Error) {}

    /// Polled at block boundaries; `true` aborts the run cooperatively.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A listener that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {}

/// A listener whose only job is to carry a cancellation flag that another
/// thread can raise.
#[derive(Debug, Default)]
pub struct CancellableProgress {
    cancelled: AtomicBool,
}

impl CancellableProgress {
    pub fn new() -> CancellableProgress {
        CancellableProgress::default()
    }

    /// Ask the run to stop at the next action boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl ProgressListener for CancellableProgress {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
