//! Coalescing of rapid query updates.
//!
//! [`Debouncer`] keeps only the latest pushed value and releases it once no
//! newer value has arrived for the configured window. Time is passed in by
//! the caller, so the type is deterministic and needs no timer thread.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use tsvgrid::core::Debouncer;
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(120));
//! let t0 = Instant::now();
//!
//! debouncer.push("m", t0);
//! debouncer.push("ma", t0 + Duration::from_millis(50));
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(100)), None);
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(170)), Some("ma"));
//! assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), None);
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces any pending value and restarts the window at `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Releases the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.window => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Releases the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
