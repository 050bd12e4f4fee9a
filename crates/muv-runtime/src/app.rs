//! Application context: the shared substrate every bound view plugs into.
//!
//! An [`App`] owns one document, one dispatch bus, and one rate limiter.
//! Views created against the same `App` share all three, which is what
//! makes cross-view render invalidation and render throttling work.

use muv_core::{Dispatch, RenderNotice};
use muv_dom::Document;
use web_time::Instant;

use crate::clock::{LabClock, TimeSource};
use crate::schedule::RateLimiter;

/// Rate-limiter key under which all render work is throttled. Every view in
/// an `App` shares this one process, matching the single shared render
/// pipeline of a browser page.
pub const RENDER_KEY: &str = "muv-render";

/// Shared application context. `Clone` shares the document, bus, and
/// scheduler.
#[derive(Clone)]
pub struct App {
    document: Document,
    dispatch: Dispatch<RenderNotice>,
    limiter: RateLimiter,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Context on the real clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_time(TimeSource::Real)
    }

    /// Context on a [`LabClock`], for deterministic tests.
    #[must_use]
    pub fn with_clock(clock: LabClock) -> Self {
        Self::with_time(TimeSource::Lab(clock))
    }

    fn with_time(time: TimeSource) -> Self {
        Self {
            document: Document::new(),
            dispatch: Dispatch::new(),
            limiter: RateLimiter::new(time),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn dispatch(&self) -> &Dispatch<RenderNotice> {
        &self.dispatch
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Resume any rate-limited work whose deadline has passed.
    pub fn tick(&self) {
        self.limiter.tick();
    }

    /// When the host should next call [`App::tick`], if ever.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.limiter.next_deadline()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("document", &self.document)
            .field("limiter", &self.limiter)
            .finish()
    }
}
