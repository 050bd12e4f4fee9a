#![forbid(unsafe_code)]

//! Runtime for muv: throttled render scheduling, bound views, and routing.
//!
//! The pieces fit together like this: an [`App`] owns the shared document,
//! dispatch bus, and [`RateLimiter`]. A [`BoundView`] binds a [`ModelStore`]
//! to a target element; model writes schedule render passes on the app's
//! shared render process, spaced at least the view's rate limit apart.
//! Render passes broadcast notices so views sharing an element re-inject
//! their templates, and a [`Router`] builds fragment navigation on top.
//!
//! Everything is single-threaded and cooperatively driven: after mutating
//! models, hosts call [`App::tick`] once [`App::next_deadline`] passes to
//! flush deferred renders.

pub mod app;
pub mod clock;
pub mod model;
pub mod router;
pub mod schedule;
pub mod view;

pub use app::{App, RENDER_KEY};
pub use clock::{LabClock, TimeSource};
pub use model::ModelStore;
pub use router::{DEFAULT_ROUTE, Router};
pub use schedule::{Callback, RETRY_DELAY, RateLimiter};
pub use view::{BoundView, EventCallback, ViewConfig, ViewHook};
