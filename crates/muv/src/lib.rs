#![forbid(unsafe_code)]

//! muv: minimal model-view binding with rate-limited rendering.
//!
//! Build an [`App`], create a [`BoundView`] against an element in its
//! document, and write to the view's model; renders are scheduled on a
//! shared throttled pipeline and the document is patched through
//! `data-model` attributes.
//!
//! ```
//! use muv::{App, BoundView, Value, ViewConfig};
//!
//! let app = App::new();
//! let doc = app.document();
//! doc.set_inner_html(doc.root(), "<div id=\"app\"></div>");
//!
//! let view = BoundView::new(
//!     &app,
//!     ViewConfig {
//!         el: doc.query_selector("#app"),
//!         template: "<h1 data-model=\"title\"></h1>".to_owned(),
//!         model: vec![("title".to_owned(), Value::from("hello"))],
//!         ..ViewConfig::default()
//!     },
//! )
//! .unwrap();
//!
//! let h1 = doc.query_selector("h1").unwrap();
//! assert_eq!(doc.text_content(h1), "hello");
//! view.model().set_one("title", "goodbye");
//! ```

pub use muv_core::{
    ConfigError, Dispatch, EventDirective, RENDER_EVENT, RenderNotice, Subscription, Value,
    ViewId, parse_directives,
};
pub use muv_dom::{Document, MarkupNode, NodeId, Selector, parse_fragment};

#[cfg(feature = "runtime")]
pub use muv_runtime::{
    App, BoundView, DEFAULT_ROUTE, EventCallback, LabClock, ModelStore, RETRY_DELAY, RateLimiter,
    Router, TimeSource, ViewConfig, ViewHook,
};

/// Everything most applications need, in one import.
pub mod prelude {
    pub use muv_core::{ConfigError, Value, ViewId};
    pub use muv_dom::{Document, NodeId};

    #[cfg(feature = "runtime")]
    pub use muv_runtime::{App, BoundView, Router, ViewConfig};
}
