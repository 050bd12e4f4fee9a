//! Fragment routing: map route names to views and render on navigation.
//!
//! Navigation renders the view registered for the fragment, or the view
//! registered under [`DEFAULT_ROUTE`] when the fragment is unknown. Render
//! notices then make every other view sharing the target element re-inject
//! on its next pass, which is what swaps routes on screen.

use std::cell::RefCell;

use ahash::AHashMap;

use crate::view::BoundView;

/// Fallback route name used when a fragment has no registered view.
pub const DEFAULT_ROUTE: &str = "defaultView";

/// Route table. Single-threaded, like the views it holds.
#[derive(Default)]
pub struct Router {
    views: RefCell<AHashMap<String, BoundView>>,
    fragment: RefCell<String>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `view` under `route`. Re-registering replaces.
    pub fn register(&self, route: &str, view: BoundView) {
        self.views.borrow_mut().insert(route.to_owned(), view);
    }

    /// Navigate to `fragment`: record it and render the matching view,
    /// falling back to [`DEFAULT_ROUTE`]. Returns `false` when neither is
    /// registered.
    pub fn go_to(&self, fragment: &str) -> bool {
        *self.fragment.borrow_mut() = fragment.to_owned();
        self.handle_change()
    }

    /// Render the view for the current fragment without changing it, as
    /// after an external fragment update.
    pub fn handle_change(&self) -> bool {
        let view = {
            let fragment = self.fragment.borrow();
            let views = self.views.borrow();
            views
                .get(fragment.as_str())
                .or_else(|| views.get(DEFAULT_ROUTE))
                .cloned()
        };
        match view {
            Some(view) => {
                view.render();
                true
            }
            None => false,
        }
    }

    /// Render the startup route (the empty fragment, so [`DEFAULT_ROUTE`]
    /// unless a view is registered under `""`).
    pub fn init(&self) -> bool {
        self.handle_change()
    }

    /// The fragment from the most recent navigation.
    #[must_use]
    pub fn current_route(&self) -> String {
        self.fragment.borrow().clone()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.borrow().is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.len())
            .field("fragment", &self.fragment.borrow())
            .finish()
    }
}
