//! Bound views: model-to-document binding with throttled re-render.
//!
//! A [`BoundView`] ties a model store to a target element. Model writes
//! schedule a render on the app's shared rate-limited pipeline; the render
//! pass re-injects the template when needed, patches every `data-model`
//! element, re-binds event directives, and runs the view hooks.
//!
//! # Invariants
//!
//! 1. The template is injected at most once per first-render epoch; a
//!    render notice from another view starts a new epoch.
//! 2. A render pass never re-enters itself: notices from the view's own
//!    render are ignored by its own listener.
//! 3. Event re-binding replaces handlers in place, so repeated renders
//!    never stack duplicate listeners.
//! 4. `init` runs at most once per view, after the first completed render.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | No target element | `el` unset | `ConfigError::MissingTarget` |
//! | Dead/non-element target | stale handle | `ConfigError::TargetNotFound` |
//! | `data-model` key absent from model | foreign or misspelled key | Node skipped, `tracing` warning |
//! | Directive selector matches nothing | template drift | Directive silently unbound this pass |

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use muv_core::{
    ConfigError, Dispatch, EventDirective, RENDER_EVENT, RenderNotice, Subscription, Value, ViewId,
    parse_directives,
};
use muv_dom::{Document, NodeId, supports_src, supports_value};
use tracing::warn;

use crate::app::{App, RENDER_KEY};
use crate::model::ModelStore;
use crate::schedule::RateLimiter;

/// Directive callback: runs with the owning view and the node the event
/// fired on.
pub type EventCallback = Rc<dyn Fn(&BoundView, NodeId)>;

/// Lifecycle hook (`after_render`, `init`).
pub type ViewHook = Rc<dyn Fn(&BoundView)>;

/// Everything needed to construct a [`BoundView`].
///
/// `events` maps directive keys (`"<event> <selector>"`, single-space
/// separated) to handler names; `handlers` resolves those names to
/// callbacks. Malformed keys and unresolved names are skipped.
pub struct ViewConfig {
    /// Target element the view renders into. Required.
    pub el: Option<NodeId>,
    /// Initial model entries.
    pub model: Vec<(String, Value)>,
    /// Markup injected into `el` on first render.
    pub template: String,
    /// Directive key to handler name, in binding order.
    pub events: Vec<(String, String)>,
    /// Handler name to callback.
    pub handlers: AHashMap<String, EventCallback>,
    /// Runs after every render pass.
    pub after_render: Option<ViewHook>,
    /// Runs once, after the first render pass.
    pub init: Option<ViewHook>,
    /// When false, model writes do not schedule renders.
    pub data_binding: bool,
    /// Minimum spacing between scheduled renders, in milliseconds.
    pub render_rate_limit_ms: u64,
    /// Bind each directive to only the first matching element.
    pub first_match_only: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            el: None,
            model: Vec::new(),
            template: String::new(),
            events: Vec::new(),
            handlers: AHashMap::new(),
            after_render: None,
            init: None,
            data_binding: true,
            render_rate_limit_ms: 250,
            first_match_only: false,
        }
    }
}

struct ViewInner {
    id: ViewId,
    document: Document,
    dispatch: Dispatch<RenderNotice>,
    limiter: RateLimiter,
    el: NodeId,
    template: String,
    model: ModelStore,
    directives: Vec<EventDirective<EventCallback>>,
    render_interval: Duration,
    first_match_only: bool,
    has_rendered: Cell<bool>,
    init_ran: Cell<bool>,
    after_render: Option<ViewHook>,
    init: Option<ViewHook>,
    /// Keeps the render-notice listener alive for the view's lifetime.
    notice_sub: RefCell<Option<Subscription>>,
}

/// A view bound to a document element. `Clone` shares the view.
pub struct BoundView {
    inner: Rc<ViewInner>,
}

impl Clone for BoundView {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl BoundView {
    /// Build a view in `app` and perform its initial render.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingTarget`] when `config.el` is unset;
    /// [`ConfigError::TargetNotFound`] when it is not a live element.
    pub fn new(app: &App, config: ViewConfig) -> Result<Self, ConfigError> {
        let el = config.el.ok_or(ConfigError::MissingTarget)?;
        if !app.document().is_element(el) {
            return Err(ConfigError::TargetNotFound { node: el.index() });
        }

        let directives = parse_directives(&config.events, &config.handlers);
        let model = ModelStore::new(config.model);
        model.set_binding_enabled(config.data_binding);

        let inner = Rc::new(ViewInner {
            id: ViewId::next(),
            document: app.document().clone(),
            dispatch: app.dispatch().clone(),
            limiter: app.limiter().clone(),
            el,
            template: config.template,
            model,
            directives,
            render_interval: Duration::from_millis(config.render_rate_limit_ms),
            first_match_only: config.first_match_only,
            has_rendered: Cell::new(false),
            init_ran: Cell::new(false),
            after_render: config.after_render,
            init: config.init,
            notice_sub: RefCell::new(None),
        });

        // Model writes schedule a render on the shared pipeline. Weak
        // back-reference: the store must not keep the view alive.
        let weak = Rc::downgrade(&inner);
        inner.model.set_on_mutate(Rc::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let view = BoundView {
                inner: Rc::clone(&inner),
            };
            let interval = inner.render_interval;
            inner
                .limiter
                .schedule(RENDER_KEY, interval, Box::new(move || view.render()));
        }));

        // Another view rendering may have clobbered our injected markup, so
        // drop the first-render cache. Our own notices carry our id and are
        // ignored.
        let weak = Rc::downgrade(&inner);
        let sub = inner.dispatch.listen(RENDER_EVENT, move |notice| {
            if let Some(inner) = weak.upgrade()
                && notice.source != inner.id
            {
                inner.has_rendered.set(false);
            }
        });
        *inner.notice_sub.borrow_mut() = Some(sub);

        let view = Self { inner };
        view.render();
        Ok(view)
    }

    /// This view's unique id.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.inner.id
    }

    /// The element the view renders into.
    #[must_use]
    pub fn el(&self) -> NodeId {
        self.inner.el
    }

    /// The view's model store.
    #[must_use]
    pub fn model(&self) -> &ModelStore {
        &self.inner.model
    }

    /// The document the view is bound to.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// Run a full render pass now, bypassing the rate limiter.
    ///
    /// Broadcasts a render notice, injects the template if this is the
    /// first render of the current epoch, patches `data-model` elements,
    /// re-binds event directives, then runs `after_render` and (once)
    /// `init`.
    pub fn render(&self) {
        let inner = &self.inner;
        inner
            .dispatch
            .broadcast(RENDER_EVENT, &RenderNotice { source: inner.id });

        if !inner.has_rendered.get() {
            inner.document.set_inner_html(inner.el, &inner.template);
            inner.has_rendered.set(true);
        }

        self.patch_bound_nodes();
        self.bind_directives();

        if let Some(hook) = &inner.after_render {
            hook(self);
        }
        if !inner.init_ran.get() {
            inner.init_ran.set(true);
            if let Some(hook) = &inner.init {
                hook(self);
            }
        }
    }

    /// Write each model value into every element declaring it via
    /// `data-model`. The whole document is scanned, so keys owned by other
    /// views show up here; those are skipped.
    fn patch_bound_nodes(&self) {
        let inner = &self.inner;
        for node in inner.document.nodes_with_attribute("data-model") {
            let Some(key) = inner.document.attribute(node, "data-model") else {
                continue;
            };
            let Some(value) = inner.model.get_one(&key) else {
                warn!(view = %inner.id, key = %key, "data-model key absent from model, skipping");
                continue;
            };
            let text = value.to_string();
            inner.document.set_inner_html(node, &text);
            if let Some(tag) = inner.document.tag(node) {
                if supports_value(&tag) {
                    inner.document.set_attribute(node, "value", &text);
                }
                if supports_src(&tag) {
                    inner.document.set_attribute(node, "src", &text);
                }
            }
        }
    }

    /// (Re-)attach every directive to its current selector matches.
    /// Handlers replace in place, keyed by (node, event, view id).
    fn bind_directives(&self) {
        let inner = &self.inner;
        for directive in &inner.directives {
            let matches = inner.document.query_selector_all(&directive.selector);
            let take = if inner.first_match_only {
                1
            } else {
                matches.len()
            };
            for node in matches.into_iter().take(take) {
                let weak = Rc::downgrade(inner);
                let callback = Rc::clone(&directive.callback);
                inner.document.set_listener(
                    node,
                    &directive.event_type,
                    inner.id,
                    Rc::new(move |node| {
                        if let Some(inner) = weak.upgrade() {
                            let view = BoundView { inner };
                            callback(&view, node);
                        }
                    }),
                );
            }
        }
    }
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        self.document.remove_listeners(self.id);
    }
}

impl std::fmt::Debug for BoundView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundView")
            .field("id", &self.inner.id)
            .field("el", &self.inner.el)
            .field("has_rendered", &self.inner.has_rendered.get())
            .finish()
    }
}
