//! Keyed model state with a mutation hook.
//!
//! A [`ModelStore`] holds a view's named values. Writes fire the mutation
//! hook (the view's render scheduling path) once per call, after the store
//! borrow is released, so the hook may freely read the store back.
//!
//! # Invariants
//!
//! 1. The hook observes the fully applied write: by the time it runs, every
//!    key in the batch holds its new value.
//! 2. One hook firing per write call, even when [`ModelStore::set_many`]
//!    touches several keys.
//! 3. With binding disabled, writes still land; only the hook is skipped.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use muv_core::Value;

struct StoreInner {
    values: AHashMap<String, Value>,
    on_mutate: Option<Rc<dyn Fn()>>,
    binding_enabled: bool,
}

/// Shared model handle. `Clone` shares the underlying values.
pub struct ModelStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Clone for ModelStore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl ModelStore {
    #[must_use]
    pub fn new(initial: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values: initial.into_iter().collect(),
                on_mutate: None,
                binding_enabled: true,
            })),
        }
    }

    /// Install the mutation hook. At most one hook; later installs replace.
    pub fn set_on_mutate(&self, hook: Rc<dyn Fn()>) {
        self.inner.borrow_mut().on_mutate = Some(hook);
    }

    /// Turn hook firing on or off. Values keep updating either way.
    pub fn set_binding_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().binding_enabled = enabled;
    }

    /// Read one value.
    #[must_use]
    pub fn get_one(&self, key: &str) -> Option<Value> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Read several values; missing keys are omitted.
    #[must_use]
    pub fn get_many(&self, keys: &[&str]) -> AHashMap<String, Value> {
        let inner = self.inner.borrow();
        keys.iter()
            .filter_map(|&k| inner.values.get(k).map(|v| (k.to_owned(), v.clone())))
            .collect()
    }

    /// Snapshot of the whole model at call time. Later writes do not show
    /// up in a snapshot already taken.
    #[must_use]
    pub fn get_all(&self) -> AHashMap<String, Value> {
        self.inner.borrow().values.clone()
    }

    /// Run `f` against the live model without cloning it. `f` must not
    /// write back through this store.
    pub fn with_all<R>(&self, f: impl FnOnce(&AHashMap<String, Value>) -> R) -> R {
        f(&self.inner.borrow().values)
    }

    /// Write one value, then fire the hook.
    pub fn set_one(&self, key: &str, value: impl Into<Value>) {
        let hook = {
            let mut inner = self.inner.borrow_mut();
            inner.values.insert(key.to_owned(), value.into());
            hook_to_fire(&inner)
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Write a batch of values, then fire the hook once.
    pub fn set_many(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        let hook = {
            let mut inner = self.inner.borrow_mut();
            let mut wrote = false;
            for (key, value) in entries {
                inner.values.insert(key, value);
                wrote = true;
            }
            if wrote { hook_to_fire(&inner) } else { None }
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Number of keys in the model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().values.is_empty()
    }
}

fn hook_to_fire(inner: &StoreInner) -> Option<Rc<dyn Fn()>> {
    if inner.binding_enabled {
        inner.on_mutate.clone()
    } else {
        None
    }
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ModelStore")
            .field("len", &inner.values.len())
            .field("binding_enabled", &inner.binding_enabled)
            .finish()
    }
}
