use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::composer_context::try_with_composer;
use crate::runtime::RuntimeHandle;
use crate::scope::{RecomposeScope, RecomposeScopeInner};

struct MutableStateInner<T> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Weak<RecomposeScopeInner>>>,
    runtime: RuntimeHandle,
}

impl<T> MutableStateInner<T> {
    fn subscribe_current_scope(&self) {
        let Some(Some(scope)) = try_with_composer(|composer| composer.current_recompose_scope())
        else {
            return;
        };
        let mut watchers = self.watchers.borrow_mut();
        watchers.retain(|watcher| watcher.strong_count() > 0);
        let id = scope.id();
        let already_registered = watchers
            .iter()
            .any(|watcher| watcher.upgrade().is_some_and(|inner| inner.id() == id));
        if !already_registered {
            watchers.push(scope.downgrade());
        }
    }

    fn invalidate_watchers(&self) {
        let watchers: Vec<_> = self
            .watchers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for watcher in watchers {
            RecomposeScope::from_inner(watcher).invalidate();
        }
    }
}

/// Observable value owned by the UI thread.
///
/// Reading it while a restartable group runs subscribes that group; writing it
/// invalidates every subscriber.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<MutableStateInner<T>>,
}

/// Read-only view of a [`MutableState`].
pub struct State<T: Clone + 'static> {
    inner: Rc<MutableStateInner<T>>,
}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for MutableState<T> {}

impl<T: Clone + 'static> PartialEq for State<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for State<T> {}

impl<T: Clone + 'static> State<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.subscribe_current_scope();
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.with(T::clone)
    }

    pub fn get(&self) -> T {
        self.value()
    }

    /// Reads without subscribing the current scope.
    pub fn peek<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn with_runtime(value: T, runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(MutableStateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
                runtime,
            }),
        }
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.subscribe_current_scope();
        f(&self.inner.value.borrow())
    }

    pub fn peek<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.runtime.assert_ui_thread();
        let result = f(&mut self.inner.value.borrow_mut());
        self.inner.invalidate_watchers();
        result
    }

    pub fn replace(&self, value: T) -> T {
        self.inner.runtime.assert_ui_thread();
        let previous = std::mem::replace(&mut *self.inner.value.borrow_mut(), value);
        self.inner.invalidate_watchers();
        previous
    }

    pub fn set(&self, value: T) {
        self.replace(value);
    }

    pub fn value(&self) -> T {
        self.with(T::clone)
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.inner.runtime.clone()
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.inner
            .watchers
            .borrow()
            .iter()
            .filter(|watcher| watcher.strong_count() > 0)
            .count()
    }
}

impl<T: Clone + PartialEq + 'static> MutableState<T> {
    /// Writes only when the value differs; returns whether it did.
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.peek(|current| current == &value) {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}
