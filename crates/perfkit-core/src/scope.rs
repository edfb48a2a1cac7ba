use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::composer::{Composer, GroupHandle, WeakGroup};
use crate::local::LocalContext;
use crate::runtime::RuntimeHandle;

pub type ScopeId = usize;

static NEXT_SCOPE_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) type RecomposeCallback = Rc<dyn Fn(&Composer) + 'static>;

pub(crate) struct RecomposeScopeInner {
    id: ScopeId,
    runtime: RuntimeHandle,
    depth: usize,
    invalid: Cell<bool>,
    enqueued: Cell<bool>,
    active: Cell<bool>,
    group: RefCell<Option<WeakGroup>>,
    recompose: RefCell<Option<RecomposeCallback>>,
    locals: RefCell<LocalContext>,
}

/// A restartable region of the composition.
///
/// State read while the scope's body runs subscribes the scope; writing that
/// state marks the scope invalid so the next pass re-executes only this body.
#[derive(Clone)]
pub struct RecomposeScope {
    inner: Rc<RecomposeScopeInner>,
}

impl PartialEq for RecomposeScope {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for RecomposeScope {}

impl RecomposeScope {
    pub(crate) fn new(runtime: RuntimeHandle, depth: usize) -> Self {
        Self {
            inner: Rc::new(RecomposeScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                runtime,
                depth,
                invalid: Cell::new(false),
                enqueued: Cell::new(false),
                active: Cell::new(true),
                group: RefCell::new(None),
                recompose: RefCell::new(None),
                locals: RefCell::new(LocalContext::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RecomposeScopeInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Nesting depth of the owning group; parents recompose before children.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    pub fn is_invalid(&self) -> bool {
        self.inner.invalid.get()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub fn invalidate(&self) {
        self.inner.invalid.set(true);
        if !self.inner.active.get() {
            return;
        }
        if !self.inner.enqueued.replace(true) {
            self.inner
                .runtime
                .register_invalid_scope(self.inner.id, Rc::downgrade(&self.inner));
        }
    }

    /// Called right before the body runs, so writes made during the body
    /// invalidate the scope again.
    pub(crate) fn mark_recomposed(&self) {
        self.inner.invalid.set(false);
        if self.inner.enqueued.replace(false) {
            self.inner.runtime.mark_scope_recomposed(self.inner.id);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RecomposeScopeInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn attach_group(&self, group: &GroupHandle) {
        *self.inner.group.borrow_mut() = Some(Rc::downgrade(group));
    }

    pub(crate) fn group(&self) -> Option<GroupHandle> {
        self.inner.group.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_recompose(&self, callback: RecomposeCallback) {
        *self.inner.recompose.borrow_mut() = Some(callback);
    }

    pub(crate) fn recompose_callback(&self) -> Option<RecomposeCallback> {
        self.inner.recompose.borrow().clone()
    }

    pub(crate) fn snapshot_locals(&self, locals: &LocalContext) {
        *self.inner.locals.borrow_mut() = locals.clone();
    }

    pub(crate) fn locals(&self) -> LocalContext {
        self.inner.locals.borrow().clone()
    }

    pub fn deactivate(&self) {
        if !self.inner.active.replace(false) {
            return;
        }
        self.inner.recompose.borrow_mut().take();
        if self.inner.enqueued.replace(false) {
            self.inner.runtime.mark_scope_recomposed(self.inner.id);
        }
    }
}

impl RecomposeScopeInner {
    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }
}
