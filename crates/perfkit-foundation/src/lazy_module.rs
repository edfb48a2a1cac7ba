//! Code that is loaded on first use.
//!
//! A [`LazyModule`] wraps an expensive loader. [`LazyModule::preload`] starts
//! the load in the background without rendering anything, which is how a
//! hover or focus handler prefetches. [`LazyModule::suspend`] is the render
//! side: it returns the loaded value or [`Suspended`], letting a suspense
//! boundary show its fallback until the load lands.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use perfkit_core::{current_runtime_handle, MutableState, RuntimeHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub module: &'static str,
    pub message: String,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {}: {}", self.module, self.message)
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleStatus<T> {
    Unloaded,
    Loading,
    Ready(T),
    Failed(LoadError),
}

impl<T> ModuleStatus<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModuleStatus::Ready(_))
    }
}

/// Why a module could not be rendered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suspended {
    Pending { module: &'static str },
    Failed(LoadError),
}

impl fmt::Display for Suspended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suspended::Pending { module } => write!(f, "{module} is still loading"),
            Suspended::Failed(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Suspended {}

type Loader<T> = Arc<dyn Fn() -> Result<T, String> + Send + Sync>;

struct LazyModuleInner<T: Clone + Send + 'static> {
    name: &'static str,
    loader: Loader<T>,
    status: OnceCell<MutableState<ModuleStatus<T>>>,
    loads_started: Cell<usize>,
}

/// Handle to a lazily loaded module. Clones share the load.
pub struct LazyModule<T: Clone + Send + 'static> {
    inner: Rc<LazyModuleInner<T>>,
}

impl<T: Clone + Send + 'static> Clone for LazyModule<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> PartialEq for LazyModule<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for LazyModule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModule")
            .field("name", &self.inner.name)
            .field("loads_started", &self.inner.loads_started.get())
            .finish()
    }
}

impl<T: Clone + Send + 'static> LazyModule<T> {
    /// `loader` runs on a worker thread, at most once per successful load.
    pub fn new(
        name: &'static str,
        loader: impl Fn() -> Result<T, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(LazyModuleInner {
                name,
                loader: Arc::new(loader),
                status: OnceCell::new(),
                loads_started: Cell::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Number of loads started so far. Prefetching then rendering counts once.
    pub fn loads_started(&self) -> usize {
        self.inner.loads_started.get()
    }

    /// Current status, without subscribing anyone.
    pub fn status(&self) -> ModuleStatus<T> {
        match self.inner.status.get() {
            Some(state) => state.peek(Clone::clone),
            None => ModuleStatus::Unloaded,
        }
    }

    fn status_state(&self, runtime: &RuntimeHandle) -> MutableState<ModuleStatus<T>> {
        self.inner
            .status
            .get_or_init(|| MutableState::with_runtime(ModuleStatus::Unloaded, runtime.clone()))
            .clone()
    }

    /// Starts loading unless a load already ran or is running.
    ///
    /// Returns `true` when this call started a load.
    pub fn preload(&self, runtime: &RuntimeHandle) -> bool {
        let state = self.status_state(runtime);
        if !state.peek(|status| matches!(status, ModuleStatus::Unloaded)) {
            log::trace!("{} already requested", self.inner.name);
            return false;
        }
        state.set(ModuleStatus::Loading);
        self.inner
            .loads_started
            .set(self.inner.loads_started.get() + 1);
        log::debug!("loading module {}", self.inner.name);

        let name = self.inner.name;
        let loader = Arc::clone(&self.inner.loader);
        let target = state.clone();
        let spawned = runtime.spawn_background(
            name,
            move || Some(loader()),
            move |result: Result<T, String>| {
                let status = match result {
                    Ok(value) => {
                        log::debug!("module {name} ready");
                        ModuleStatus::Ready(value)
                    }
                    Err(message) => {
                        log::warn!("module {name} failed to load: {message}");
                        ModuleStatus::Failed(LoadError {
                            module: name,
                            message,
                        })
                    }
                };
                target.set(status);
            },
        );
        if spawned.is_none() {
            state.set(ModuleStatus::Failed(LoadError {
                module: name,
                message: "no worker available".to_string(),
            }));
        }
        true
    }

    /// Reads the module for rendering.
    ///
    /// Inside a composition this subscribes the caller and starts the load if
    /// nobody prefetched it. Outside one it only reports the current status.
    pub fn suspend(&self) -> Result<T, Suspended> {
        let Some(runtime) = current_runtime_handle() else {
            return self.resolve(&self.status());
        };
        let state = self.status_state(&runtime);
        if state.peek(|status| matches!(status, ModuleStatus::Unloaded)) {
            self.preload(&runtime);
        }
        state.with(|status| self.resolve(status))
    }

    /// Forgets a failed load so the next read tries again.
    pub fn retry(&self) -> bool {
        let Some(state) = self.inner.status.get() else {
            return false;
        };
        if !state.peek(|status| matches!(status, ModuleStatus::Failed(_))) {
            return false;
        }
        log::info!("retrying module {}", self.inner.name);
        state.set(ModuleStatus::Unloaded);
        true
    }

    fn resolve(&self, status: &ModuleStatus<T>) -> Result<T, Suspended> {
        match status {
            ModuleStatus::Ready(value) => Ok(value.clone()),
            ModuleStatus::Failed(err) => Err(Suspended::Failed(err.clone())),
            ModuleStatus::Unloaded | ModuleStatus::Loading => Err(Suspended::Pending {
                module: self.inner.name,
            }),
        }
    }
}
