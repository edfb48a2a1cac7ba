use crate::composer_context::with_composer;
use crate::hash::{hash_key, Key};
use crate::runtime::{RuntimeHandle, TaskHandle};
use std::cell::RefCell;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Cancellation {
    runtime: RuntimeHandle,
    active: Arc<AtomicBool>,
    continuations: Rc<RefCell<Vec<u64>>>,
}

impl Cancellation {
    fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
        for id in self.continuations.borrow_mut().drain(..) {
            self.runtime.cancel_ui_cont(id);
        }
    }
}

fn new_scope(runtime: &RuntimeHandle) -> (LaunchedEffectScope, Cancellation) {
    let active = Arc::new(AtomicBool::new(true));
    let continuations = Rc::new(RefCell::new(Vec::new()));
    let cancel = Cancellation {
        runtime: runtime.clone(),
        active: Arc::clone(&active),
        continuations: Rc::clone(&continuations),
    };
    let scope = LaunchedEffectScope {
        active,
        runtime: runtime.clone(),
        continuations,
    };
    (scope, cancel)
}

#[derive(Default)]
struct LaunchedEffectState {
    key: Option<Key>,
    cancel: Option<Cancellation>,
    task: Option<TaskHandle>,
}

impl LaunchedEffectState {
    fn should_run(&self, key: Key) -> bool {
        self.key != Some(key)
    }

    fn launch(&mut self, runtime: RuntimeHandle, effect: impl FnOnce(LaunchedEffectScope) + 'static) {
        self.cancel_current();
        let (scope, cancel) = new_scope(&runtime);
        self.cancel = Some(cancel);
        runtime.enqueue_ui_task(Box::new(move || {
            if scope.is_active() {
                effect(scope);
            }
        }));
    }

    fn launch_async(
        &mut self,
        runtime: RuntimeHandle,
        mk_future: impl FnOnce(LaunchedEffectScope) -> Pin<Box<dyn Future<Output = ()>>>,
    ) {
        self.cancel_current();
        let (scope, cancel) = new_scope(&runtime);
        let future = mk_future(scope.clone());
        match runtime.spawn_ui(async move {
            future.await;
            scope.active.store(false, Ordering::SeqCst);
        }) {
            Some(handle) => {
                self.cancel = Some(cancel);
                self.task = Some(handle);
            }
            None => cancel.cancel(),
        }
    }

    fn cancel_current(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.cancel();
        }
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl Drop for LaunchedEffectState {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

/// Handle given to a launched effect. It stays active until the effect's keys
/// change or its group leaves the composition.
#[derive(Clone)]
pub struct LaunchedEffectScope {
    active: Arc<AtomicBool>,
    runtime: RuntimeHandle,
    continuations: Rc<RefCell<Vec<u64>>>,
}

impl LaunchedEffectScope {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn runtime(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Posts UI-thread work that is dropped if the scope is cancelled first.
    pub fn post_ui(&self, task: impl FnOnce() + 'static) {
        if !self.is_active() {
            return;
        }
        let active = Arc::clone(&self.active);
        self.runtime.enqueue_ui_task(Box::new(move || {
            if active.load(Ordering::SeqCst) {
                task();
            }
        }));
    }

    /// Runs blocking work on a worker thread and hands the result to `on_ui`
    /// on the UI thread.
    ///
    /// `work` receives a [`CancelToken`] it should poll during long loops. If
    /// the scope is cancelled the result is discarded and `on_ui` never runs.
    pub fn launch_background<T, Work, Ui>(&self, work: Work, on_ui: Ui)
    where
        T: Send + 'static,
        Work: FnOnce(CancelToken) -> T + Send + 'static,
        Ui: FnOnce(T) + 'static,
    {
        if !self.is_active() {
            return;
        }
        let token = CancelToken {
            active: Arc::clone(&self.active),
        };
        let active = Arc::clone(&self.active);
        let continuations = Rc::clone(&self.continuations);
        let id_slot = Rc::new(RefCell::new(None::<u64>));
        let id_for_cont = Rc::clone(&id_slot);
        let spawned = self.runtime.spawn_background(
            "effect",
            move || {
                let value = work(token.clone());
                (!token.is_cancelled()).then_some(value)
            },
            move |value: T| {
                if let Some(id) = *id_for_cont.borrow() {
                    continuations.borrow_mut().retain(|entry| *entry != id);
                }
                if active.load(Ordering::SeqCst) {
                    on_ui(value);
                } else {
                    log::debug!("dropping background result of a cancelled effect");
                }
            },
        );
        if let Some(id) = spawned {
            *id_slot.borrow_mut() = Some(id);
            self.continuations.borrow_mut().push(id);
        }
    }
}

/// Cooperative cancellation flag handed to background work.
///
/// Blocking calls are not interrupted; long loops should check
/// [`CancelToken::is_cancelled`] and bail out.
#[derive(Clone)]
pub struct CancelToken {
    active: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        !self.active.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Token that is never cancelled, for work started outside any effect.
    pub fn never() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }
}

pub fn __launched_effect_impl<K, F>(group_key: Key, keys: K, effect: F)
where
    K: Hash,
    F: FnOnce(LaunchedEffectScope) + 'static,
{
    with_composer(|composer| {
        composer.with_group(group_key, |composer| {
            let key_hash = hash_key(&keys);
            let state = composer.remember(LaunchedEffectState::default);
            if !state.with(|state| state.should_run(key_hash)) {
                return;
            }
            state.update(|state| state.key = Some(key_hash));
            let runtime = composer.runtime_handle();
            let mut effect = Some(effect);
            composer.register_side_effect(move || {
                if let Some(effect) = effect.take() {
                    state.update(|state| state.launch(runtime, effect));
                }
            });
        });
    });
}

/// Runs `$effect` after the pass in which it first appears, and again
/// whenever `$keys` hashes differently. The previous run is cancelled first.
#[macro_export]
macro_rules! LaunchedEffect {
    ($keys:expr, $effect:expr) => {
        $crate::__launched_effect_impl(
            $crate::location_key(file!(), line!(), column!()),
            $keys,
            $effect,
        )
    };
}

pub fn __launched_effect_async_impl<K, F>(group_key: Key, keys: K, mk_future: F)
where
    K: Hash,
    F: FnOnce(LaunchedEffectScope) -> Pin<Box<dyn Future<Output = ()>>> + 'static,
{
    with_composer(|composer| {
        composer.with_group(group_key, |composer| {
            let key_hash = hash_key(&keys);
            let state = composer.remember(LaunchedEffectState::default);
            if !state.with(|state| state.should_run(key_hash)) {
                return;
            }
            state.update(|state| state.key = Some(key_hash));
            let runtime = composer.runtime_handle();
            let mut mk_future = Some(mk_future);
            composer.register_side_effect(move || {
                if let Some(mk_future) = mk_future.take() {
                    state.update(|state| state.launch_async(runtime, mk_future));
                }
            });
        });
    });
}

#[macro_export]
macro_rules! LaunchedEffectAsync {
    ($keys:expr, $future:expr) => {
        $crate::__launched_effect_async_impl(
            $crate::location_key(file!(), line!(), column!()),
            $keys,
            $future,
        )
    };
}

#[derive(Default)]
struct DisposableEffectState {
    key: Option<Key>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl DisposableEffectState {
    fn run_cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for DisposableEffectState {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

/// Cleanup returned from a disposable effect.
#[derive(Default)]
pub struct DisposableEffectResult {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl DisposableEffectResult {
    pub fn on_dispose(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

pub fn __disposable_effect_impl<K, F>(group_key: Key, keys: K, effect: F)
where
    K: Hash,
    F: FnOnce() -> DisposableEffectResult + 'static,
{
    with_composer(|composer| {
        composer.with_group(group_key, |composer| {
            let key_hash = hash_key(&keys);
            let state = composer.remember(DisposableEffectState::default);
            if state.with(|state| state.key == Some(key_hash)) {
                return;
            }
            state.update(|state| {
                state.run_cleanup();
                state.key = Some(key_hash);
            });
            let mut effect = Some(effect);
            composer.register_side_effect(move || {
                if let Some(effect) = effect.take() {
                    let result = effect();
                    state.update(|state| state.cleanup = result.cleanup);
                }
            });
        });
    });
}

/// Like [`LaunchedEffect!`], but the effect returns a cleanup that runs
/// before the next run and when the group leaves the composition.
#[macro_export]
macro_rules! DisposableEffect {
    ($keys:expr, $effect:expr) => {
        $crate::__disposable_effect_impl(
            $crate::location_key(file!(), line!(), column!()),
            $keys,
            $effect,
        )
    };
}

/// Runs `effect` after every pass in which the calling group executes.
#[allow(non_snake_case)]
pub fn SideEffect(effect: impl FnOnce() + 'static) {
    with_composer(|composer| composer.register_side_effect(effect));
}
