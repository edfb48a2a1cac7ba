//! Compose-style runtime used by the perfkit exercises.

mod composer;
pub mod composer_context;
mod effects;
pub mod element;
pub mod frame_clock;
pub mod hash;
mod local;
pub mod owned;
pub mod platform;
mod reducer;
pub mod runtime;
mod scope;
mod state;

use std::fmt;
use std::hash::Hash;
use std::panic::Location;
use std::rc::Rc;

pub use composer::{Composer, Composition};
pub use composer_context::{try_with_composer, with_composer as with_current_composer};
pub use effects::{
    CancelToken, DisposableEffectResult, LaunchedEffectScope, SideEffect,
    __disposable_effect_impl, __launched_effect_async_impl, __launched_effect_impl,
};
pub use element::{Element, ElementKind, KeyPress, UiEvent, ViewNode, ViewTree};
pub use frame_clock::{FrameCallbackRegistration, FrameClock};
pub use hash::{hash_key, location_key, Key};
pub use local::{
    compositionLocalOf, requiredCompositionLocalOf, requiredStaticCompositionLocalOf,
    staticCompositionLocalOf, CompositionLocal, CompositionLocalProvider, LocalError,
    ProvidedValue, StaticCompositionLocal,
};
pub use owned::Owned;
pub use platform::{DefaultScheduler, RuntimeScheduler};
pub use reducer::{useReducer, Dispatch, ReducerError};
pub use runtime::{Runtime, RuntimeHandle, TaskHandle, UiDispatcher};
pub use scope::{RecomposeScope, ScopeId};
pub use state::{MutableState, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// `render` was called before any content was installed.
    NoContent,
    /// Scopes kept invalidating each other; the pass limit was hit.
    RecomposeLoop { passes: usize },
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::NoContent => write!(f, "composition has no content"),
            ComposeError::RecomposeLoop { passes } => {
                write!(f, "recomposition did not settle after {passes} passes")
            }
        }
    }
}

impl std::error::Error for ComposeError {}

#[track_caller]
fn caller_key() -> Key {
    let location = Location::caller();
    location_key(location.file(), location.line(), location.column())
}

pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Owned<T> {
    with_current_composer(|composer| composer.remember(init))
}

#[allow(non_snake_case)]
pub fn mutableStateOf<T: Clone + 'static>(initial: T) -> MutableState<T> {
    let runtime = with_current_composer(|composer| composer.runtime_handle());
    MutableState::with_runtime(initial, runtime)
}

#[allow(non_snake_case)]
/// State that survives recomposition of the calling group.
pub fn useState<T: Clone + 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    remember(|| mutableStateOf(init())).get()
}

/// Runs `content` in its own group at this call site.
#[track_caller]
pub fn group<R>(content: impl FnOnce() -> R) -> R {
    let key = caller_key();
    with_current_composer(|composer| composer.with_group(key, |_| content()))
}

/// Keys the enclosed group by `key` instead of by position.
pub fn with_key<K: Hash + ?Sized, R>(key: &K, content: impl FnOnce() -> R) -> R {
    with_current_composer(|composer| composer.with_key(key, |_| content()))
}

/// Skippable restartable group: `content` runs again only when `props`
/// change or state it read is written.
#[track_caller]
pub fn memo<P>(props: P, content: impl Fn(&P) + 'static)
where
    P: PartialEq + Clone + 'static,
{
    let key = caller_key();
    with_current_composer(|composer| composer.memo(key, props, Rc::new(content)));
}

/// Restartable group that is never skipped when its parent runs, but can
/// recompose alone when state it read is written.
#[track_caller]
pub fn restartable(content: impl Fn() + 'static) {
    let key = caller_key();
    with_current_composer(|composer| composer.restartable(key, Rc::new(content)));
}

pub fn emit(element: Element) {
    with_current_composer(|composer| composer.emit(element));
}

/// Emits `element` with the output of `content` as its children.
#[track_caller]
pub fn container<R>(element: Element, content: impl FnOnce() -> R) -> R {
    let key = caller_key();
    with_current_composer(|composer| composer.container(key, element, |_| content()))
}

pub fn current_runtime_handle() -> Option<RuntimeHandle> {
    try_with_composer(|composer| composer.runtime_handle())
}

#[allow(non_snake_case)]
pub fn withFrameNanos(callback: impl FnOnce(u64) + 'static) -> FrameCallbackRegistration {
    with_current_composer(|composer| composer.runtime_handle().frame_clock().with_frame_nanos(callback))
}

#[allow(non_snake_case)]
pub fn withFrameMillis(callback: impl FnOnce(u64) + 'static) -> FrameCallbackRegistration {
    with_current_composer(|composer| {
        composer
            .runtime_handle()
            .frame_clock()
            .with_frame_millis(callback)
    })
}

#[cfg(test)]
#[path = "tests/composition_tests.rs"]
mod composition_tests;

#[cfg(test)]
#[path = "tests/effect_tests.rs"]
mod effect_tests;

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod local_tests;

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod reducer_tests;
