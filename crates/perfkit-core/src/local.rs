use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::composer::Composer;
use crate::composer_context::{try_with_composer, with_composer};
use crate::hash::map::HashMap;
use crate::runtime::RuntimeHandle;
use crate::state::MutableState;

pub type LocalKey = usize;

static NEXT_LOCAL_KEY: AtomicUsize = AtomicUsize::new(1);

fn next_local_key() -> LocalKey {
    NEXT_LOCAL_KEY.fetch_add(1, Ordering::Relaxed)
}

/// Values provided by the enclosing `CompositionLocalProvider`s.
#[derive(Clone, Default)]
pub struct LocalContext {
    values: Rc<HashMap<LocalKey, Rc<dyn Any>>>,
}

impl LocalContext {
    pub(crate) fn get(&self, key: LocalKey) -> Option<Rc<dyn Any>> {
        self.values.get(&key).cloned()
    }

    pub(crate) fn with_entries(&self, entries: Vec<(LocalKey, Rc<dyn Any>)>) -> Self {
        let mut values = (*self.values).clone();
        values.extend(entries);
        Self {
            values: Rc::new(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalError {
    /// A required local was read with no provider above the reader.
    MissingProvider { name: &'static str },
    /// The local was read while no composition was running.
    OutsideComposition { name: &'static str },
}

impl fmt::Display for LocalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalError::MissingProvider { name } => {
                write!(f, "{name} must be used within a provider")
            }
            LocalError::OutsideComposition { name } => {
                write!(f, "{name} read outside of a composition")
            }
        }
    }
}

impl std::error::Error for LocalError {}

pub struct ProvidedValue {
    key: LocalKey,
    apply: Box<dyn FnOnce(&Composer) -> Rc<dyn Any>>,
}

impl ProvidedValue {
    pub(crate) fn into_entry(self, composer: &Composer) -> (LocalKey, Rc<dyn Any>) {
        let ProvidedValue { key, apply } = self;
        (key, apply(composer))
    }
}

/// Makes `values` visible to every reader inside `content`.
#[allow(non_snake_case)]
pub fn CompositionLocalProvider(
    values: impl IntoIterator<Item = ProvidedValue>,
    content: impl FnOnce(),
) {
    let provided: Vec<ProvidedValue> = values.into_iter().collect();
    with_composer(|composer| composer.with_composition_locals(provided, |_| content()));
}

struct LocalStateEntry<T: Clone + PartialEq + 'static> {
    state: MutableState<T>,
}

impl<T: Clone + PartialEq + 'static> LocalStateEntry<T> {
    fn new(initial: T, runtime: RuntimeHandle) -> Self {
        Self {
            state: MutableState::with_runtime(initial, runtime),
        }
    }

    fn set(&self, value: T) {
        if self.state.peek(|current| current != &value) {
            self.state.set(value);
        }
    }
}

struct StaticLocalEntry<T: Clone + 'static> {
    value: RefCell<T>,
}

/// Implicitly passed value whose readers recompose when the provided value
/// changes.
#[derive(Clone)]
pub struct CompositionLocal<T: Clone + PartialEq + 'static> {
    key: LocalKey,
    name: &'static str,
    default: Option<Rc<dyn Fn() -> T>>,
}

impl<T: Clone + PartialEq + 'static> PartialEq for CompositionLocal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Clone + PartialEq + 'static> CompositionLocal<T> {
    pub fn provides(&self, value: T) -> ProvidedValue {
        ProvidedValue {
            key: self.key,
            apply: Box::new(move |composer: &Composer| {
                let runtime = composer.runtime_handle();
                let entry = composer
                    .remember(|| Rc::new(LocalStateEntry::new(value.clone(), runtime)))
                    .get();
                entry.set(value);
                entry as Rc<dyn Any>
            }),
        }
    }

    /// Current value, or the default when nothing provides it.
    ///
    /// # Panics
    /// Panics when the local is required and no provider is in scope.
    pub fn current(&self) -> T {
        self.try_current().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_current(&self) -> Result<T, LocalError> {
        let entry = try_with_composer(|composer| composer.read_local(self.key))
            .ok_or(LocalError::OutsideComposition { name: self.name })?;
        match entry.and_then(|entry| entry.downcast::<LocalStateEntry<T>>().ok()) {
            Some(entry) => Ok(entry.state.value()),
            None => self
                .default
                .as_ref()
                .map(|default| default())
                .ok_or(LocalError::MissingProvider { name: self.name }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Local with a fallback used when no provider is in scope.
#[allow(non_snake_case)]
pub fn compositionLocalOf<T: Clone + PartialEq + 'static>(
    default: impl Fn() -> T + 'static,
) -> CompositionLocal<T> {
    CompositionLocal {
        key: next_local_key(),
        name: std::any::type_name::<T>(),
        default: Some(Rc::new(default)),
    }
}

/// Local that must be provided; reading it elsewhere is a programming error.
#[allow(non_snake_case)]
pub fn requiredCompositionLocalOf<T: Clone + PartialEq + 'static>(
    name: &'static str,
) -> CompositionLocal<T> {
    CompositionLocal {
        key: next_local_key(),
        name,
        default: None,
    }
}

/// Untracked local for values that never change while provided, such as
/// state handles and dispatchers.
///
/// Reads do not subscribe the reader, and providing a different value does
/// not invalidate readers that were skipped.
#[derive(Clone)]
pub struct StaticCompositionLocal<T: Clone + 'static> {
    key: LocalKey,
    name: &'static str,
    default: Option<Rc<dyn Fn() -> T>>,
}

impl<T: Clone + 'static> PartialEq for StaticCompositionLocal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Clone + 'static> StaticCompositionLocal<T> {
    pub fn provides(&self, value: T) -> ProvidedValue {
        ProvidedValue {
            key: self.key,
            apply: Box::new(move |composer: &Composer| {
                let entry = composer
                    .remember(|| {
                        Rc::new(StaticLocalEntry {
                            value: RefCell::new(value.clone()),
                        })
                    })
                    .get();
                *entry.value.borrow_mut() = value;
                entry as Rc<dyn Any>
            }),
        }
    }

    /// # Panics
    /// Panics when the local is required and no provider is in scope.
    pub fn current(&self) -> T {
        self.try_current().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_current(&self) -> Result<T, LocalError> {
        let entry = try_with_composer(|composer| composer.read_local(self.key))
            .ok_or(LocalError::OutsideComposition { name: self.name })?;
        match entry.and_then(|entry| entry.downcast::<StaticLocalEntry<T>>().ok()) {
            Some(entry) => Ok(entry.value.borrow().clone()),
            None => self
                .default
                .as_ref()
                .map(|default| default())
                .ok_or(LocalError::MissingProvider { name: self.name }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[allow(non_snake_case)]
pub fn staticCompositionLocalOf<T: Clone + 'static>(
    default: impl Fn() -> T + 'static,
) -> StaticCompositionLocal<T> {
    StaticCompositionLocal {
        key: next_local_key(),
        name: std::any::type_name::<T>(),
        default: Some(Rc::new(default)),
    }
}

#[allow(non_snake_case)]
pub fn requiredStaticCompositionLocalOf<T: Clone + 'static>(
    name: &'static str,
) -> StaticCompositionLocal<T> {
    StaticCompositionLocal {
        key: next_local_key(),
        name,
        default: None,
    }
}
