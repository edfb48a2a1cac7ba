use std::fmt;
use std::rc::Rc;

use crate::composer_context::with_composer;
use crate::state::{MutableState, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    /// The reducer has no case for this action.
    UnhandledAction { action: String },
    /// The action was understood but cannot be applied to the current state.
    Rejected { action: String, reason: String },
}

impl fmt::Display for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducerError::UnhandledAction { action } => {
                write!(f, "Unhandled action type: {action}")
            }
            ReducerError::Rejected { action, reason } => {
                write!(f, "action {action} rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for ReducerError {}

impl ReducerError {
    pub fn unhandled(action: &impl fmt::Debug) -> Self {
        ReducerError::UnhandledAction {
            action: action_name(action),
        }
    }

    pub fn rejected(action: &impl fmt::Debug, reason: impl Into<String>) -> Self {
        ReducerError::Rejected {
            action: action_name(action),
            reason: reason.into(),
        }
    }
}

/// Variant name of a `Debug` action, without its payload.
fn action_name(action: &impl fmt::Debug) -> String {
    let rendered = format!("{action:?}");
    rendered
        .split(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_string()
}

/// The single write entry point of a reducer-owned state.
pub struct Dispatch<A> {
    inner: Rc<dyn Fn(A) -> Result<(), ReducerError>>,
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for Dispatch<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch")
    }
}

impl<A: 'static> Dispatch<A> {
    /// Binds `reducer` to `state`. Every successful action replaces the state
    /// and invalidates its readers.
    pub fn new<S, R>(state: MutableState<S>, reducer: R) -> Self
    where
        S: Clone + 'static,
        R: Fn(&S, A) -> Result<S, ReducerError> + 'static,
    {
        Self {
            inner: Rc::new(move |action: A| {
                let next = state.peek(|current| reducer(current, action))?;
                state.set(next);
                Ok(())
            }),
        }
    }

    /// Applies `action`.
    ///
    /// # Panics
    /// Panics when the reducer returns an error. An action the reducer does
    /// not handle is a programming error, not a recoverable condition.
    pub fn dispatch(&self, action: A) {
        if let Err(err) = self.try_dispatch(action) {
            panic!("{err}");
        }
    }

    pub fn try_dispatch(&self, action: A) -> Result<(), ReducerError> {
        let result = (self.inner)(action);
        if let Err(err) = &result {
            log::debug!("dispatch failed: {err}");
        }
        result
    }
}

/// Reducer-owned state for the current group.
///
/// Returns a read-only view of the state and the dispatcher that is its only
/// writer. The reducer and initial state are taken from the first
/// composition; later calls reuse them.
#[allow(non_snake_case)]
pub fn useReducer<S, A, R>(reducer: R, init: impl FnOnce() -> S) -> (State<S>, Dispatch<A>)
where
    S: Clone + 'static,
    A: 'static,
    R: Fn(&S, A) -> Result<S, ReducerError> + 'static,
{
    with_composer(|composer| {
        let runtime = composer.runtime_handle();
        let store = composer.remember(|| {
            let state = MutableState::with_runtime(init(), runtime);
            let dispatch = Dispatch::new(state.clone(), reducer);
            (state, dispatch)
        });
        store.with(|(state, dispatch)| (state.as_state(), dispatch.clone()))
    })
}
