//! Render-scope isolation for components that read one slice of a large
//! shared state.
//!
//! Every wrapped instance subscribes to the whole state, but it only runs the
//! component when the slice it selects (or its own props) changed. Writing one
//! cell of a 10 000 cell grid therefore re-renders one cell: the other
//! instances recompute their slice, compare it and skip.

use std::marker::PhantomData;
use std::rc::Rc;

use perfkit_core::{memo, State, StaticCompositionLocal};

/// A presentational component rendered from its props and a state slice.
pub trait SliceComponent: 'static {
    type Props: Clone + PartialEq + 'static;
    type Slice: Clone + PartialEq + 'static;

    fn render(props: &Self::Props, slice: &Self::Slice);
}

/// `C` wired to the shared state provided through a static local.
///
/// The selector must be pure: it is re-evaluated whenever the state changes,
/// and its output decides whether `C` renders.
pub struct StateSlice<S: Clone + 'static, C, F> {
    local: StaticCompositionLocal<State<S>>,
    selector: Rc<F>,
    _component: PhantomData<fn() -> C>,
}

impl<S: Clone + 'static, C, F> Clone for StateSlice<S, C, F> {
    fn clone(&self) -> Self {
        Self {
            local: self.local.clone(),
            selector: Rc::clone(&self.selector),
            _component: PhantomData,
        }
    }
}

pub fn with_state_slice<S, C, F>(
    local: StaticCompositionLocal<State<S>>,
    selector: F,
) -> StateSlice<S, C, F>
where
    S: Clone + 'static,
    C: SliceComponent,
    F: Fn(&S, &C::Props) -> C::Slice + 'static,
{
    StateSlice {
        local,
        selector: Rc::new(selector),
        _component: PhantomData,
    }
}

impl<S, C, F> StateSlice<S, C, F>
where
    S: Clone + 'static,
    C: SliceComponent,
    F: Fn(&S, &C::Props) -> C::Slice + 'static,
{
    /// Renders one instance. Skipped entirely while `props` are unchanged and
    /// the state was not written.
    #[track_caller]
    pub fn render(&self, props: C::Props) {
        let local = self.local.clone();
        let selector = Rc::clone(&self.selector);
        memo(props, move |props: &C::Props| {
            let state = local.current();
            let slice = state.with(|shared| selector(shared, props));
            memo((props.clone(), slice), |(props, slice): &(C::Props, C::Slice)| {
                C::render(props, slice)
            });
        });
    }
}
