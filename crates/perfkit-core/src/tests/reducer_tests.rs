use super::*;
use std::cell::{Cell, RefCell};

#[derive(Debug)]
enum CounterAction {
    Increment,
    Add(i32),
    #[allow(dead_code)]
    Reset { to: i32 },
}

fn counter_reducer(state: &i32, action: CounterAction) -> Result<i32, ReducerError> {
    match action {
        CounterAction::Increment => Ok(state + 1),
        CounterAction::Add(amount) if amount >= 0 => Ok(state + amount),
        action @ CounterAction::Add(_) => Err(ReducerError::rejected(&action, "negative amount")),
        action @ CounterAction::Reset { .. } => Err(ReducerError::unhandled(&action)),
    }
}

thread_local! {
    static DISPATCH: RefCell<Option<Dispatch<CounterAction>>> = const { RefCell::new(None) };
    static READS: Cell<usize> = const { Cell::new(0) };
}

fn compose_counter() -> Composition {
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            let (state, dispatch) = useReducer(counter_reducer, || 0);
            DISPATCH.with(|slot| *slot.borrow_mut() = Some(dispatch));
            memo(state, |state: &State<i32>| {
                READS.with(|reads| reads.set(reads.get() + 1));
                emit(Element::new(ElementKind::Text).text(format!("count {}", state.get())));
            });
        })
        .expect("render");
    composition
}

fn dispatcher() -> Dispatch<CounterAction> {
    DISPATCH
        .with(|slot| slot.borrow().clone())
        .expect("dispatch captured")
}

#[test]
fn dispatch_updates_readers() {
    READS.with(|reads| reads.set(0));
    let mut composition = compose_counter();
    let dispatch = dispatcher();
    dispatch.dispatch(CounterAction::Increment);
    dispatch.dispatch(CounterAction::Add(4));
    composition.process_invalid_scopes().expect("recompose");

    assert!(composition.view_tree().contains_text("count 5"));
    assert_eq!(READS.with(Cell::get), 2);
}

#[test]
fn dispatch_is_stable_across_renders() {
    let mut composition = compose_counter();
    let first = dispatcher();
    composition.render().expect("rerender");
    assert_eq!(first, dispatcher());
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut composition = compose_counter();
    let dispatch = dispatcher();
    let err = dispatch
        .try_dispatch(CounterAction::Add(-1))
        .expect_err("negative add is rejected");
    assert_eq!(
        err,
        ReducerError::Rejected {
            action: "Add".into(),
            reason: "negative amount".into()
        }
    );
    composition.process_invalid_scopes().expect("recompose");
    assert!(composition.view_tree().contains_text("count 0"));
}

#[test]
#[should_panic(expected = "Unhandled action type: Reset")]
fn unhandled_action_panics() {
    let _composition = compose_counter();
    dispatcher().dispatch(CounterAction::Reset { to: 3 });
}
