use super::*;
use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

fn text(value: impl Into<String>) {
    emit(Element::new(ElementKind::Text).text(value));
}

thread_local! {
    static THEME: CompositionLocal<String> = compositionLocalOf(|| "light".to_string());
    static SESSION: StaticCompositionLocal<u32> = requiredStaticCompositionLocalOf("Session");
    static READER_RUNS: Cell<usize> = const { Cell::new(0) };
}

fn theme() -> CompositionLocal<String> {
    THEME.with(Clone::clone)
}

fn session() -> StaticCompositionLocal<u32> {
    SESSION.with(Clone::clone)
}

#[test]
fn default_is_used_without_provider() {
    let mut composition = Composition::new();
    composition
        .set_content(|| text(theme().current()))
        .expect("render");
    assert!(composition.view_tree().contains_text("light"));
}

#[test]
fn provided_value_reaches_nested_readers() {
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            CompositionLocalProvider([theme().provides("dark".to_string())], || {
                group(|| text(theme().current()));
            });
            text(theme().current());
        })
        .expect("render");
    let tree = composition.view_tree();
    let texts: Vec<_> = tree
        .nodes()
        .into_iter()
        .filter_map(|node| node.element.text.clone())
        .collect();
    assert_eq!(texts, vec!["dark".to_string(), "light".to_string()]);
}

#[test]
fn changing_a_provided_value_recomposes_skipped_readers() {
    READER_RUNS.with(|runs| runs.set(0));
    let value = Rc::new(RefCell::new("dark".to_string()));
    let mut composition = Composition::new();
    let value_in = Rc::clone(&value);
    composition
        .set_content(move || {
            CompositionLocalProvider([theme().provides(value_in.borrow().clone())], || {
                memo((), |_| {
                    READER_RUNS.with(|runs| runs.set(runs.get() + 1));
                    text(theme().current());
                });
            });
        })
        .expect("render");

    composition.render().expect("same value");
    assert_eq!(READER_RUNS.with(Cell::get), 1);

    *value.borrow_mut() = "sepia".to_string();
    composition.render().expect("new value");
    assert_eq!(READER_RUNS.with(Cell::get), 2);
    assert!(composition.view_tree().contains_text("sepia"));
}

#[test]
fn required_local_outside_provider_is_fatal() {
    let mut composition = Composition::new();
    let observed = Rc::new(RefCell::new(None));
    let observed_in = Rc::clone(&observed);
    composition
        .set_content(move || {
            *observed_in.borrow_mut() = Some(session().try_current());
        })
        .expect("render");
    assert_eq!(
        observed.borrow_mut().take(),
        Some(Err(LocalError::MissingProvider { name: "Session" }))
    );

    let mut composition = Composition::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _ = composition.set_content(|| {
            session().current();
        });
    }));
    let payload = outcome.expect_err("reading a required local must panic");
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert_eq!(message, "Session must be used within a provider");
}

#[test]
fn static_local_reads_provided_handle() {
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            CompositionLocalProvider([session().provides(7)], || {
                text(format!("session {}", session().current()));
            });
        })
        .expect("render");
    assert!(composition.view_tree().contains_text("session 7"));
}

#[test]
fn reading_outside_composition_is_an_error() {
    assert_eq!(
        session().try_current(),
        Err(LocalError::OutsideComposition { name: "Session" })
    );
}
