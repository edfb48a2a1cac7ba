use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

thread_local! {
    static PARENT_RUNS: Cell<usize> = const { Cell::new(0) };
    static CHILD_RUNS: Cell<usize> = const { Cell::new(0) };
    static CAPTURED_STATE: RefCell<Option<MutableState<i32>>> = const { RefCell::new(None) };
}

fn text(value: impl Into<String>) {
    emit(Element::new(ElementKind::Text).text(value));
}

fn texts(composition: &Composition) -> Vec<String> {
    composition
        .view_tree()
        .nodes()
        .into_iter()
        .filter_map(|node| node.element.text.clone())
        .collect()
}

#[test]
fn render_without_content_fails() {
    let mut composition = Composition::new();
    assert_eq!(composition.render(), Err(ComposeError::NoContent));
}

#[test]
fn remember_survives_rerender() {
    let inits = Rc::new(Cell::new(0));
    let mut composition = Composition::new();
    let counter = Rc::clone(&inits);
    composition
        .set_content(move || {
            let counter = Rc::clone(&counter);
            let value = remember(move || {
                counter.set(counter.get() + 1);
                41
            });
            text(format!("value {}", value.get() + 1));
        })
        .expect("initial render");
    composition.render().expect("second render");
    composition.render().expect("third render");

    assert_eq!(inits.get(), 1);
    assert_eq!(texts(&composition), vec!["value 42".to_string()]);
}

#[test]
fn memo_skips_when_props_are_equal() {
    let runs = Rc::new(Cell::new(0));
    let props = Rc::new(Cell::new(1));
    let mut composition = Composition::new();
    let (runs_in, props_in) = (Rc::clone(&runs), Rc::clone(&props));
    composition
        .set_content(move || {
            let runs = Rc::clone(&runs_in);
            memo(props_in.get(), move |value: &i32| {
                runs.set(runs.get() + 1);
                text(format!("memo {value}"));
            });
        })
        .expect("initial render");
    assert_eq!(runs.get(), 1);

    composition.render().expect("same props");
    assert_eq!(runs.get(), 1, "equal props must skip the body");
    assert_eq!(texts(&composition), vec!["memo 1".to_string()]);

    props.set(2);
    composition.render().expect("new props");
    assert_eq!(runs.get(), 2);
    assert_eq!(texts(&composition), vec!["memo 2".to_string()]);
}

#[test]
fn state_write_recomposes_only_the_reader() {
    PARENT_RUNS.with(|runs| runs.set(0));
    CHILD_RUNS.with(|runs| runs.set(0));
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            PARENT_RUNS.with(|runs| runs.set(runs.get() + 1));
            let count = useState(|| 0);
            CAPTURED_STATE.with(|slot| *slot.borrow_mut() = Some(count.clone()));
            memo((), move |_| {
                CHILD_RUNS.with(|runs| runs.set(runs.get() + 1));
                text(format!("count {}", count.get()));
            });
        })
        .expect("initial render");

    let state = CAPTURED_STATE.with(|slot| slot.borrow().clone()).expect("state captured");
    state.set(5);
    assert!(composition.process_invalid_scopes().expect("recompose"));

    assert_eq!(PARENT_RUNS.with(Cell::get), 1);
    assert_eq!(CHILD_RUNS.with(Cell::get), 2);
    assert_eq!(texts(&composition), vec!["count 5".to_string()]);
}

#[test]
fn keyed_groups_keep_state_when_reordered() {
    let order = Rc::new(RefCell::new(vec!["a", "b"]));
    let mut composition = Composition::new();
    let order_in = Rc::clone(&order);
    composition
        .set_content(move || {
            for name in order_in.borrow().iter() {
                with_key(name, || {
                    let label = remember(|| format!("{name}-state"));
                    text(label.get());
                });
            }
        })
        .expect("initial render");

    order.borrow_mut().reverse();
    composition.render().expect("reordered render");
    assert_eq!(
        texts(&composition),
        vec!["b-state".to_string(), "a-state".to_string()]
    );
}

struct DropProbe(Rc<Cell<usize>>);

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn leaving_groups_drop_remembered_values() {
    let drops = Rc::new(Cell::new(0));
    let show = Rc::new(Cell::new(true));
    let mut composition = Composition::new();
    let (drops_in, show_in) = (Rc::clone(&drops), Rc::clone(&show));
    composition
        .set_content(move || {
            if show_in.get() {
                group(|| {
                    let drops = Rc::clone(&drops_in);
                    remember(move || DropProbe(drops));
                    text("shown");
                });
            }
        })
        .expect("initial render");
    assert_eq!(drops.get(), 0);

    show.set(false);
    composition.render().expect("hide");
    assert_eq!(drops.get(), 1);
    assert!(texts(&composition).is_empty());
}

#[test]
fn containers_nest_their_content() {
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            container(Element::new(ElementKind::Column).test_tag("outer"), || {
                text("first");
                container(Element::new(ElementKind::Row), || text("inner"));
            });
        })
        .expect("render");

    let tree = composition.view_tree();
    assert_eq!(tree.roots().len(), 1);
    let outer = tree.find_by_tag("outer").expect("outer column");
    assert_eq!(outer.children.len(), 2);
    assert_eq!(outer.children[1].element.kind, ElementKind::Row);
    assert_eq!(outer.text_content(), "firstinner");
    assert_eq!(tree.dump(), "column#outer\n  text \"first\"\n  row\n    text \"inner\"\n");
}

#[test]
fn discarded_output_is_not_rendered() {
    let mut composition = Composition::new();
    composition
        .set_content(|| {
            group(|| {
                text("partial");
                with_current_composer(|composer| composer.discard_emitted());
                text("fallback");
            });
        })
        .expect("render");
    assert_eq!(texts(&composition), vec!["fallback".to_string()]);
}

#[test]
fn skipped_groups_keep_their_output() {
    let mut composition = Composition::new();
    let ticks = Rc::new(Cell::new(0));
    let ticks_in = Rc::clone(&ticks);
    composition
        .set_content(move || {
            ticks_in.set(ticks_in.get() + 1);
            text(format!("tick {}", ticks_in.get()));
            memo("static", |label: &&str| text(*label));
        })
        .expect("render");
    composition.render().expect("rerender");
    assert_eq!(
        texts(&composition),
        vec!["tick 2".to_string(), "static".to_string()]
    );
}

#[test]
fn self_invalidating_scope_reports_a_loop() {
    let mut composition = Composition::new();
    let result = composition.set_content(|| {
        let state = useState(|| 0);
        let value = state.get();
        state.set(value + 1);
    });
    assert!(matches!(result, Err(ComposeError::RecomposeLoop { .. })));
}
