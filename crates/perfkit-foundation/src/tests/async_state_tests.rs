use super::*;
use perfkit_core::{emit, CancelToken, Composition, Element, ElementKind};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn settle(composition: &mut Composition) {
    let handle = composition.runtime_handle();
    for _ in 0..1000 {
        composition.process_invalid_scopes().expect("recompose");
        if !handle.has_background_work() && handle.is_idle() {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("composition did not settle");
}

#[test]
fn resolves_after_the_worker_finishes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut composition = Composition::new();
    let seen_in = Rc::clone(&seen);
    composition
        .set_content(move || {
            let result = use_async(7u32, |_token: CancelToken| Ok(7u32 * 6));
            seen_in.borrow_mut().push(result.status.clone());
            if let Some(value) = result.data {
                emit(Element::new(ElementKind::Text).text(format!("answer {value}")));
            }
        })
        .expect("render");
    settle(&mut composition);

    assert!(composition.view_tree().contains_text("answer 42"));
    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&AsyncStatus::Idle));
    assert!(seen.contains(&AsyncStatus::Pending));
    assert_eq!(seen.last(), Some(&AsyncStatus::Resolved));
}

#[test]
fn superseded_runs_never_land() {
    let gate = Arc::new(AtomicBool::new(false));
    let query = Rc::new(RefCell::new("a".to_string()));
    let results = Rc::new(RefCell::new(Vec::new()));
    let mut composition = Composition::new();
    let (gate_in, query_in, results_in) =
        (Arc::clone(&gate), Rc::clone(&query), Rc::clone(&results));
    composition
        .set_content(move || {
            let current = query_in.borrow().clone();
            let gate = Arc::clone(&gate_in);
            let key = current.clone();
            let result = use_async(key, move |token: CancelToken| {
                while !gate.load(Ordering::SeqCst) && token.is_active() {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Ok(current.to_uppercase())
            });
            if let Some(data) = &result.data {
                results_in.borrow_mut().push(data.clone());
            }
        })
        .expect("render");

    *query.borrow_mut() = "ab".to_string();
    composition.render().expect("new query");
    gate.store(true, Ordering::SeqCst);
    settle(&mut composition);

    let results = results.borrow();
    assert!(!results.contains(&"A".to_string()));
    assert_eq!(results.last().map(String::as_str), Some("AB"));
}

#[test]
fn failures_are_reported_and_keep_old_data() {
    let fail = Rc::new(Cell::new(false));
    let last = Rc::new(RefCell::new(None));
    let mut composition = Composition::new();
    let (fail_in, last_in) = (Rc::clone(&fail), Rc::clone(&last));
    composition
        .set_content(move || {
            let should_fail = fail_in.get();
            let result = use_async(should_fail, move |_token: CancelToken| {
                if should_fail {
                    Err("boom".to_string())
                } else {
                    Ok(1u8)
                }
            });
            *last_in.borrow_mut() = Some(result);
        })
        .expect("render");
    settle(&mut composition);

    fail.set(true);
    composition.render().expect("failing run");
    settle(&mut composition);

    let last = last.borrow().clone().expect("state observed");
    assert_eq!(last.status, AsyncStatus::Rejected("boom".to_string()));
    assert_eq!(last.data, Some(1));
}
