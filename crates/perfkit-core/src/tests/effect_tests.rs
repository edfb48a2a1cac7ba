use super::*;
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
fn launched_effect_runs_once_per_key() {
    let runs = Rc::new(RefCell::new(Vec::new()));
    let key = Rc::new(Cell::new(1));
    let mut composition = Composition::new();
    let (runs_in, key_in) = (Rc::clone(&runs), Rc::clone(&key));
    composition
        .set_content(move || {
            let current = key_in.get();
            let runs = Rc::clone(&runs_in);
            LaunchedEffect!(current, move |_scope: LaunchedEffectScope| {
                runs.borrow_mut().push(current);
            });
        })
        .expect("initial render");
    composition.render().expect("same key");
    assert_eq!(*runs.borrow(), vec![1]);

    key.set(2);
    composition.render().expect("new key");
    assert_eq!(*runs.borrow(), vec![1, 2]);
}

#[test]
fn relaunch_drops_stale_background_results() {
    let gate = Arc::new(AtomicBool::new(false));
    let results = Rc::new(RefCell::new(Vec::new()));
    let key = Rc::new(Cell::new(1u32));
    let mut composition = Composition::new();
    let (gate_in, results_in, key_in) = (Arc::clone(&gate), Rc::clone(&results), Rc::clone(&key));
    composition
        .set_content(move || {
            let current = key_in.get();
            let gate = Arc::clone(&gate_in);
            let results = Rc::clone(&results_in);
            LaunchedEffect!(current, move |scope: LaunchedEffectScope| {
                scope.launch_background(
                    move |_token| {
                        while !gate.load(Ordering::SeqCst) {
                            std::thread::sleep(Duration::from_millis(1));
                        }
                        current * 10
                    },
                    move |value| results.borrow_mut().push(value),
                );
            });
        })
        .expect("initial render");

    key.set(2);
    composition.render().expect("relaunch");
    gate.store(true, Ordering::SeqCst);
    settle(&mut composition);

    assert_eq!(*results.borrow(), vec![20]);
}

#[test]
fn background_result_is_dropped_after_leaving_composition() {
    let gate = Arc::new(AtomicBool::new(false));
    let delivered = Rc::new(Cell::new(false));
    let show = Rc::new(Cell::new(true));
    let mut composition = Composition::new();
    let (gate_in, delivered_in, show_in) =
        (Arc::clone(&gate), Rc::clone(&delivered), Rc::clone(&show));
    composition
        .set_content(move || {
            if !show_in.get() {
                return;
            }
            let gate = Arc::clone(&gate_in);
            let delivered = Rc::clone(&delivered_in);
            LaunchedEffect!((), move |scope: LaunchedEffectScope| {
                scope.launch_background(
                    move |token: CancelToken| {
                        while !gate.load(Ordering::SeqCst) && token.is_active() {
                            std::thread::sleep(Duration::from_millis(1));
                        }
                    },
                    move |()| delivered.set(true),
                );
            });
        })
        .expect("initial render");

    show.set(false);
    composition.render().expect("hide");
    gate.store(true, Ordering::SeqCst);
    settle(&mut composition);

    assert!(!delivered.get());
}

#[test]
fn async_effect_resumes_on_next_frame() {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let mut composition = Composition::new();
    let frames_in = Rc::clone(&frames);
    composition
        .set_content(move || {
            let frames = Rc::clone(&frames_in);
            LaunchedEffectAsync!((), move |scope: LaunchedEffectScope| {
                let clock = scope.runtime().frame_clock();
                Box::pin(async move {
                    let time = clock.next_frame().await;
                    frames.borrow_mut().push(time);
                })
            });
        })
        .expect("initial render");
    assert!(frames.borrow().is_empty());

    let handle = composition.runtime_handle();
    handle.drain_frame_callbacks(16_000_000);
    composition.process_invalid_scopes().expect("poll");
    assert_eq!(*frames.borrow(), vec![16_000_000]);
    assert_eq!(handle.last_frame_nanos(), 16_000_000);
}

#[test]
fn disposable_effect_cleans_up_when_leaving() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let show = Rc::new(Cell::new(true));
    let mut composition = Composition::new();
    let (log_in, show_in) = (Rc::clone(&log), Rc::clone(&show));
    composition
        .set_content(move || {
            if show_in.get() {
                let log = Rc::clone(&log_in);
                DisposableEffect!((), move || {
                    log.borrow_mut().push("start");
                    DisposableEffectResult::on_dispose(move || log.borrow_mut().push("dispose"))
                });
            }
        })
        .expect("initial render");
    assert_eq!(*log.borrow(), vec!["start"]);

    show.set(false);
    composition.render().expect("hide");
    assert_eq!(*log.borrow(), vec!["start", "dispose"]);
}

#[test]
fn side_effect_runs_after_every_pass() {
    let count = Rc::new(Cell::new(0));
    let mut composition = Composition::new();
    let count_in = Rc::clone(&count);
    composition
        .set_content(move || {
            let count = Rc::clone(&count_in);
            SideEffect(move || count.set(count.get() + 1));
        })
        .expect("initial render");
    composition.render().expect("rerender");
    assert_eq!(count.get(), 2);
}
