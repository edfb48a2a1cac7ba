use super::*;
use perfkit_foundation::LazyModule;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn gated_module(gate: &Arc<AtomicBool>) -> LazyModule<String> {
    let gate = Arc::clone(gate);
    LazyModule::new("heavy", move || {
        while !gate.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Ok("heavy content".to_string())
    })
}

#[test]
fn fallback_replaces_partial_output_while_pending() {
    let gate = Arc::new(AtomicBool::new(false));
    let module = gated_module(&gate);
    let mut shell = AppShell::default();
    let module_in = module.clone();
    shell
        .set_content(move || {
            let module = module_in.clone();
            Suspense(
                || Text("...loading", Modifier::empty()),
                move || {
                    Text("header", Modifier::empty());
                    let content = module.suspend()?;
                    Text(content, Modifier::empty());
                    Ok(())
                },
            );
        })
        .expect("render");

    let tree = shell.view_tree();
    assert!(tree.contains_text("...loading"));
    assert!(!tree.contains_text("header"), "partial output is dropped");

    gate.store(true, Ordering::SeqCst);
    shell.wait_for_background().expect("load");
    let tree = shell.view_tree();
    assert!(tree.contains_text("header"));
    assert!(tree.contains_text("heavy content"));
    assert!(!tree.contains_text("...loading"));
}

#[test]
fn failed_load_renders_the_error_view() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_in = Arc::clone(&attempts);
    let module = LazyModule::new("heavy", move || {
        attempts_in.fetch_add(1, Ordering::SeqCst);
        Err::<String, _>("disk on fire".to_string())
    });
    let mut shell = AppShell::default();
    let module_in = module.clone();
    shell
        .set_content(move || {
            let module = module_in.clone();
            Suspense(
                || Text("...loading", Modifier::empty()),
                move || {
                    Text(module.suspend()?, Modifier::empty());
                    Ok(())
                },
            );
        })
        .expect("render");
    shell.wait_for_background().expect("load");

    let tree = shell.view_tree();
    let error = tree.find_by_tag("suspense-error").expect("error view");
    assert_eq!(
        error.element.text.as_deref(),
        Some("failed to load heavy: disk on fire")
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1, "no automatic retry");
}
