use super::*;
use perfkit_core::{memo, useState, MutableState};
use perfkit_ui::{record_render, Button, Modifier, Text};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn rule_counts_renders_through_the_probe() {
    run_test_composition(|rule| {
        let captured: Rc<RefCell<Option<MutableState<i32>>>> = Rc::new(RefCell::new(None));
        let captured_in = Rc::clone(&captured);
        rule.set_content(move || {
            record_render("root");
            let count = useState(|| 0);
            *captured_in.borrow_mut() = Some(count.clone());
            memo(count.get(), |value: &i32| {
                record_render("label");
                Text(format!("count {value}"), Modifier::empty());
            });
            memo((), |_| {
                record_render("static");
                Text("static", Modifier::empty());
            });
        })
        .expect("install content");

        let count = captured.borrow().clone().expect("state");
        count.set(1);
        rule.pump_until_idle().expect("settle");

        let probe = rule.render_probe();
        assert_eq!(probe.count("root"), 2);
        assert_eq!(probe.count("label"), 2);
        assert_eq!(probe.count("static"), 1);
        assert_eq!(rule.texts(), vec!["count 1".to_string(), "static".to_string()]);
    });
}

#[test]
fn node_lookup_reports_missing_tags() {
    run_test_composition(|rule| {
        rule.set_content(|| Button("ok", Modifier::empty().test_tag("ok"), || {}))
            .expect("install content");
        assert!(rule.node_with_tag("ok").is_ok());
        assert_eq!(
            rule.node_with_tag("cancel").map(|_| ()),
            Err(ShellError::UnknownTag("cancel".into()))
        );
        assert_eq!(rule.count_kind(ElementKind::Button), 1);
    });
}

#[test]
fn robot_types_and_waits() {
    let mut robot = crate::Robot::launch(|| {
        let name = useState(String::new);
        let target = name.clone();
        perfkit_ui::TextInput(&name.get(), Modifier::empty().test_tag("name"), move |value| {
            target.set(value)
        });
        Text(format!("hello {}", name.get()), Modifier::empty());
    })
    .expect("launch");

    robot.type_text("name", "ferris").expect("type");
    assert!(robot.wait_for_text("hello ferris", 2).expect("wait"));
    assert!(robot.snapshot().contains("value=\"ferris\""));
}
