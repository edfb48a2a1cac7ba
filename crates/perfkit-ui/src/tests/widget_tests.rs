use super::*;
use perfkit_core::useState;

#[test]
fn checkbox_toggles_through_its_handler() {
    let mut shell = AppShell::default();
    shell
        .set_content(|| {
            let checked = useState(|| false);
            let target = checked.clone();
            Column(Modifier::empty().test_tag("root"), || {
                Checkbox(
                    checked.get(),
                    "show globe",
                    Modifier::empty().test_tag("toggle"),
                    move |value| target.set(value),
                );
                if checked.get() {
                    Text("checked", Modifier::empty());
                }
            });
        })
        .expect("render");
    assert!(!shell.view_tree().contains_text("checked"));

    shell.click("toggle").expect("click");
    let tree = shell.view_tree();
    assert!(tree.contains_text("checked"));
    let toggle = tree.find_by_tag("toggle").expect("checkbox");
    assert_eq!(toggle.element.attr_value("checked"), Some("true"));
}

#[test]
fn number_input_ignores_garbage() {
    let mut shell = AppShell::default();
    shell
        .set_content(|| {
            let rows = useState(|| 50i64);
            let target = rows.clone();
            NumberInput(rows.get(), Modifier::empty().test_tag("rows"), move |value| {
                target.set(value)
            });
            Text(format!("rows {}", rows.get()), Modifier::empty());
        })
        .expect("render");

    shell.input("rows", "abc").expect("input");
    assert!(shell.view_tree().contains_text("rows 50"));
    shell.input("rows", " 12 ").expect("input");
    assert!(shell.view_tree().contains_text("rows 12"));
}

#[test]
fn modifier_handlers_and_attributes_reach_the_element() {
    let hovered = std::rc::Rc::new(std::cell::Cell::new(false));
    let hovered_in = std::rc::Rc::clone(&hovered);
    let mut shell = AppShell::default();
    shell
        .set_content(move || {
            let hovered = std::rc::Rc::clone(&hovered_in);
            Form(Modifier::empty().test_tag("form"), || {
                Label("Name", "name-input", Modifier::empty());
                Button(
                    "Go",
                    Modifier::empty()
                        .test_tag("go")
                        .attr("aria-label", "go")
                        .on_hover(move || hovered.set(true)),
                    || {},
                );
            });
        })
        .expect("render");

    shell.hover("go").expect("hover");
    assert!(hovered.get());
    assert_eq!(
        shell.dump(),
        "form#form\n  label \"Name\" for=\"name-input\"\n  button#go \"Go\" aria-label=\"go\"\n"
    );
}
