use super::*;
use perfkit_core::{container, emit, KeyPress};
use std::cell::RefCell;
use std::rc::Rc;

fn fruit_shell(selected: Rc<RefCell<Vec<Option<String>>>>, highlights: Rc<RefCell<Vec<Option<usize>>>>) -> AppShell {
    let mut shell = AppShell::default();
    shell
        .set_content(move || {
            let items: Rc<[String]> = ["apple", "banana", "cherry"]
                .map(String::from)
                .into_iter()
                .collect();
            let (selected, highlights) = (Rc::clone(&selected), Rc::clone(&highlights));
            let combobox = useCombobox(
                ComboboxOptions::new("fruit", Rc::clone(&items), |item: &String| item.clone())
                    .on_selected_item_change(move |item| selected.borrow_mut().push(item))
                    .on_highlighted_index_change(move |index| highlights.borrow_mut().push(index)),
            );
            emit(combobox.label_element("Fruit").test_tag("label"));
            emit(combobox.input_element().test_tag("input"));
            container(combobox.menu_element().test_tag("menu"), || {
                if combobox.is_open() {
                    for (index, item) in items.iter().enumerate() {
                        emit(
                            combobox
                                .item_element(index)
                                .text(item.clone())
                                .test_tag(format!("item-{index}")),
                        );
                    }
                }
            });
        })
        .expect("render");
    shell
}

#[test]
fn keyboard_selection_notifies_listeners() {
    let selected = Rc::new(RefCell::new(Vec::new()));
    let highlights = Rc::new(RefCell::new(Vec::new()));
    let mut shell = fruit_shell(Rc::clone(&selected), Rc::clone(&highlights));

    shell.key("input", KeyPress::ArrowDown).expect("open");
    shell.key("input", KeyPress::ArrowDown).expect("next");
    let tree = shell.view_tree();
    let input = tree.find_by_tag("input").expect("input");
    assert_eq!(input.element.attr_value("aria-expanded"), Some("true"));
    assert_eq!(
        input.element.attr_value("aria-activedescendant"),
        Some("fruit-item-1")
    );
    let banana = tree.find_by_tag("item-1").expect("banana row");
    assert_eq!(banana.element.attr_value("aria-selected"), Some("true"));

    shell.key("input", KeyPress::Enter).expect("select");
    assert_eq!(*selected.borrow(), vec![Some("banana".to_string())]);
    assert_eq!(*highlights.borrow(), vec![Some(0), Some(1), None]);
    let tree = shell.view_tree();
    assert_eq!(
        tree.find_by_tag("input").and_then(|node| node.element.attr_value("value").map(str::to_string)),
        Some("banana".to_string())
    );
    assert!(tree.find_by_tag("item-0").is_none(), "menu closes after selecting");
}

#[test]
fn typing_and_clicking() {
    let selected = Rc::new(RefCell::new(Vec::new()));
    let mut shell = fruit_shell(Rc::clone(&selected), Rc::new(RefCell::new(Vec::new())));

    shell.input("input", "ch").expect("type");
    assert!(shell.view_tree().find_by_tag("item-2").is_some());
    shell.hover("item-2").expect("hover");
    shell.click("item-2").expect("click");

    assert_eq!(*selected.borrow(), vec![Some("cherry".to_string())]);
    let tree = shell.view_tree();
    let label = tree.find_by_tag("label").expect("label");
    assert_eq!(label.element.attr_value("for"), Some("fruit-input"));
}
