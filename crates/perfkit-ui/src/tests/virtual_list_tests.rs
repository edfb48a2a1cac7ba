use super::*;
use perfkit_foundation::{remember_virtual_list_state, ScrollAlign, VirtualListState};
use std::cell::RefCell;
use std::rc::Rc;

fn city_list(count: usize, captured: Rc<RefCell<Option<VirtualListState>>>) -> AppShell {
    let mut shell = AppShell::default();
    shell
        .set_content(move || {
            let state = remember_virtual_list_state();
            *captured.borrow_mut() = Some(state.clone());
            VirtualList(
                count,
                &state,
                VirtualListSpec::new(300.0)
                    .overscan(10)
                    .modifier(Modifier::empty().test_tag("list")),
                |_| 20.0,
                |item| Text(format!("row {}", item.index), Modifier::empty()),
            );
        })
        .expect("render");
    shell
}

#[test]
fn renders_only_the_window() {
    for count in [100, 10_000] {
        let shell = city_list(count, Rc::new(RefCell::new(None)));
        let tree = shell.view_tree();
        assert_eq!(tree.count_kind(ElementKind::ListItem), 25, "{count} items");
        let list = tree.find_by_tag("list").expect("list");
        assert_eq!(
            list.element.attr_value("total-size"),
            Some((count as f32 * 20.0).to_string().as_str())
        );
    }
}

#[test]
fn scrolling_moves_the_window() {
    let mut shell = city_list(100, Rc::new(RefCell::new(None)));
    shell.scroll("list", 1000.0).expect("scroll");

    let tree = shell.view_tree();
    assert_eq!(tree.count_kind(ElementKind::ListItem), 35);
    assert!(tree.contains_text("row 40"));
    assert!(tree.contains_text("row 74"));
    assert!(!tree.contains_text("row 39"));
    let first = tree
        .find_all(|node| node.element.kind == ElementKind::ListItem)
        .into_iter()
        .next()
        .expect("first row");
    assert_eq!(first.element.attr_value("top"), Some("800"));
}

#[test]
fn scroll_to_index_brings_row_into_view() {
    let captured = Rc::new(RefCell::new(None));
    let mut shell = city_list(100, Rc::clone(&captured));
    let state = captured.borrow().clone().expect("state captured");

    state.scroll_to_index(60, ScrollAlign::Auto);
    shell.pump().expect("pump");

    let tree = shell.view_tree();
    assert!(tree.contains_text("row 60"));
    let list = tree.find_by_tag("list").expect("list");
    assert_eq!(list.element.attr_value("scroll-offset"), Some("920"));
}
