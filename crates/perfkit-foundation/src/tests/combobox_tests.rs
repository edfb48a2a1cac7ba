use super::*;

fn cities() -> Vec<String> {
    ["Berlin", "Bern", "Bergen"].map(String::from).to_vec()
}

fn step(state: &ComboboxState<String>, event: ComboboxEvent<String>) -> ComboboxState<String> {
    combobox_reducer(state, event, &cities(), &|item: &String| item.clone())
}

#[test]
fn typing_opens_the_menu_and_clears_highlight() {
    let state = ComboboxState {
        highlighted_index: Some(1),
        ..ComboboxState::default()
    };
    let next = step(&state, ComboboxEvent::InputChanged("ber".into()));
    assert_eq!(next.input_value, "ber");
    assert!(next.is_open);
    assert_eq!(next.highlighted_index, None);
}

#[test]
fn arrow_keys_wrap_around() {
    let open = step(&ComboboxState::default(), ComboboxEvent::ArrowDown);
    assert!(open.is_open);
    assert_eq!(open.highlighted_index, Some(0));

    let second = step(&open, ComboboxEvent::ArrowDown);
    let third = step(&second, ComboboxEvent::ArrowDown);
    assert_eq!(third.highlighted_index, Some(2));
    assert_eq!(step(&third, ComboboxEvent::ArrowDown).highlighted_index, Some(0));

    assert_eq!(step(&open, ComboboxEvent::ArrowUp).highlighted_index, Some(2));
    let closed_up = step(&ComboboxState::default(), ComboboxEvent::ArrowUp);
    assert_eq!(closed_up.highlighted_index, Some(2));
}

#[test]
fn enter_selects_the_highlighted_item() {
    let state = ComboboxState {
        is_open: true,
        highlighted_index: Some(1),
        ..ComboboxState::default()
    };
    let next = step(&state, ComboboxEvent::Enter);
    assert_eq!(next.selected_item.as_deref(), Some("Bern"));
    assert_eq!(next.input_value, "Bern");
    assert!(!next.is_open);
    assert_eq!(next.highlighted_index, None);

    let nothing_highlighted = step(&ComboboxState { is_open: true, ..ComboboxState::default() }, ComboboxEvent::Enter);
    assert_eq!(nothing_highlighted.selected_item, None);
}

#[test]
fn clicking_and_hovering_items() {
    let open = step(&ComboboxState::default(), ComboboxEvent::ToggleMenu);
    let hovered = step(&open, ComboboxEvent::ItemHover(2));
    assert_eq!(hovered.highlighted_index, Some(2));
    assert_eq!(step(&hovered, ComboboxEvent::ItemHover(9)).highlighted_index, Some(2));

    let clicked = step(&hovered, ComboboxEvent::ItemClick(0));
    assert_eq!(clicked.selected_item.as_deref(), Some("Berlin"));
    assert!(!clicked.is_open);
}

#[test]
fn escape_and_blur_close_without_selecting() {
    let state = ComboboxState {
        is_open: true,
        highlighted_index: Some(0),
        input_value: "be".into(),
        ..ComboboxState::default()
    };
    for event in [ComboboxEvent::Escape, ComboboxEvent::Blur] {
        let next = step(&state, event);
        assert!(!next.is_open);
        assert_eq!(next.highlighted_index, None);
        assert_eq!(next.selected_item, None);
        assert_eq!(next.input_value, "be");
    }
}

#[test]
fn clearing_the_selection_empties_the_input() {
    let selected = step(&ComboboxState::default(), ComboboxEvent::SelectItem(Some("Bergen".into())));
    assert_eq!(selected.input_value, "Bergen");
    let cleared = step(&selected, ComboboxEvent::SelectItem(None));
    assert_eq!(cleared.input_value, "");
    assert_eq!(cleared.selected_item, None);
}

#[test]
fn highlight_is_dropped_when_items_shrink() {
    let state = ComboboxState::<String> {
        is_open: true,
        highlighted_index: Some(2),
        ..ComboboxState::default()
    };
    let next = combobox_reducer(&state, ComboboxEvent::ItemHover(5), &cities()[..1], &|item: &String| item.clone());
    assert_eq!(next.highlighted_index, None);
}

#[test]
fn prop_bags_describe_the_widget() {
    let ids = ComboboxIds::new("city");
    let mut state = ComboboxState::<String>::default();
    let input = ids.input_props(&state);
    assert_eq!(input.id, "city-input");
    assert_eq!(input.get("role"), Some("combobox"));
    assert_eq!(input.get("aria-expanded"), Some("false"));
    assert_eq!(input.get("aria-activedescendant"), None);

    state.is_open = true;
    state.highlighted_index = Some(3);
    let input = ids.input_props(&state);
    assert_eq!(input.get("aria-activedescendant"), Some("city-item-3"));
    assert_eq!(ids.item_props(3, &state).get("aria-selected"), Some("true"));
    assert_eq!(ids.item_props(2, &state).get("aria-selected"), Some("false"));
    assert_eq!(ids.menu_props().get("role"), Some("listbox"));
    assert_eq!(ids.label_props().get("for"), Some("city-input"));
}
