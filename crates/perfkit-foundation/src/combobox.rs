//! Headless combobox: a text input with a filterable listbox.
//!
//! [`combobox_reducer`] is the whole behaviour as a pure transition function;
//! the `*_props` helpers on [`ComboboxIds`] produce the accessibility
//! attributes each part needs. Rendering and event wiring live in the UI crate.

use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq)]
pub struct ComboboxState<T> {
    pub input_value: String,
    pub selected_item: Option<T>,
    pub highlighted_index: Option<usize>,
    pub is_open: bool,
}

impl<T> Default for ComboboxState<T> {
    fn default() -> Self {
        Self {
            input_value: String::new(),
            selected_item: None,
            highlighted_index: None,
            is_open: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComboboxEvent<T> {
    InputChanged(String),
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Blur,
    ItemClick(usize),
    ItemHover(usize),
    /// Selects an item programmatically; `None` clears the selection.
    SelectItem(Option<T>),
    ToggleMenu,
}

/// Applies `event` to `state` for the given item list.
pub fn combobox_reducer<T: Clone>(
    state: &ComboboxState<T>,
    event: ComboboxEvent<T>,
    items: &[T],
    item_to_string: &dyn Fn(&T) -> String,
) -> ComboboxState<T> {
    let count = items.len();
    let mut next = state.clone();
    match event {
        ComboboxEvent::InputChanged(value) => {
            next.input_value = value;
            next.is_open = true;
            next.highlighted_index = None;
        }
        ComboboxEvent::ArrowDown => {
            next.highlighted_index = if count == 0 {
                None
            } else if !state.is_open {
                Some(0)
            } else {
                Some(match state.highlighted_index {
                    Some(index) if index + 1 < count => index + 1,
                    _ => 0,
                })
            };
            next.is_open = true;
        }
        ComboboxEvent::ArrowUp => {
            next.highlighted_index = if count == 0 {
                None
            } else if !state.is_open {
                Some(count - 1)
            } else {
                Some(match state.highlighted_index {
                    Some(index) if index > 0 && index < count => index - 1,
                    _ => count - 1,
                })
            };
            next.is_open = true;
        }
        ComboboxEvent::Enter => {
            if let (true, Some(item)) = (
                state.is_open,
                state.highlighted_index.and_then(|index| items.get(index)),
            ) {
                select(&mut next, Some(item.clone()), item_to_string);
            }
        }
        ComboboxEvent::Escape | ComboboxEvent::Blur => close(&mut next),
        ComboboxEvent::ItemClick(index) => {
            if let Some(item) = items.get(index) {
                select(&mut next, Some(item.clone()), item_to_string);
            }
        }
        ComboboxEvent::ItemHover(index) => {
            if index < count {
                next.highlighted_index = Some(index);
            }
        }
        ComboboxEvent::SelectItem(item) => select(&mut next, item, item_to_string),
        ComboboxEvent::ToggleMenu => {
            if state.is_open {
                close(&mut next);
            } else {
                next.is_open = true;
            }
        }
    }
    if next.highlighted_index.is_some_and(|index| index >= count) {
        next.highlighted_index = None;
    }
    next
}

fn select<T>(
    state: &mut ComboboxState<T>,
    item: Option<T>,
    item_to_string: &dyn Fn(&T) -> String,
) {
    state.input_value = item.as_ref().map(item_to_string).unwrap_or_default();
    state.selected_item = item;
    close(state);
}

fn close<T>(state: &mut ComboboxState<T>) {
    state.is_open = false;
    state.highlighted_index = None;
}

/// Attributes for one part of the combobox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropBag {
    pub id: String,
    pub attrs: SmallVec<[(&'static str, String); 6]>,
}

impl PropBag {
    fn new(id: String) -> Self {
        Self {
            id,
            attrs: SmallVec::new(),
        }
    }

    fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attrs.push((name, value.to_string()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Element ids for one combobox instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxIds {
    base: String,
}

impl ComboboxIds {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn label_id(&self) -> String {
        format!("{}-label", self.base)
    }

    pub fn input_id(&self) -> String {
        format!("{}-input", self.base)
    }

    pub fn menu_id(&self) -> String {
        format!("{}-menu", self.base)
    }

    pub fn item_id(&self, index: usize) -> String {
        format!("{}-item-{index}", self.base)
    }

    pub fn label_props(&self) -> PropBag {
        PropBag::new(self.label_id()).with("for", self.input_id())
    }

    pub fn input_props<T>(&self, state: &ComboboxState<T>) -> PropBag {
        let mut props = PropBag::new(self.input_id())
            .with("role", "combobox")
            .with("aria-autocomplete", "list")
            .with("aria-controls", self.menu_id())
            .with("aria-labelledby", self.label_id())
            .with("aria-expanded", state.is_open);
        if let (true, Some(index)) = (state.is_open, state.highlighted_index) {
            props = props.with("aria-activedescendant", self.item_id(index));
        }
        props
    }

    pub fn menu_props(&self) -> PropBag {
        PropBag::new(self.menu_id())
            .with("role", "listbox")
            .with("aria-labelledby", self.label_id())
    }

    pub fn item_props<T>(&self, index: usize, state: &ComboboxState<T>) -> PropBag {
        PropBag::new(self.item_id(index))
            .with("role", "option")
            .with("aria-selected", state.highlighted_index == Some(index))
    }
}
