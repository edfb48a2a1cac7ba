//! Combobox hook: keeps [`ComboboxState`] across passes and turns the pure
//! state machine into element props with event handlers attached.

#![allow(non_snake_case)]

use std::rc::Rc;

use perfkit_core::{group, remember, useState, Element, ElementKind, KeyPress, MutableState, Owned};
use perfkit_foundation::{combobox_reducer, ComboboxEvent, ComboboxIds, ComboboxState, PropBag};

type Listener<V> = Rc<dyn Fn(V)>;

/// Inputs to [`useCombobox`]. Closures are refreshed on every pass.
pub struct ComboboxOptions<T> {
    pub id: String,
    pub items: Rc<[T]>,
    pub item_to_string: Rc<dyn Fn(&T) -> String>,
    pub on_input_value_change: Option<Listener<String>>,
    pub on_selected_item_change: Option<Listener<Option<T>>>,
    pub on_highlighted_index_change: Option<Listener<Option<usize>>>,
}

impl<T> ComboboxOptions<T> {
    pub fn new(
        id: impl Into<String>,
        items: Rc<[T]>,
        item_to_string: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            items,
            item_to_string: Rc::new(item_to_string),
            on_input_value_change: None,
            on_selected_item_change: None,
            on_highlighted_index_change: None,
        }
    }

    pub fn on_input_value_change(mut self, listener: impl Fn(String) + 'static) -> Self {
        self.on_input_value_change = Some(Rc::new(listener));
        self
    }

    pub fn on_selected_item_change(mut self, listener: impl Fn(Option<T>) + 'static) -> Self {
        self.on_selected_item_change = Some(Rc::new(listener));
        self
    }

    pub fn on_highlighted_index_change(
        mut self,
        listener: impl Fn(Option<usize>) + 'static,
    ) -> Self {
        self.on_highlighted_index_change = Some(Rc::new(listener));
        self
    }
}

struct Machine<T: Clone + 'static> {
    state: MutableState<ComboboxState<T>>,
    options: Owned<ComboboxOptions<T>>,
}

impl<T: Clone + PartialEq + 'static> Machine<T> {
    fn send(&self, event: ComboboxEvent<T>) {
        let (next, listeners) = self.options.with(|options| {
            let next = self.state.peek(|current| {
                combobox_reducer(current, event, &options.items, &*options.item_to_string)
            });
            let listeners = (
                options.on_input_value_change.clone(),
                options.on_selected_item_change.clone(),
                options.on_highlighted_index_change.clone(),
            );
            (next, listeners)
        });
        let previous = self.state.peek(Clone::clone);
        if previous == next {
            return;
        }
        self.state.set(next.clone());
        let (on_input, on_selected, on_highlighted) = listeners;
        if previous.input_value != next.input_value {
            if let Some(listener) = on_input {
                listener(next.input_value.clone());
            }
        }
        if previous.selected_item != next.selected_item {
            if let Some(listener) = on_selected {
                listener(next.selected_item.clone());
            }
        }
        if previous.highlighted_index != next.highlighted_index {
            if let Some(listener) = on_highlighted {
                listener(next.highlighted_index);
            }
        }
    }
}

/// Snapshot of a combobox for the current pass plus element builders.
pub struct Combobox<T: Clone + 'static> {
    pub state: ComboboxState<T>,
    ids: ComboboxIds,
    machine: Rc<Machine<T>>,
}

impl<T: Clone + 'static> Clone for Combobox<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            ids: self.ids.clone(),
            machine: Rc::clone(&self.machine),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Combobox<T> {
    pub fn ids(&self) -> &ComboboxIds {
        &self.ids
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.state.highlighted_index
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.state.selected_item.as_ref()
    }

    pub fn input_value(&self) -> &str {
        &self.state.input_value
    }

    pub fn send(&self, event: ComboboxEvent<T>) {
        self.machine.send(event);
    }

    pub fn select_item(&self, item: Option<T>) {
        self.machine.send(ComboboxEvent::SelectItem(item));
    }

    pub fn label_element(&self, text: impl Into<String>) -> Element {
        with_props(
            Element::new(ElementKind::Label).text(text),
            self.ids.label_props(),
        )
    }

    pub fn input_element(&self) -> Element {
        let (input, key, blur) = (
            Rc::clone(&self.machine),
            Rc::clone(&self.machine),
            Rc::clone(&self.machine),
        );
        with_props(
            Element::new(ElementKind::Input)
                .attr("value", &self.state.input_value)
                .on_input(move |value| input.send(ComboboxEvent::InputChanged(value)))
                .on_key(move |pressed| {
                    key.send(match pressed {
                        KeyPress::ArrowDown => ComboboxEvent::ArrowDown,
                        KeyPress::ArrowUp => ComboboxEvent::ArrowUp,
                        KeyPress::Enter => ComboboxEvent::Enter,
                        KeyPress::Escape => ComboboxEvent::Escape,
                    })
                })
                .on_blur(move || blur.send(ComboboxEvent::Blur)),
            self.ids.input_props(&self.state),
        )
    }

    pub fn menu_element(&self) -> Element {
        with_props(Element::new(ElementKind::List), self.ids.menu_props())
    }

    pub fn item_element(&self, index: usize) -> Element {
        let (click, hover) = (Rc::clone(&self.machine), Rc::clone(&self.machine));
        with_props(
            Element::new(ElementKind::ListItem)
                .on_click(move || click.send(ComboboxEvent::ItemClick(index)))
                .on_hover(move || hover.send(ComboboxEvent::ItemHover(index))),
            self.ids.item_props(index, &self.state),
        )
    }
}

fn with_props(mut element: Element, props: PropBag) -> Element {
    element.set_attr("id", props.id);
    for (name, value) in props.attrs {
        element.set_attr(name, value);
    }
    element
}

/// Combobox state for the calling group.
///
/// Reading the result subscribes the caller; every event that changes the
/// state recomposes it and then notifies the matching listeners.
#[track_caller]
pub fn useCombobox<T: Clone + PartialEq + 'static>(options: ComboboxOptions<T>) -> Combobox<T> {
    group(move || {
        let ids = ComboboxIds::new(options.id.clone());
        let state = useState(ComboboxState::<T>::default);
        let stored = remember(|| None::<Owned<ComboboxOptions<T>>>);
        let options = match stored.get() {
            Some(current) => {
                current.replace(options);
                current
            }
            None => {
                let created = Owned::new(options);
                stored.replace(Some(created.clone()));
                created
            }
        };
        let machine = remember(|| {
            Rc::new(Machine {
                state: state.clone(),
                options: options.clone(),
            })
        })
        .get();
        // Items may have shrunk since the highlight was set.
        let item_count = options.with(|options| options.items.len());
        if state.peek(|current| current.highlighted_index.is_some_and(|index| index >= item_count)) {
            state.update(|current| current.highlighted_index = None);
        }
        Combobox {
            state: state.value(),
            ids,
            machine,
        }
    })
}
