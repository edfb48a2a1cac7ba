//! Leaf and container widgets.

#![allow(non_snake_case)]

use perfkit_core::{container, emit, Element, ElementKind};

use crate::modifier::Modifier;

#[track_caller]
pub fn Column<R>(modifier: Modifier, content: impl FnOnce() -> R) -> R {
    container(modifier.apply(Element::new(ElementKind::Column)), content)
}

#[track_caller]
pub fn Row<R>(modifier: Modifier, content: impl FnOnce() -> R) -> R {
    container(modifier.apply(Element::new(ElementKind::Row)), content)
}

#[track_caller]
pub fn Box<R>(modifier: Modifier, content: impl FnOnce() -> R) -> R {
    container(modifier.apply(Element::new(ElementKind::Box)), content)
}

/// Groups inputs the way an HTML form does. Submission is not modelled.
#[track_caller]
pub fn Form<R>(modifier: Modifier, content: impl FnOnce() -> R) -> R {
    container(modifier.apply(Element::new(ElementKind::Form)), content)
}

pub fn Text(value: impl Into<String>, modifier: Modifier) {
    emit(modifier.apply(Element::new(ElementKind::Text).text(value)));
}

pub fn Label(value: impl Into<String>, for_id: &str, modifier: Modifier) {
    emit(modifier.apply(
        Element::new(ElementKind::Label)
            .text(value)
            .attr("for", for_id),
    ));
}

pub fn Spacer(height: f32) {
    emit(Element::new(ElementKind::Spacer).attr("height", height));
}

pub fn Button(label: impl Into<String>, modifier: Modifier, on_click: impl Fn() + 'static) {
    emit(modifier.apply(Element::new(ElementKind::Button).text(label).on_click(on_click)));
}

/// Clicking toggles; `on_change` receives the new value.
pub fn Checkbox(
    checked: bool,
    label: impl Into<String>,
    modifier: Modifier,
    on_change: impl Fn(bool) + 'static,
) {
    emit(
        modifier.apply(
            Element::new(ElementKind::Checkbox)
                .text(label)
                .attr("checked", checked)
                .on_click(move || on_change(!checked)),
        ),
    );
}

pub fn TextInput(value: &str, modifier: Modifier, on_change: impl Fn(String) + 'static) {
    emit(
        modifier.apply(
            Element::new(ElementKind::Input)
                .attr("type", "text")
                .attr("value", value)
                .on_input(on_change),
        ),
    );
}

/// Numeric input. Text that does not parse as an integer is ignored.
pub fn NumberInput(value: i64, modifier: Modifier, on_change: impl Fn(i64) + 'static) {
    emit(
        modifier.apply(
            Element::new(ElementKind::Input)
                .attr("type", "number")
                .attr("value", value)
                .on_input(move |raw: String| match raw.trim().parse::<i64>() {
                    Ok(number) => on_change(number),
                    Err(err) => log::debug!("ignoring non-numeric input {raw:?}: {err}"),
                }),
        ),
    );
}
