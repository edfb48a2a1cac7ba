//! UI layer for the perfkit exercises: widgets, hooks and a headless shell
//! that drives a composition from scripted events.

mod hooks;
mod modifier;
mod probe;
pub mod shell;
mod slice;
pub mod widgets;

pub use hooks::{useDebouncedState, useForceRerender, Debounced, ForceRerender};
pub use modifier::Modifier;
pub use probe::{local_render_probe, record_render, RenderProbe};
pub use shell::{AppSettings, AppShell, ShellCommand, ShellError};
pub use slice::{with_state_slice, SliceComponent, StateSlice};
pub use widgets::{
    useCombobox, Box, Button, Checkbox, Column, Combobox, ComboboxOptions, Form, Label,
    NumberInput, Row, Spacer, Suspense, SuspenseWithError, Text, TextInput, VirtualList,
    VirtualListSpec,
};

pub use perfkit_core::{Composition, Element, ElementKind, UiEvent, ViewNode, ViewTree};

#[cfg(test)]
#[path = "tests/widget_tests.rs"]
mod widget_tests;

#[cfg(test)]
#[path = "tests/suspense_tests.rs"]
mod suspense_tests;

#[cfg(test)]
#[path = "tests/virtual_list_tests.rs"]
mod virtual_list_tests;

#[cfg(test)]
#[path = "tests/combobox_tests.rs"]
mod combobox_tests;

#[cfg(test)]
#[path = "tests/slice_tests.rs"]
mod slice_tests;

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod hooks_tests;

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod shell_tests;
