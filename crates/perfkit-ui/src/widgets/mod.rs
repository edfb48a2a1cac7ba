//! Widgets emitted into the composition's element tree.

mod basic;
mod combobox;
mod suspense;
mod virtual_list;

pub use basic::{Box, Button, Checkbox, Column, Form, Label, NumberInput, Row, Spacer, Text, TextInput};
pub use combobox::{useCombobox, Combobox, ComboboxOptions};
pub use suspense::{Suspense, SuspenseWithError};
pub use virtual_list::{VirtualList, VirtualListSpec};
