//! Foundation primitives built on the perfkit runtime: list virtualization,
//! lazily loaded modules, keyed background computations and the combobox
//! state machine.

pub mod async_state;
pub mod combobox;
pub mod lazy;
pub mod lazy_module;

pub use async_state::{use_async, AsyncState, AsyncStatus};
pub use combobox::{
    combobox_reducer, ComboboxEvent, ComboboxIds, ComboboxState, PropBag,
};
pub use lazy::{
    measure_virtual_list, remember_virtual_list_state, ScrollAlign, VirtualItem, VirtualLayoutInfo,
    VirtualListState, VirtualRange, VirtualizerConfig, DEFAULT_ITEM_SIZE_ESTIMATE,
};
pub use lazy_module::{LazyModule, LoadError, ModuleStatus, Suspended};

#[cfg(test)]
#[path = "tests/virtualizer_tests.rs"]
mod virtualizer_tests;

#[cfg(test)]
#[path = "tests/combobox_tests.rs"]
mod combobox_tests;

#[cfg(test)]
#[path = "tests/lazy_module_tests.rs"]
mod lazy_module_tests;

#[cfg(test)]
#[path = "tests/async_state_tests.rs"]
mod async_state_tests;
