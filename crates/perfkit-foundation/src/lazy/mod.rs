//! Windowed rendering for long lists.
//!
//! [`measure_virtual_list`] turns a scroll offset, a viewport size and per-item
//! size estimates into the small range of items that needs rendering. Sizes
//! reported through [`VirtualListState::measure_item`] replace estimates.

mod measure;
mod viewport;
mod virtual_list_state;

pub use measure::{
    measure_virtual_list, VirtualItem, VirtualRange, VirtualizerConfig,
    DEFAULT_ITEM_SIZE_ESTIMATE,
};
pub use viewport::ViewportHandler;
pub use virtual_list_state::{
    remember_virtual_list_state, ScrollAlign, VirtualLayoutInfo, VirtualListState,
};
