//! Scroll state for [`measure_virtual_list`](super::measure_virtual_list).
//!
//! The scroll offset is reactive: a list body that measured itself against it
//! recomposes when it changes. Measured sizes, pending scroll requests and the
//! last layout live in plain shared state so that recording them never
//! invalidates anything on its own.

use std::cell::RefCell;
use std::rc::Rc;

use perfkit_core::hash::map::HashMap;
use perfkit_core::{remember, MutableState, RuntimeHandle};

/// Where to place an item when scrolling it into view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Scroll the least distance that makes the item fully visible.
    #[default]
    Auto,
    Start,
    Center,
    End,
}

/// Summary of the last measurement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VirtualLayoutInfo {
    pub items_count: usize,
    pub viewport_size: f32,
    pub total_size: f32,
}

impl VirtualLayoutInfo {
    pub fn max_scroll_offset(&self) -> f32 {
        (self.total_size - self.viewport_size).max(0.0)
    }
}

struct VirtualListInner {
    measured_sizes: HashMap<usize, f32>,
    pending_scroll: Option<(usize, ScrollAlign)>,
    last_layout: Option<VirtualLayoutInfo>,
}

/// Shared handle to a virtual list's scroll position.
///
/// Clones refer to the same list. Create one per list with
/// [`remember_virtual_list_state`].
#[derive(Clone)]
pub struct VirtualListState {
    scroll_offset: MutableState<f32>,
    // Bumped when a measurement or scroll request needs a fresh layout pass.
    layout_generation: MutableState<u64>,
    inner: Rc<RefCell<VirtualListInner>>,
}

impl PartialEq for VirtualListState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for VirtualListState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualListState")
            .field("scroll_offset", &self.peek_scroll_offset())
            .field("layout", &self.layout_info())
            .finish()
    }
}

impl VirtualListState {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            scroll_offset: MutableState::with_runtime(0.0, runtime.clone()),
            layout_generation: MutableState::with_runtime(0, runtime),
            inner: Rc::new(RefCell::new(VirtualListInner {
                measured_sizes: HashMap::default(),
                pending_scroll: None,
                last_layout: None,
            })),
        }
    }

    /// Current scroll offset. Subscribes the calling scope.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset.get()
    }

    pub fn peek_scroll_offset(&self) -> f32 {
        self.scroll_offset.peek(|offset| *offset)
    }

    /// Moves the list to `offset`, clamped against the last known layout.
    /// Non-finite offsets are ignored.
    pub fn scroll_to_offset(&self, offset: f32) {
        if !offset.is_finite() {
            log::warn!("ignoring non-finite scroll offset {offset}");
            return;
        }
        let offset = match self.layout_info() {
            Some(layout) => offset.clamp(0.0, layout.max_scroll_offset()),
            None => offset.max(0.0),
        };
        self.scroll_offset.set_if_changed(offset);
    }

    pub fn scroll_by(&self, delta: f32) {
        self.scroll_to_offset(self.peek_scroll_offset() + delta);
    }

    /// Requests that `index` be brought into view on the next measurement.
    pub fn scroll_to_index(&self, index: usize, align: ScrollAlign) {
        self.inner.borrow_mut().pending_scroll = Some((index, align));
        self.request_layout();
    }

    /// Records the real size of an item, replacing its estimate.
    pub fn measure_item(&self, index: usize, size: f32) {
        let size = size.max(0.0);
        let previous = self.inner.borrow_mut().measured_sizes.insert(index, size);
        if previous != Some(size) {
            self.request_layout();
        }
    }

    /// Drops all measured sizes, e.g. after the item set was replaced.
    pub fn reset_measurements(&self) {
        let had_any = {
            let mut inner = self.inner.borrow_mut();
            let had_any = !inner.measured_sizes.is_empty();
            inner.measured_sizes.clear();
            had_any
        };
        if had_any {
            self.request_layout();
        }
    }

    pub fn layout_info(&self) -> Option<VirtualLayoutInfo> {
        self.inner.borrow().last_layout
    }

    /// Subscribes the calling scope to everything that affects layout.
    pub(crate) fn observe(&self) -> f32 {
        self.layout_generation.with(|_| ());
        self.scroll_offset.get()
    }

    pub(crate) fn measured_size(&self, index: usize) -> Option<f32> {
        self.inner.borrow().measured_sizes.get(&index).copied()
    }

    pub(crate) fn take_pending_scroll(&self) -> Option<(usize, ScrollAlign)> {
        self.inner.borrow_mut().pending_scroll.take()
    }

    /// Stores the measured layout and settles the scroll offset without
    /// notifying anyone when it did not move.
    pub(crate) fn apply_layout(&self, layout: VirtualLayoutInfo, offset: f32) {
        self.inner.borrow_mut().last_layout = Some(layout);
        self.scroll_offset.set_if_changed(offset);
    }

    fn request_layout(&self) {
        self.layout_generation.update(|generation| *generation += 1);
    }
}

/// Remembers a [`VirtualListState`] in the calling group.
#[track_caller]
pub fn remember_virtual_list_state() -> VirtualListState {
    perfkit_core::group(|| {
        let runtime = perfkit_core::with_current_composer(|composer| composer.runtime_handle());
        remember(move || VirtualListState::new(runtime)).get()
    })
}
