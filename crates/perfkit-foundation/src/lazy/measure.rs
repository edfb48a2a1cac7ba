//! Range computation for virtual lists.

use std::ops::RangeInclusive;

use super::viewport::ViewportHandler;
use super::virtual_list_state::{ScrollAlign, VirtualLayoutInfo, VirtualListState};

/// Row size assumed when a caller supplies no better estimate.
pub const DEFAULT_ITEM_SIZE_ESTIMATE: f32 = 48.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualizerConfig {
    /// Extra rows rendered on each side of the visible window.
    pub overscan: usize,
    pub padding_start: f32,
    pub padding_end: f32,
}

impl Default for VirtualizerConfig {
    fn default() -> Self {
        Self {
            overscan: 1,
            padding_start: 0.0,
            padding_end: 0.0,
        }
    }
}

impl VirtualizerConfig {
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_padding(mut self, start: f32, end: f32) -> Self {
        self.padding_start = start.max(0.0);
        self.padding_end = end.max(0.0);
        self
    }
}

/// One row to render, positioned along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    pub start: f32,
    pub size: f32,
}

impl VirtualItem {
    pub fn end(&self) -> f32 {
        self.start + self.size
    }
}

/// Result of [`measure_virtual_list`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualRange {
    /// Rows to render, in index order: the visible window plus overscan.
    pub items: Vec<VirtualItem>,
    /// Height of the full scrollable content, padding included.
    pub total_size: f32,
    pub scroll_offset: f32,
    pub viewport_size: f32,
    /// Indices that intersect the viewport, without overscan.
    pub visible: Option<RangeInclusive<usize>>,
}

impl VirtualRange {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn rendered_count(&self) -> usize {
        self.items.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible
            .as_ref()
            .map_or(0, |range| range.end() - range.start() + 1)
    }

    pub fn can_scroll_backward(&self) -> bool {
        self.scroll_offset > 0.0
    }

    pub fn can_scroll_forward(&self) -> bool {
        self.scroll_offset + self.viewport_size < self.total_size
    }
}

/// Computes which of `items_count` rows intersect the viewport of `state`.
///
/// Sizes come from [`VirtualListState::measure_item`] when an item has been
/// measured and from `estimate_size` otherwise. A pending
/// [`VirtualListState::scroll_to_index`] request is resolved here, and the
/// scroll offset is clamped to the content. Called during composition, it
/// subscribes the caller to the state's scroll offset.
pub fn measure_virtual_list(
    items_count: usize,
    state: &VirtualListState,
    viewport_size: f32,
    config: VirtualizerConfig,
    estimate_size: impl Fn(usize) -> f32,
) -> VirtualRange {
    let requested_offset = state.observe();
    let pending = state.take_pending_scroll();

    let first_estimate = if items_count > 0 {
        estimate_size(0)
    } else {
        DEFAULT_ITEM_SIZE_ESTIMATE
    };
    let viewport = ViewportHandler::new(viewport_size, first_estimate).effective_size();

    if items_count == 0 {
        let total_size = config.padding_start + config.padding_end;
        state.apply_layout(
            VirtualLayoutInfo {
                items_count,
                viewport_size: viewport,
                total_size,
            },
            0.0,
        );
        return VirtualRange {
            items: Vec::new(),
            total_size,
            scroll_offset: 0.0,
            viewport_size: viewport,
            visible: None,
        };
    }

    let mut starts = Vec::with_capacity(items_count);
    let mut ends = Vec::with_capacity(items_count);
    let mut cursor = config.padding_start;
    for index in 0..items_count {
        let size = state
            .measured_size(index)
            .unwrap_or_else(|| estimate_size(index))
            .max(0.0);
        starts.push(cursor);
        cursor += size;
        ends.push(cursor);
    }
    let total_size = cursor + config.padding_end;
    let max_offset = (total_size - viewport).max(0.0);

    let mut offset = if requested_offset.is_finite() {
        requested_offset
    } else {
        0.0
    };
    if let Some((index, align)) = pending {
        let index = index.min(items_count - 1);
        offset = aligned_offset(starts[index], ends[index], offset, viewport, align);
    }
    let offset = offset.clamp(0.0, max_offset);

    // First row whose end is past the offset, last row starting before the
    // viewport's bottom edge.
    let first = ends.partition_point(|end| *end <= offset);
    let past_last = starts.partition_point(|start| *start < offset + viewport);
    let visible = (first < past_last).then(|| first..=past_last - 1);

    let items = match &visible {
        Some(range) => {
            let from = range.start().saturating_sub(config.overscan);
            let to = range
                .end()
                .saturating_add(config.overscan)
                .min(items_count - 1);
            (from..=to)
                .map(|index| VirtualItem {
                    index,
                    start: starts[index],
                    size: ends[index] - starts[index],
                })
                .collect()
        }
        None => Vec::new(),
    };

    state.apply_layout(
        VirtualLayoutInfo {
            items_count,
            viewport_size: viewport,
            total_size,
        },
        offset,
    );

    VirtualRange {
        items,
        total_size,
        scroll_offset: offset,
        viewport_size: viewport,
        visible,
    }
}

fn aligned_offset(start: f32, end: f32, current: f32, viewport: f32, align: ScrollAlign) -> f32 {
    match align {
        ScrollAlign::Start => start,
        ScrollAlign::End => end - viewport,
        ScrollAlign::Center => start + (end - start) / 2.0 - viewport / 2.0,
        ScrollAlign::Auto => {
            if start < current {
                start
            } else if end > current + viewport {
                end - viewport
            } else {
                current
            }
        }
    }
}
