//! Fixed-height scroll container that renders only its visible rows.

#![allow(non_snake_case)]

use std::rc::Rc;

use perfkit_core::{container, restartable, with_key, Element, ElementKind};
use perfkit_foundation::{measure_virtual_list, VirtualItem, VirtualListState, VirtualizerConfig};

use crate::modifier::Modifier;

#[derive(Clone, Debug)]
pub struct VirtualListSpec {
    /// Height of the scroll container.
    pub height: f32,
    pub config: VirtualizerConfig,
    pub modifier: Modifier,
}

impl Default for VirtualListSpec {
    fn default() -> Self {
        Self {
            height: 300.0,
            config: VirtualizerConfig::default(),
            modifier: Modifier::empty(),
        }
    }
}

impl VirtualListSpec {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn overscan(mut self, overscan: usize) -> Self {
        self.config = self.config.with_overscan(overscan);
        self
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }
}

/// Renders rows `0..items_count` through `item`, but only those in or near
/// the viewport.
///
/// The list is its own restartable scope: scrolling re-runs it without
/// touching the caller. Each row is keyed by index and wrapped in a list item
/// carrying its `top` and `height`.
#[track_caller]
pub fn VirtualList(
    items_count: usize,
    state: &VirtualListState,
    spec: VirtualListSpec,
    estimate_size: impl Fn(usize) -> f32 + 'static,
    item: impl Fn(VirtualItem) + 'static,
) {
    let state = state.clone();
    let estimate_size = Rc::new(estimate_size);
    let item = Rc::new(item);
    restartable(move || {
        let range = measure_virtual_list(
            items_count,
            &state,
            spec.height,
            spec.config,
            |index| estimate_size(index),
        );
        let scroll_target = state.clone();
        let list = spec
            .modifier
            .clone()
            .apply(
                Element::new(ElementKind::List)
                    .attr("height", spec.height)
                    .attr("total-size", range.total_size)
                    .attr("scroll-offset", range.scroll_offset)
                    .attr("rows", range.rendered_count())
                    .on_scroll(move |offset| scroll_target.scroll_to_offset(offset)),
            );
        container(list, || {
            for virtual_item in &range.items {
                with_key(&virtual_item.index, || {
                    let row = Element::new(ElementKind::ListItem)
                        .attr("index", virtual_item.index)
                        .attr("top", virtual_item.start)
                        .attr("height", virtual_item.size);
                    container(row, || item(*virtual_item));
                });
            }
        });
    });
}
