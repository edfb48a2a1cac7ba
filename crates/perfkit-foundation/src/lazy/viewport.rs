//! Viewport size validation for virtual list measurement.

use super::measure::DEFAULT_ITEM_SIZE_ESTIMATE;

/// Effective viewport size for a measurement pass.
///
/// An unbounded or absurdly large viewport would render every row, which is
/// exactly what a virtual list exists to avoid. Those are replaced by a window
/// of [`INFINITE_VIEWPORT_ITEM_COUNT`] rows.
#[derive(Clone, Copy, Debug)]
pub struct ViewportHandler {
    effective_size: f32,
    is_unbounded: bool,
}

/// Anything larger is treated as unbounded.
const MAX_REASONABLE_VIEWPORT: f32 = 100_000.0;

const INFINITE_VIEWPORT_ITEM_COUNT: f32 = 20.0;

impl ViewportHandler {
    pub fn new(viewport_size: f32, estimated_item_size: f32) -> Self {
        let is_unbounded = viewport_size.is_infinite()
            || viewport_size.is_nan()
            || viewport_size > MAX_REASONABLE_VIEWPORT;

        let effective_size = if is_unbounded {
            let row = estimated_item_size.max(DEFAULT_ITEM_SIZE_ESTIMATE);
            let fallback = row * INFINITE_VIEWPORT_ITEM_COUNT;
            log::warn!(
                "VirtualList: unbounded viewport ({viewport_size}), using fallback size {fallback}. \
                 Give the list a fixed height."
            );
            fallback
        } else {
            viewport_size.max(0.0)
        };

        Self {
            effective_size,
            is_unbounded,
        }
    }

    #[inline]
    pub fn effective_size(&self) -> f32 {
        self.effective_size
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.is_unbounded
    }
}
