//! Render counting for the isolation exercises.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use perfkit_core::{staticCompositionLocalOf, StaticCompositionLocal};

/// Counts how often each named component body ran, in first-render order.
#[derive(Clone, Default)]
pub struct RenderProbe {
    counts: Rc<RefCell<IndexMap<String, usize>>>,
}

impl PartialEq for RenderProbe {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.counts, &other.counts)
    }
}

impl std::fmt::Debug for RenderProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.counts.borrow().iter()).finish()
    }
}

impl RenderProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        let mut counts = self.counts.borrow_mut();
        match counts.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                counts.insert(name.to_string(), 1);
            }
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.borrow().get(name).copied().unwrap_or(0)
    }

    /// Sum of all counts whose name starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.counts
            .borrow()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.counts.borrow().values().sum()
    }

    pub fn snapshot(&self) -> IndexMap<String, usize> {
        self.counts.borrow().clone()
    }

    pub fn reset(&self) {
        self.counts.borrow_mut().clear();
    }
}

thread_local! {
    static LOCAL_RENDER_PROBE: StaticCompositionLocal<Option<RenderProbe>> =
        staticCompositionLocalOf(|| None);
}

/// Local through which hosts hand a [`RenderProbe`] to the tree.
pub fn local_render_probe() -> StaticCompositionLocal<Option<RenderProbe>> {
    LOCAL_RENDER_PROBE.with(Clone::clone)
}

/// Counts one render of `name` if a probe is provided. A no-op otherwise.
pub fn record_render(name: &str) {
    if let Ok(Some(probe)) = local_render_probe().try_current() {
        probe.record(name);
    }
}
