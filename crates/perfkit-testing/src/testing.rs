use std::time::Duration;

use perfkit_core::{CompositionLocalProvider, ElementKind, RuntimeHandle, ViewNode, ViewTree};
use perfkit_ui::{local_render_probe, AppSettings, AppShell, RenderProbe, ShellError};

/// Headless harness for exercising compositions in tests.
///
/// Wraps an [`AppShell`] and provides a [`RenderProbe`] to the content, so
/// components that call [`perfkit_ui::record_render`] can be counted without
/// any extra wiring.
pub struct TestRule {
    shell: AppShell,
    probe: RenderProbe,
}

impl TestRule {
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            shell: AppShell::new(settings),
            probe: RenderProbe::new(),
        }
    }

    /// Installs `content` and performs the initial render.
    pub fn set_content(&mut self, mut content: impl FnMut() + 'static) -> Result<(), ShellError> {
        let probe = self.probe.clone();
        self.shell.set_content(move || {
            CompositionLocalProvider([local_render_probe().provides(Some(probe.clone()))], || {
                content()
            });
        })
    }

    pub fn render_probe(&self) -> &RenderProbe {
        &self.probe
    }

    /// Forces the whole content to run again.
    pub fn recomposition(&mut self) -> Result<(), ShellError> {
        self.shell.render()
    }

    /// Pumps until background work has landed and nothing is queued.
    pub fn pump_until_idle(&mut self) -> Result<(), ShellError> {
        self.shell.wait_for_background()
    }

    pub fn advance_frame(&mut self, elapsed: Duration) -> Result<(), ShellError> {
        self.shell.advance_frame(elapsed)
    }

    /// Lets `total` pass in frame-sized steps, then settles background work.
    pub fn advance_time(&mut self, total: Duration) -> Result<(), ShellError> {
        self.shell.advance_time(total)?;
        self.pump_until_idle()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.shell.runtime_handle()
    }

    pub fn shell(&mut self) -> &mut AppShell {
        &mut self.shell
    }

    pub fn view_tree(&self) -> ViewTree {
        self.shell.view_tree()
    }

    pub fn dump_tree(&self) -> String {
        self.shell.dump()
    }

    pub fn node_with_tag(&self, tag: &str) -> Result<ViewNode, ShellError> {
        self.view_tree()
            .find_by_tag(tag)
            .cloned()
            .ok_or_else(|| ShellError::UnknownTag(tag.to_string()))
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.view_tree().contains_text(text)
    }

    /// Every text in tree order.
    pub fn texts(&self) -> Vec<String> {
        self.view_tree()
            .nodes()
            .into_iter()
            .filter_map(|node| node.element.text.clone())
            .collect()
    }

    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.view_tree().count_kind(kind)
    }
}

impl Default for TestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// [`TestRule`].
pub fn run_test_composition<R>(f: impl FnOnce(&mut TestRule) -> R) -> R {
    let mut rule = TestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
