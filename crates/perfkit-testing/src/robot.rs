use std::time::Duration;

use perfkit_core::KeyPress;
use perfkit_ui::{AppSettings, RenderProbe, ShellError};

use crate::TestRule;

/// Black-box driver for a running exercise: interacts with elements by test
/// tag and observes the emitted text, the way a user would.
pub struct Robot {
    rule: TestRule,
}

impl Robot {
    pub fn launch(content: impl FnMut() + 'static) -> Result<Self, ShellError> {
        Self::launch_with_settings(AppSettings::default(), content)
    }

    pub fn launch_with_settings(
        settings: AppSettings,
        content: impl FnMut() + 'static,
    ) -> Result<Self, ShellError> {
        let mut rule = TestRule::with_settings(settings);
        rule.set_content(content)?;
        Ok(Self { rule })
    }

    pub fn rule(&mut self) -> &mut TestRule {
        &mut self.rule
    }

    pub fn render_probe(&self) -> &RenderProbe {
        self.rule.render_probe()
    }

    pub fn click(&mut self, tag: &str) -> Result<(), ShellError> {
        self.rule.shell().click(tag)
    }

    pub fn hover(&mut self, tag: &str) -> Result<(), ShellError> {
        self.rule.shell().hover(tag)
    }

    pub fn focus(&mut self, tag: &str) -> Result<(), ShellError> {
        self.rule.shell().focus(tag)
    }

    pub fn type_text(&mut self, tag: &str, text: &str) -> Result<(), ShellError> {
        self.rule.shell().input(tag, text)
    }

    pub fn press_key(&mut self, tag: &str, key: KeyPress) -> Result<(), ShellError> {
        self.rule.shell().key(tag, key)
    }

    pub fn scroll(&mut self, tag: &str, offset: f32) -> Result<(), ShellError> {
        self.rule.shell().scroll(tag, offset)
    }

    pub fn step_frames(&mut self, frames: u32) -> Result<(), ShellError> {
        let interval = self.rule.shell().settings().frame_interval;
        for _ in 0..frames {
            self.rule.advance_frame(interval)?;
        }
        Ok(())
    }

    /// Settles background work and frames until `text` shows up or
    /// `max_frames` frames have passed.
    pub fn wait_for_text(&mut self, text: &str, max_frames: u32) -> Result<bool, ShellError> {
        for _ in 0..=max_frames {
            self.rule.pump_until_idle()?;
            if self.rule.has_text(text) {
                return Ok(true);
            }
            self.step_frames(1)?;
        }
        log::debug!("{text:?} did not appear within {max_frames} frames");
        Ok(false)
    }

    pub fn settle(&mut self) -> Result<(), ShellError> {
        self.rule.pump_until_idle()
    }

    pub fn advance_time(&mut self, total: Duration) -> Result<(), ShellError> {
        self.rule.advance_time(total)
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.rule.has_text(text)
    }

    pub fn texts(&self) -> Vec<String> {
        self.rule.texts()
    }

    pub fn snapshot(&self) -> String {
        self.rule.dump_tree()
    }
}
