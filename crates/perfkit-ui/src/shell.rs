//! Headless host for a composition.
//!
//! [`AppShell`] owns the composition, advances a synthetic frame clock, waits
//! for background work and injects events into elements found by test tag.
//! The same operations are reachable through [`ShellCommand`] scripts, which
//! is how the CLI drives the exercises.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use perfkit_core::{ComposeError, Composition, KeyPress, RuntimeHandle, UiEvent, ViewTree};
use web_time::Instant;

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Height handed to content that sizes itself to the window.
    pub viewport_height: f32,
    /// Frame length used by [`AppShell::advance_frame`] when none is given.
    pub frame_interval: Duration,
    /// How long [`AppShell::wait_for_background`] waits before giving up.
    pub background_timeout: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            viewport_height: 300.0,
            frame_interval: Duration::from_millis(16),
            background_timeout: Duration::from_secs(5),
        }
    }
}

impl AppSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport_height(mut self, height: f32) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn background_timeout(mut self, timeout: Duration) -> Self {
        self.background_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellError {
    UnknownTag(String),
    NoHandler { tag: String, event: &'static str },
    BackgroundTimeout(Duration),
    ScriptParse { command: String, reason: String },
    Compose(ComposeError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::UnknownTag(tag) => write!(f, "no element tagged {tag:?}"),
            ShellError::NoHandler { tag, event } => {
                write!(f, "element {tag:?} does not handle {event}")
            }
            ShellError::BackgroundTimeout(timeout) => {
                write!(f, "background work still running after {timeout:?}")
            }
            ShellError::ScriptParse { command, reason } => {
                write!(f, "bad script command {command:?}: {reason}")
            }
            ShellError::Compose(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Compose(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ComposeError> for ShellError {
    fn from(err: ComposeError) -> Self {
        ShellError::Compose(err)
    }
}

/// One step of a robot script.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Event { tag: String, event: UiEvent },
    /// Advance the frame clock by this many milliseconds.
    Frame(u64),
    /// Wait for background work to land.
    Wait,
    Dump,
}

impl ShellCommand {
    /// Parses `;`-separated commands. Blank entries are skipped.
    pub fn parse_script(script: &str) -> Result<Vec<ShellCommand>, ShellError> {
        script
            .split(';')
            .map(str::trim)
            .filter(|command| !command.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for ShellCommand {
    type Err = ShellError;

    fn from_str(command: &str) -> Result<Self, Self::Err> {
        let parse_error = |reason: &str| ShellError::ScriptParse {
            command: command.to_string(),
            reason: reason.to_string(),
        };
        match command {
            "wait" => return Ok(ShellCommand::Wait),
            "dump" => return Ok(ShellCommand::Dump),
            _ => {}
        }
        let (verb, rest) = command
            .split_once(':')
            .ok_or_else(|| parse_error("expected <verb>:<argument>"))?;
        let tagged = |event: UiEvent| {
            if rest.is_empty() {
                Err(parse_error("missing tag"))
            } else {
                Ok(ShellCommand::Event {
                    tag: rest.to_string(),
                    event,
                })
            }
        };
        let with_value = || {
            rest.split_once('=')
                .filter(|(tag, _)| !tag.is_empty())
                .ok_or_else(|| parse_error("expected <tag>=<value>"))
        };
        match verb {
            "click" => tagged(UiEvent::Click),
            "hover" => tagged(UiEvent::Hover),
            "focus" => tagged(UiEvent::Focus),
            "blur" => tagged(UiEvent::Blur),
            "input" => {
                let (tag, text) = with_value()?;
                Ok(ShellCommand::Event {
                    tag: tag.to_string(),
                    event: UiEvent::Input(text.to_string()),
                })
            }
            "scroll" => {
                let (tag, offset) = with_value()?;
                let offset = offset
                    .trim()
                    .parse::<f32>()
                    .map_err(|err| parse_error(&err.to_string()))?;
                Ok(ShellCommand::Event {
                    tag: tag.to_string(),
                    event: UiEvent::Scroll(offset),
                })
            }
            "key" => {
                let (tag, key) = with_value()?;
                let key = match key {
                    "ArrowUp" | "up" => KeyPress::ArrowUp,
                    "ArrowDown" | "down" => KeyPress::ArrowDown,
                    "Enter" | "enter" => KeyPress::Enter,
                    "Escape" | "escape" => KeyPress::Escape,
                    _ => return Err(parse_error("unknown key")),
                };
                Ok(ShellCommand::Event {
                    tag: tag.to_string(),
                    event: UiEvent::Key(key),
                })
            }
            "frame" => rest
                .trim()
                .parse::<u64>()
                .map(ShellCommand::Frame)
                .map_err(|err| parse_error(&err.to_string())),
            _ => Err(parse_error("unknown command")),
        }
    }
}

/// Drives a composition without a window.
pub struct AppShell {
    composition: Composition,
    settings: AppSettings,
    frame_time_nanos: u64,
}

impl AppShell {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            composition: Composition::new(),
            settings,
            frame_time_nanos: 0,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.composition.runtime_handle()
    }

    pub fn set_content(&mut self, content: impl FnMut() + 'static) -> Result<(), ShellError> {
        self.composition.set_content(content)?;
        Ok(())
    }

    /// Re-runs the whole content.
    pub fn render(&mut self) -> Result<(), ShellError> {
        self.composition.render()?;
        Ok(())
    }

    /// Processes queued UI work and invalid scopes. Returns whether anything
    /// recomposed.
    pub fn pump(&mut self) -> Result<bool, ShellError> {
        Ok(self.composition.process_invalid_scopes()?)
    }

    /// Moves the frame clock forward and runs the frame's callbacks.
    pub fn advance_frame(&mut self, elapsed: Duration) -> Result<(), ShellError> {
        let elapsed = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.frame_time_nanos = self.frame_time_nanos.saturating_add(elapsed);
        let handle = self.runtime_handle();
        handle.drain_frame_callbacks(self.frame_time_nanos);
        self.pump()?;
        Ok(())
    }

    /// Advances frames of the configured interval until `total` has passed.
    pub fn advance_time(&mut self, total: Duration) -> Result<(), ShellError> {
        let interval = self.settings.frame_interval.max(Duration::from_millis(1));
        let mut remaining = total;
        while !remaining.is_zero() {
            let step = remaining.min(interval);
            self.advance_frame(step)?;
            remaining -= step;
        }
        Ok(())
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }

    /// Pumps until no worker thread is running and nothing is queued.
    ///
    /// Frame-driven work, such as a debounce waiting for time to pass, does
    /// not count: only [`AppShell::advance_frame`] moves it along.
    pub fn wait_for_background(&mut self) -> Result<(), ShellError> {
        let handle = self.runtime_handle();
        let started = Instant::now();
        loop {
            self.pump()?;
            let settled = !handle.has_background_work()
                && !handle.has_pending_ui()
                && !handle.has_invalid_scopes();
            if settled {
                return Ok(());
            }
            if started.elapsed() > self.settings.background_timeout {
                log::warn!("background work did not finish in {:?}", self.settings.background_timeout);
                return Err(ShellError::BackgroundTimeout(self.settings.background_timeout));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn view_tree(&self) -> ViewTree {
        self.composition.view_tree()
    }

    pub fn dump(&self) -> String {
        self.view_tree().dump()
    }

    /// Delivers `event` to the element tagged `tag`, then pumps.
    pub fn send(&mut self, tag: &str, event: UiEvent) -> Result<(), ShellError> {
        let tree = self.view_tree();
        let node = tree
            .find_by_tag(tag)
            .ok_or_else(|| ShellError::UnknownTag(tag.to_string()))?;
        let name = event.name();
        log::debug!("{name} -> {tag}");
        if !node.element.dispatch(event) {
            return Err(ShellError::NoHandler {
                tag: tag.to_string(),
                event: name,
            });
        }
        self.pump()?;
        Ok(())
    }

    pub fn click(&mut self, tag: &str) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Click)
    }

    pub fn hover(&mut self, tag: &str) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Hover)
    }

    pub fn focus(&mut self, tag: &str) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Focus)
    }

    pub fn input(&mut self, tag: &str, text: &str) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Input(text.to_string()))
    }

    pub fn scroll(&mut self, tag: &str, offset: f32) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Scroll(offset))
    }

    pub fn key(&mut self, tag: &str, key: KeyPress) -> Result<(), ShellError> {
        self.send(tag, UiEvent::Key(key))
    }

    /// Runs one command. `Dump` returns the tree dump.
    pub fn run_command(&mut self, command: &ShellCommand) -> Result<Option<String>, ShellError> {
        match command {
            ShellCommand::Event { tag, event } => self.send(tag, event.clone())?,
            ShellCommand::Frame(ms) => self.advance_frame(Duration::from_millis(*ms))?,
            ShellCommand::Wait => self.wait_for_background()?,
            ShellCommand::Dump => return Ok(Some(self.dump())),
        }
        Ok(None)
    }

    /// Parses and runs a script, returning every dump it asked for.
    pub fn run_script(&mut self, script: &str) -> Result<Vec<String>, ShellError> {
        let mut dumps = Vec::new();
        for command in ShellCommand::parse_script(script)? {
            if let Some(dump) = self.run_command(&command)? {
                dumps.push(dump);
            }
        }
        Ok(dumps)
    }
}

impl Default for AppShell {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}
