//! Rendering-performance exercises built on the perfkit runtime.

pub mod cities;
pub mod code_splitting;
pub mod filter;
pub mod grid_slices;
pub mod virtual_cities;

use clap::ValueEnum;
use perfkit_ui::{AppSettings, AppShell, ShellError};

use code_splitting::{globe_module, CodeSplittingApp};
use grid_slices::{GridApp, GridConfig};
use virtual_cities::{CityFinderApp, CityFinderConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Exercise {
    /// Lazy-loaded globe with prefetch on hover/focus.
    CodeSplitting,
    /// Filterable city combobox with a windowed menu.
    VirtualCities,
    /// Grid of cells that re-render only when their own value changes.
    GridSlices,
}

impl Exercise {
    /// Root content for a shell. State that must outlive recomposition, such
    /// as the lazily loaded globe, is created here once.
    pub fn content(self, viewport_height: f32, seed: u64) -> Box<dyn FnMut()> {
        match self {
            Exercise::CodeSplitting => {
                let globe = globe_module();
                Box::new(move || CodeSplittingApp(globe.clone()))
            }
            Exercise::VirtualCities => {
                let config = CityFinderConfig::default().list_height(viewport_height);
                Box::new(move || CityFinderApp(config.clone()))
            }
            Exercise::GridSlices => {
                let config = GridConfig::default().seed(seed);
                Box::new(move || GridApp(config.clone()))
            }
        }
    }
}

/// Output of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessRun {
    /// One entry per `dump` command in the script.
    pub dumps: Vec<String>,
    /// The tree once the script has run and background work has landed.
    pub final_dump: String,
}

/// Mounts `exercise`, runs `script` and waits for background work before
/// taking the final dump.
pub fn run_headless(
    exercise: Exercise,
    settings: AppSettings,
    seed: u64,
    script: Option<&str>,
) -> Result<HeadlessRun, ShellError> {
    let height = settings.viewport_height;
    let mut shell = AppShell::new(settings);
    shell.set_content(exercise.content(height, seed))?;
    shell.wait_for_background()?;
    let dumps = match script {
        Some(script) => shell.run_script(script)?,
        None => Vec::new(),
    };
    shell.wait_for_background()?;
    Ok(HeadlessRun {
        dumps,
        final_dump: shell.dump(),
    })
}
