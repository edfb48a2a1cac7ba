use anyhow::Context;
use clap::Parser;
use perf_exercises::{run_headless, Exercise};
use perfkit_ui::AppSettings;

/// Runs one exercise headlessly and prints its view tree.
#[derive(Parser, Debug)]
#[command(name = "perf-exercises", version, about)]
struct Cli {
    #[arg(value_enum)]
    exercise: Exercise,

    /// Height of scroll containers, in px.
    #[arg(long, default_value_t = 300.0)]
    viewport_height: f32,

    /// Seed for the grid values.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Robot commands separated by `;`, e.g. `hover:show-globe;click:show-globe;wait`.
    #[arg(long)]
    script: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    log::info!("starting {:?}", cli.exercise);

    let settings = AppSettings::default().viewport_height(cli.viewport_height);
    let run = run_headless(cli.exercise, settings, cli.seed, cli.script.as_deref())
        .with_context(|| match &cli.script {
            Some(script) => format!("script {script:?} failed"),
            None => format!("{:?} failed to compose", cli.exercise),
        })?;
    for dump in run.dumps {
        println!("{dump}");
    }
    print!("{}", run.final_dump);
    Ok(())
}
