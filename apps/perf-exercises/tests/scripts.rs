use perf_exercises::{run_headless, Exercise};
use perfkit_ui::{AppSettings, AppShell, ShellError};

fn shell_for(exercise: Exercise) -> AppShell {
    let settings = AppSettings::default();
    let height = settings.viewport_height;
    let mut shell = AppShell::new(settings);
    shell
        .set_content(exercise.content(height, 11))
        .expect("initial composition");
    shell.wait_for_background().expect("settle");
    shell
}

#[test]
fn code_splitting_script_prefetches_then_shows() {
    let mut shell = shell_for(Exercise::CodeSplitting);
    let dumps = shell
        .run_script("hover:show-globe; wait; click:show-globe; dump")
        .expect("script");
    assert_eq!(dumps.len(), 1);
    assert!(dumps[0].contains("column#globe radius=\"10\""));
    assert!(!dumps[0].contains("...loading"));
}

#[test]
fn virtual_cities_script_filters() {
    let mut shell = shell_for(Exercise::VirtualCities);
    let dumps = shell
        .run_script("input:city-input=tokyo; wait; dump")
        .expect("script");
    assert!(dumps[0].contains("text#city-count \"1 cities\""));
    assert!(dumps[0].contains("\"Tokyo\""));
}

#[test]
fn grid_script_reports_missing_cells() {
    let mut shell = shell_for(Exercise::GridSlices);
    assert!(shell.run_script("click:cell-0-0").is_ok());
    assert_eq!(
        shell.run_script("click:cell-99-99"),
        Err(ShellError::UnknownTag("cell-99-99".into()))
    );
}

#[test]
fn final_dump_waits_for_the_filter() {
    let run = run_headless(
        Exercise::VirtualCities,
        AppSettings::default(),
        0,
        Some("input:city-input=zzzz"),
    )
    .expect("run");
    assert!(run.dumps.is_empty());
    assert!(run.final_dump.contains("text#city-count \"0 cities\""));
}

#[test]
fn non_finite_scroll_leaves_the_list_in_place() {
    let run = run_headless(
        Exercise::VirtualCities,
        AppSettings::default(),
        0,
        Some("scroll:city-list=NaN; scroll:city-list=inf; dump"),
    )
    .expect("run");
    assert!(run.dumps[0].contains("\"Abidjan\""));
    assert!(run.dumps[0].contains("city-row-24"));
}
