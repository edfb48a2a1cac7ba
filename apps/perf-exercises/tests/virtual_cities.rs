use std::time::Duration;

use perf_exercises::cities::all_cities;
use perf_exercises::filter::filter_cities;
use perf_exercises::virtual_cities::{CityFinderApp, CityFinderConfig};
use perfkit_core::KeyPress;
use perfkit_testing::Robot;

fn launch(config: CityFinderConfig) -> Robot {
    let mut robot = Robot::launch(move || CityFinderApp(config.clone())).expect("launch");
    robot.settle().expect("initial filter");
    robot
}

fn attr(robot: &mut Robot, tag: &str, name: &str) -> Option<String> {
    robot
        .rule()
        .node_with_tag(tag)
        .ok()?
        .element
        .attr_value(name)
        .map(str::to_string)
}

fn row_text(robot: &mut Robot, index: usize) -> Option<String> {
    robot
        .rule()
        .node_with_tag(&format!("city-row-{index}"))
        .ok()?
        .element
        .text
}

#[test]
fn renders_only_the_visible_window() {
    let mut robot = launch(CityFinderConfig::default());
    let total = all_cities().len();
    assert!(robot.has_text(&format!("{total} cities")));
    assert_eq!(attr(&mut robot, "city-list", "total-size"), Some((total * 20).to_string()));
    // 300px / 20px rows = 15 visible, plus 10 overscan below.
    assert_eq!(attr(&mut robot, "city-list", "rows").as_deref(), Some("25"));
    assert_eq!(row_text(&mut robot, 0).as_deref(), Some("Abidjan"));
    assert!(row_text(&mut robot, 24).is_some());
    assert!(row_text(&mut robot, 25).is_none());
    assert_eq!(attr(&mut robot, "city-list", "role").as_deref(), Some("listbox"));
}

#[test]
fn scrolling_moves_the_window() {
    let mut robot = launch(CityFinderConfig::default());
    robot.scroll("city-list", 1000.0).expect("scroll");
    // Rows 50..=64 are visible, 40..=74 rendered.
    assert!(row_text(&mut robot, 39).is_none());
    assert!(row_text(&mut robot, 40).is_some());
    assert!(row_text(&mut robot, 74).is_some());
    assert_eq!(attr(&mut robot, "city-list", "rows").as_deref(), Some("35"));
}

#[test]
fn typing_filters_the_list() {
    let mut robot = launch(CityFinderConfig::default());
    robot.type_text("city-input", "san").expect("type");
    robot.settle().expect("filter");

    let expected = filter_cities("san");
    assert!(!expected.is_empty());
    assert!(robot.has_text(&format!("{} cities", expected.len())));
    assert_eq!(row_text(&mut robot, 0).as_deref(), Some(expected[0].name));
    assert_eq!(
        attr(&mut robot, "city-input", "aria-expanded").as_deref(),
        Some("true")
    );
}

#[test]
fn stale_filter_results_are_dropped() {
    let config = CityFinderConfig::default().filter_latency(Duration::from_millis(40));
    let mut robot = launch(config);
    robot.type_text("city-input", "lon").expect("first query");
    assert!(robot
        .texts()
        .iter()
        .any(|text| text.ends_with("(filtering)")));
    robot.type_text("city-input", "par").expect("second query");
    robot.settle().expect("filter");

    let expected = filter_cities("par");
    assert!(robot.has_text(&format!("{} cities", expected.len())));
    assert_eq!(row_text(&mut robot, 0).as_deref(), Some(expected[0].name));
    assert!(!robot.texts().iter().any(|text| text == "London"));
}

#[test]
fn keyboard_highlight_scrolls_into_view() {
    let mut robot = launch(CityFinderConfig::default());
    let last = all_cities().len() - 1;

    robot.press_key("city-input", KeyPress::ArrowUp).expect("open at end");
    let tag = format!("city-row-{last}");
    assert_eq!(attr(&mut robot, &tag, "background").as_deref(), Some("lightgray"));
    assert_eq!(attr(&mut robot, &tag, "aria-selected").as_deref(), Some("true"));
    let max_offset = (all_cities().len() * 20 - 300).to_string();
    assert_eq!(attr(&mut robot, "city-list", "scroll-offset"), Some(max_offset));
    assert_eq!(
        attr(&mut robot, "city-input", "aria-activedescendant"),
        Some(format!("city-item-{last}"))
    );

    robot.press_key("city-input", KeyPress::ArrowDown).expect("wrap to start");
    assert_eq!(attr(&mut robot, "city-row-0", "background").as_deref(), Some("lightgray"));
    assert_eq!(attr(&mut robot, "city-list", "scroll-offset").as_deref(), Some("0"));
}

#[test]
fn selecting_and_clearing_report_feedback() {
    let mut robot = launch(CityFinderConfig::default());
    assert!(robot.has_text("Nothing selected"));
    let name = row_text(&mut robot, 3).expect("fourth row");

    robot.click("city-row-3").expect("select");
    robot.settle().expect("refilter");
    assert!(robot.has_text(&format!("You selected {name}")));
    assert_eq!(attr(&mut robot, "city-input", "value"), Some(name.clone()));
    assert_eq!(attr(&mut robot, "city-row-0", "font-weight").as_deref(), Some("bold"));

    robot.click("clear-selection").expect("clear");
    robot.settle().expect("refilter");
    assert!(robot.has_text("Selection Cleared"));
    assert_eq!(attr(&mut robot, "city-input", "value").as_deref(), Some(""));
}

#[test]
fn force_rerender_keeps_the_window() {
    let mut robot = launch(CityFinderConfig::default());
    let before = robot.render_probe().count("city-finder");
    robot.click("force-rerender").expect("rerender");
    assert_eq!(robot.render_probe().count("city-finder"), before + 1);
    assert_eq!(attr(&mut robot, "city-list", "rows").as_deref(), Some("25"));
}
