//! Lazy loading with prefetch.
//!
//! The globe lives behind a [`LazyModule`]. Hovering or focusing the toggle
//! starts the load early, so by the time the box is checked the model is
//! usually ready and the `...loading` fallback never shows.

#![allow(non_snake_case)]

use std::f64::consts::PI;
use std::rc::Rc;

use perfkit_core::{current_runtime_handle, memo, useState};
use perfkit_foundation::LazyModule;
use perfkit_ui::{record_render, Box, Button, Checkbox, Column, Modifier, SuspenseWithError, Text};

pub const GLOBE_RADIUS: usize = 10;
const GRID_STEP_DEGREES: f64 = 15.0;
const LINE_WIDTH_DEGREES: f64 = 2.5;

/// ASCII wireframe of a sphere, one string per row.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeModel {
    pub radius: usize,
    pub rows: Vec<String>,
}

impl GlobeModel {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.chars().count())
    }
}

fn near_grid_line(degrees: f64) -> bool {
    let offset = degrees.rem_euclid(GRID_STEP_DEGREES);
    offset < LINE_WIDTH_DEGREES || GRID_STEP_DEGREES - offset < LINE_WIDTH_DEGREES
}

/// Orthographic projection of a globe with a meridian and parallel every
/// fifteen degrees. Cells are twice as tall as wide, so each row spans
/// `4 * radius + 1` columns.
pub fn render_globe(radius: usize, rotation_degrees: f64) -> GlobeModel {
    let r = radius.max(1) as f64;
    let height = 2 * radius.max(1) + 1;
    let width = 4 * radius.max(1) + 1;
    let rows = (0..height)
        .map(|row| {
            let y = (row as f64 - r) / r;
            (0..width)
                .map(|column| {
                    let x = (column as f64 - 2.0 * r) / (2.0 * r);
                    let distance = x * x + y * y;
                    if distance > 1.0 {
                        return ' ';
                    }
                    if distance > 0.92 {
                        return 'o';
                    }
                    let z = (1.0 - distance).sqrt();
                    let longitude = x.atan2(z) * 180.0 / PI + rotation_degrees;
                    let latitude = y.asin() * 180.0 / PI;
                    match (near_grid_line(longitude), near_grid_line(latitude)) {
                        (true, true) => '+',
                        (true, false) => '|',
                        (false, true) => '-',
                        (false, false) => '.',
                    }
                })
                .collect::<String>()
        })
        .collect();
    GlobeModel { radius, rows }
}

/// The module loader for the globe.
pub fn load_globe() -> Result<GlobeModel, String> {
    Ok(render_globe(GLOBE_RADIUS, 0.0))
}

pub fn globe_module() -> LazyModule<GlobeModel> {
    LazyModule::new("globe", load_globe)
}

fn GlobeView(model: &GlobeModel) {
    Column(
        Modifier::empty()
            .test_tag("globe")
            .attr("radius", model.radius),
        || {
            for row in &model.rows {
                Text(row.clone(), Modifier::empty());
            }
        },
    );
}

/// Checkbox that reveals the globe, prefetching it on hover and focus.
pub fn CodeSplittingApp(globe: LazyModule<GlobeModel>) {
    memo(globe, |globe: &LazyModule<GlobeModel>| {
        record_render("code-splitting");
        let show_globe = useState(|| false);
        let showing = show_globe.get();

        let prefetch: Rc<dyn Fn()> = {
            let globe = globe.clone();
            let runtime = current_runtime_handle();
            Rc::new(move || {
                if let Some(runtime) = &runtime {
                    globe.preload(runtime);
                }
            })
        };
        let (on_hover, on_focus) = (Rc::clone(&prefetch), prefetch);

        Column(Modifier::empty().test_tag("code-splitting"), || {
            Checkbox(
                showing,
                "show globe",
                Modifier::empty()
                    .test_tag("show-globe")
                    .on_hover(move || (*on_hover)())
                    .on_focus(move || (*on_focus)()),
                move |checked| show_globe.set(checked),
            );
            Box(
                Modifier::empty()
                    .test_tag("globe-frame")
                    .attr("width", 400)
                    .attr("height", 400),
                || {
                    let retry_target = globe.clone();
                    SuspenseWithError(
                        || Text("...loading", Modifier::empty().test_tag("globe-loading")),
                        move |err| {
                            Text(err.to_string(), Modifier::empty().test_tag("globe-error"));
                            Button("retry", Modifier::empty().test_tag("globe-retry"), move || {
                                retry_target.retry();
                            });
                        },
                        || {
                            if showing {
                                let model = globe.suspend()?;
                                GlobeView(&model);
                            }
                            Ok(())
                        },
                    );
                },
            );
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globe_has_expected_shape() {
        let globe = load_globe().expect("globe");
        assert_eq!(globe.rows.len(), 2 * GLOBE_RADIUS + 1);
        assert!(globe.rows.iter().all(|row| row.chars().count() == globe.width()));
        assert_eq!(globe.width(), 4 * GLOBE_RADIUS + 1);

        let first = globe.rows.first().expect("top row");
        assert!(first.starts_with(' ') && first.ends_with(' '));
        let equator = &globe.rows[GLOBE_RADIUS];
        assert!(equator.contains('+'));
        assert!(!equator.trim().contains(' '));
    }

    #[test]
    fn rotation_moves_meridians() {
        assert_ne!(render_globe(6, 0.0), render_globe(6, 7.5));
    }
}
