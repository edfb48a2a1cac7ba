//! Windowed city finder.
//!
//! A combobox over an asynchronously filtered city list. The menu is a
//! [`VirtualList`], so only the rows in view (plus overscan) exist in the
//! tree no matter how many cities match.

#![allow(non_snake_case)]

use std::rc::Rc;
use std::time::Duration;

use perfkit_core::{emit, memo, useState};
use perfkit_foundation::{remember_virtual_list_state, use_async, ScrollAlign, VirtualItem};
use perfkit_ui::{
    record_render, useCombobox, useForceRerender, Button, Column, Combobox, ComboboxOptions,
    Modifier, Row, Text, VirtualList, VirtualListSpec,
};

use crate::cities::City;
use crate::filter::filter_cities_in_worker;

#[derive(Debug, Clone, PartialEq)]
pub struct CityFinderConfig {
    pub list_height: f32,
    pub row_height: f32,
    pub overscan: usize,
    /// Extra time the filter worker takes per query.
    pub filter_latency: Duration,
}

impl Default for CityFinderConfig {
    fn default() -> Self {
        Self {
            list_height: 300.0,
            row_height: 20.0,
            overscan: 10,
            filter_latency: Duration::ZERO,
        }
    }
}

impl CityFinderConfig {
    pub fn list_height(mut self, height: f32) -> Self {
        self.list_height = height;
        self
    }

    pub fn filter_latency(mut self, latency: Duration) -> Self {
        self.filter_latency = latency;
        self
    }
}

fn CityRow(combobox: &Combobox<City>, index: usize, city: &City) {
    let highlighted = combobox.highlighted_index() == Some(index);
    let selected = combobox
        .selected_item()
        .is_some_and(|current| current.id == city.id);
    emit(
        combobox
            .item_element(index)
            .test_tag(format!("city-row-{index}"))
            .text(city.name)
            .attr("background", if highlighted { "lightgray" } else { "inherit" })
            .attr("font-weight", if selected { "bold" } else { "normal" }),
    );
}

pub fn CityFinderApp(config: CityFinderConfig) {
    memo(config, |config: &CityFinderConfig| {
        record_render("city-finder");
        let force_rerender = useForceRerender();
        let input_value = useState(String::new);
        let query = input_value.get();

        let latency = config.filter_latency;
        let worker_query = query.clone();
        let filtered = use_async(query, move |token| {
            filter_cities_in_worker(&worker_query, latency, &token)
        });
        let items: Rc<[City]> = filtered.data.clone().unwrap_or_default().into();

        let list_state = remember_virtual_list_state();
        let status = useState(|| "Nothing selected".to_string());
        let (input_target, status_target, scroll_target) =
            (input_value.clone(), status.clone(), list_state.clone());
        let combobox = useCombobox(
            ComboboxOptions::new("city", Rc::clone(&items), |city: &City| city.name.to_string())
                .on_input_value_change(move |value| input_target.set(value))
                .on_selected_item_change(move |selected: Option<City>| {
                    let message = match selected {
                        Some(city) => format!("You selected {}", city.name),
                        None => "Selection Cleared".to_string(),
                    };
                    log::info!("{message}");
                    status_target.set(message);
                })
                .on_highlighted_index_change(move |index| {
                    if let Some(index) = index {
                        scroll_target.scroll_to_index(index, ScrollAlign::Auto);
                    }
                }),
        );

        Column(Modifier::empty().test_tag("city-app"), || {
            Button(
                "force rerender",
                Modifier::empty().test_tag("force-rerender"),
                move || force_rerender.trigger(),
            );
            emit(combobox.label_element("Find a city").test_tag("city-label"));
            Row(Modifier::empty().test_tag("city-combobox"), || {
                emit(combobox.input_element().test_tag("city-input"));
                let clear = combobox.clone();
                Button(
                    "\u{2715}",
                    Modifier::empty()
                        .test_tag("clear-selection")
                        .attr("aria-label", "toggle menu"),
                    move || clear.select_item(None),
                );
            });
            Text(status.get(), Modifier::empty().test_tag("city-status"));
            let summary = if filtered.is_pending() {
                format!("{} cities (filtering)", items.len())
            } else {
                format!("{} cities", items.len())
            };
            Text(summary, Modifier::empty().test_tag("city-count"));

            let menu_props = combobox.ids().menu_props();
            let row_height = config.row_height;
            let (rows, menu) = (Rc::clone(&items), combobox.clone());
            VirtualList(
                items.len(),
                &list_state,
                VirtualListSpec::new(config.list_height)
                    .overscan(config.overscan)
                    .modifier(
                        Modifier::empty()
                            .test_tag("city-list")
                            .attr("id", &menu_props.id)
                            .attrs(&menu_props.attrs),
                    ),
                move |_| row_height,
                move |row: VirtualItem| {
                    if let Some(city) = rows.get(row.index) {
                        CityRow(&menu, row.index, city);
                    }
                },
            );
        });
    });
}
