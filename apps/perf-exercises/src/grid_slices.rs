//! Render-scope isolation over a large shared grid.
//!
//! One reducer owns the grid. Its read-only view and its dispatcher travel
//! through separate static locals, and every cell reads only its own value
//! through [`with_state_slice`]. Clicking a cell therefore re-renders that
//! cell alone, and the dog-name input, which keeps its state in its own
//! provider next to where it is used, never touches the grid at all.

#![allow(non_snake_case)]

use std::time::Duration;

use perfkit_core::{
    memo, requiredStaticCompositionLocalOf, useReducer, useState, with_key, CompositionLocalProvider,
    Dispatch, LaunchedEffectAsync, LaunchedEffectScope, MutableState, ReducerError, State,
    StaticCompositionLocal,
};
use perfkit_ui::{
    record_render, useDebouncedState, useForceRerender, with_state_slice, Button, Checkbox,
    Column, Form, Label, Modifier, NumberInput, Row, SliceComponent, Text, TextInput,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const GRID_SIZE: usize = 100;
const MAX_CELL_VALUE: f64 = 100.0;

/// State owned by [`app_reducer`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub grid: Vec<Vec<f64>>,
    rng: StdRng,
}

impl AppState {
    /// A `size` x `size` grid of values in `[0, 100)`.
    pub fn new(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = (0..size)
            .map(|_| (0..size).map(|_| rng.gen_range(0.0..MAX_CELL_VALUE)).collect())
            .collect();
        Self { grid, rng }
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn columns(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.grid.get(row)?.get(column).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    UpdateGrid,
    UpdateGridCell { row: usize, column: usize },
}

pub fn app_reducer(state: &AppState, action: AppAction) -> Result<AppState, ReducerError> {
    match action {
        AppAction::UpdateGrid => {
            let mut next = state.clone();
            let rng = &mut next.rng;
            for row in &mut next.grid {
                for cell in row.iter_mut() {
                    *cell = rng.gen_range(0.0..MAX_CELL_VALUE);
                }
            }
            log::debug!("randomized {}x{} grid", next.rows(), next.columns());
            Ok(next)
        }
        AppAction::UpdateGridCell { row, column } => {
            if state.cell(row, column).is_none() {
                return Err(ReducerError::rejected(
                    &AppAction::UpdateGridCell { row, column },
                    format!("cell ({row}, {column}) is outside the grid"),
                ));
            }
            let mut next = state.clone();
            let value = next.rng.gen_range(0.0..MAX_CELL_VALUE);
            next.grid[row][column] = value;
            Ok(next)
        }
    }
}

thread_local! {
    static APP_STATE: StaticCompositionLocal<State<AppState>> =
        requiredStaticCompositionLocalOf("AppState");
    static APP_DISPATCH: StaticCompositionLocal<Dispatch<AppAction>> =
        requiredStaticCompositionLocalOf("AppDispatch");
    static DOG_NAME_INPUT: StaticCompositionLocal<MutableState<String>> =
        requiredStaticCompositionLocalOf("DogNameInput");
}

pub fn local_app_state() -> StaticCompositionLocal<State<AppState>> {
    APP_STATE.with(Clone::clone)
}

pub fn local_app_dispatch() -> StaticCompositionLocal<Dispatch<AppAction>> {
    APP_DISPATCH.with(Clone::clone)
}

pub fn local_dog_name_input() -> StaticCompositionLocal<MutableState<String>> {
    DOG_NAME_INPUT.with(Clone::clone)
}

pub fn useAppState() -> State<AppState> {
    local_app_state().current()
}

pub fn useAppDispatch() -> Dispatch<AppAction> {
    local_app_dispatch().current()
}

pub fn useDogNameInput() -> MutableState<String> {
    local_dog_name_input().current()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub size: usize,
    pub seed: u64,
    pub initial_rows: i64,
    pub initial_columns: i64,
    pub debounce: Duration,
    pub randomize_interval: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            seed: 0,
            initial_rows: 50,
            initial_columns: 50,
            debounce: Duration::from_millis(300),
            randomize_interval: Duration::from_millis(500),
        }
    }
}

impl GridConfig {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn window(mut self, rows: i64, columns: i64) -> Self {
        self.initial_rows = rows;
        self.initial_columns = columns;
        self
    }
}

pub fn AppProvider(config: &GridConfig, content: impl FnOnce()) {
    let (size, seed) = (config.size, config.seed);
    let (state, dispatch) = useReducer(app_reducer, || AppState::new(size, seed));
    CompositionLocalProvider(
        [
            local_app_state().provides(state),
            local_app_dispatch().provides(dispatch),
        ],
        content,
    );
}

pub fn DogNameInputProvider(content: impl FnOnce()) {
    let dog_name = useState(String::new);
    CompositionLocalProvider([local_dog_name_input().provides(dog_name)], content);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellProps {
    pub row: usize,
    pub column: usize,
}

pub struct GridCell;

impl SliceComponent for GridCell {
    type Props = CellProps;
    type Slice = f64;

    fn render(props: &CellProps, value: &f64) {
        let CellProps { row, column } = *props;
        record_render(&format!("cell:{row}:{column}"));
        let dispatch = useAppDispatch();
        let value = *value;
        Button(
            format!("{}", value.floor()),
            Modifier::empty()
                .test_tag(format!("cell-{row}-{column}"))
                .attr("color", if value > 50.0 { "white" } else { "black" })
                .attr("background", format!("rgba(0, 0, 0, {})", value / 100.0)),
            move || dispatch.dispatch(AppAction::UpdateGridCell { row, column }),
        );
    }
}

fn DimensionInput(label: &str, id: &'static str, value: i64, on_change: impl Fn(i64) + 'static) {
    Row(Modifier::empty(), || {
        Label(label, id, Modifier::empty());
        NumberInput(
            value,
            Modifier::empty()
                .test_tag(id)
                .attr("id", id)
                .attr("min", 1)
                .attr("max", GRID_SIZE),
            move |requested| on_change(requested.clamp(1, GRID_SIZE as i64)),
        );
    });
}

/// Controls plus the visible window of cells.
fn Grid(config: &GridConfig) {
    memo(config.clone(), |config: &GridConfig| {
        record_render("grid");
        let dispatch = useAppDispatch();
        let (rows, rows_input) = useDebouncedState(|| config.initial_rows, config.debounce);
        let (columns, columns_input) =
            useDebouncedState(|| config.initial_columns, config.debounce);
        let keep_randomizing = useState(|| false);
        let randomizing = keep_randomizing.get();

        let interval_nanos = u64::try_from(config.randomize_interval.as_nanos()).unwrap_or(u64::MAX);
        let ticker = dispatch.clone();
        LaunchedEffectAsync!(randomizing, move |scope: LaunchedEffectScope| {
            let clock = scope.runtime().frame_clock();
            Box::pin(async move {
                if !randomizing {
                    return;
                }
                let mut last = clock.next_frame().await;
                loop {
                    let now = clock.next_frame().await;
                    if now.saturating_sub(last) >= interval_nanos {
                        ticker.dispatch(AppAction::UpdateGrid);
                        last = now;
                    }
                }
            })
        });

        Form(Modifier::empty().test_tag("grid-controls"), || {
            let update = dispatch.clone();
            Button(
                "Update Grid Data",
                Modifier::empty().test_tag("update-grid"),
                move || update.dispatch(AppAction::UpdateGrid),
            );
            Checkbox(
                randomizing,
                "Keep Randomizing",
                Modifier::empty().test_tag("keep-randomizing"),
                move |checked| keep_randomizing.set(checked),
            );
            let rows_target = rows_input.clone();
            DimensionInput("Rows to display: ", "rows", rows_input.latest(), move |value| {
                rows_target.set(value)
            });
            let columns_target = columns_input.clone();
            DimensionInput(
                "Columns to display: ",
                "columns",
                columns_input.latest(),
                move |value| columns_target.set(value),
            );
        });

        let rows = usize::try_from(rows).unwrap_or(0).min(config.size);
        let columns = usize::try_from(columns).unwrap_or(0).min(config.size);
        let cell = with_state_slice::<AppState, GridCell, _>(local_app_state(), |state, props| {
            state.cell(props.row, props.column).unwrap_or_default()
        });
        Column(
            Modifier::empty()
                .test_tag("grid")
                .attr("rows", rows)
                .attr("columns", columns)
                .attr("width", columns * 40),
            || {
                for row in 0..rows {
                    with_key(&row, || {
                        Row(Modifier::empty(), || {
                            for column in 0..columns {
                                with_key(&column, || cell.render(CellProps { row, column }));
                            }
                        });
                    });
                }
            },
        );
    });
}

fn DogNameInput() {
    memo((), |_| {
        record_render("dog-name-input");
        let dog_name = useDogNameInput();
        let name = dog_name.get();
        Form(Modifier::empty().test_tag("dog-form"), || {
            Label("Dog Name", "dogName", Modifier::empty());
            TextInput(
                &name,
                Modifier::empty()
                    .test_tag("dog-name")
                    .attr("id", "dogName")
                    .attr("placeholder", "Toto"),
                move |value| dog_name.set(value),
            );
            if !name.is_empty() {
                Text(
                    format!("{name}, I've a feeling we're not in Kansas anymore"),
                    Modifier::empty().test_tag("dog-greeting"),
                );
            }
        });
    });
}

pub fn GridApp(config: GridConfig) {
    memo(config, |config: &GridConfig| {
        record_render("grid-app");
        let force_rerender = useForceRerender();
        Column(Modifier::empty().test_tag("grid-app"), || {
            Button(
                "force rerender",
                Modifier::empty().test_tag("force-rerender"),
                move || force_rerender.trigger(),
            );
            Column(Modifier::empty(), || {
                DogNameInputProvider(DogNameInput);
                AppProvider(config, || Grid(config));
            });
        });
    });
}
