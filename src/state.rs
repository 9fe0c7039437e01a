use std::path::{Path, PathBuf};

use ideal_match::config::MatchConfig;
use ideal_match::data::filter::{FilterState, filtered_indices, init_filter_state};
use ideal_match::data::model::Table;
use ideal_match::matching::observer::LogObserver;
use ideal_match::run::{RunInputs, RunOutcome, execute};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Input slots
// ---------------------------------------------------------------------------

/// The three tables the viewer needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Historical,
    References,
    Observations,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::Historical,
        TableKind::References,
        TableKind::Observations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TableKind::Historical => "Historical",
            TableKind::References => "Ideal functions",
            TableKind::Observations => "Observations",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Source path of each loaded table.
    pub paths: [Option<PathBuf>; 3],

    /// Loaded tables (empty until the user opens a file).
    pub inputs: RunInputs,

    /// Parameters applied on the next run.
    pub config: MatchConfig,

    /// Result of the last successful run.
    pub outcome: Option<RunOutcome>,

    /// Selected assignment groups.
    pub filters: FilterState,

    /// Indices of results passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Colours per historical series / reference curve.
    pub color_map: ColorMap,

    /// Draw the chosen reference curves next to the historical series.
    pub show_references: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            show_references: true,
            ..Default::default()
        }
    }

    fn slot(kind: TableKind) -> usize {
        kind as usize
    }

    pub fn path(&self, kind: TableKind) -> Option<&Path> {
        self.paths[Self::slot(kind)].as_deref()
    }

    /// Store a freshly loaded table; any previous run is discarded.
    pub fn set_table(&mut self, kind: TableKind, path: PathBuf, table: Table) {
        match kind {
            TableKind::Historical => self.inputs.historical = table,
            TableKind::References => self.inputs.references = table,
            TableKind::Observations => self.inputs.observations = table,
        }
        self.paths[Self::slot(kind)] = Some(path);
        self.outcome = None;
        self.filters.clear();
        self.visible_indices.clear();
        self.status_message = None;
    }

    pub fn ready(&self) -> bool {
        self.paths.iter().all(Option::is_some)
    }

    /// Run selection and classification on the loaded tables.
    pub fn run(&mut self) {
        match execute(&self.inputs, &self.config, &LogObserver) {
            Ok(outcome) => self.set_outcome(outcome),
            Err(e) => {
                log::error!("Classification failed: {e}");
                self.outcome = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a run outcome, initialise filters and colours.
    pub fn set_outcome(&mut self, outcome: RunOutcome) {
        self.filters = init_filter_state(&outcome.results);
        self.visible_indices = (0..outcome.results.len()).collect();
        self.color_map = ColorMap::new(
            outcome
                .best
                .iter()
                .map(|f| (f.historical_id.as_str(), f.reference_id.as_str())),
        );
        self.status_message = if outcome.best.is_empty() {
            Some("No pattern could be selected; all observations unassigned".to_string())
        } else {
            None
        };
        self.outcome = Some(outcome);
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        if let Some(outcome) = &self.outcome {
            self.visible_indices = filtered_indices(&outcome.results, &self.filters);
        }
    }

    /// Toggle a single assignment group.
    pub fn toggle_group(&mut self, group: &str) {
        if !self.filters.remove(group) {
            self.filters.insert(group.to_string());
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        if let Some(outcome) = &self.outcome {
            self.filters = init_filter_state(&outcome.results);
            self.refilter();
        }
    }

    pub fn select_none(&mut self) {
        self.filters.clear();
        self.refilter();
    }
}
