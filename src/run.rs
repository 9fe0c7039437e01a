use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::MatchConfig;
use crate::data::loader::load_table;
use crate::data::model::{BestPatternMap, ClassificationResult, SeriesTable, Table};
use crate::error::{MatchError, MatchResult};
use crate::matching::classifier::{ObservationClassifier, Tolerance};
use crate::matching::observer::MatchObserver;
use crate::matching::selector::PatternSelector;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The three raw tables a run consumes.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub historical: Table,
    pub references: Table,
    pub observations: Table,
}

impl RunInputs {
    /// Load all three tables from disk (format chosen by extension).
    pub fn load(historical: &Path, references: &Path, observations: &Path) -> Result<Self> {
        Ok(Self {
            historical: load_table(historical)
                .with_context(|| format!("loading historical table {}", historical.display()))?,
            references: load_table(references)
                .with_context(|| format!("loading reference table {}", references.display()))?,
            observations: load_table(observations).with_context(|| {
                format!("loading observations {}", observations.display())
            })?,
        })
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything a run produced, kept together for persistence and plotting.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub historical: SeriesTable,
    pub references: SeriesTable,
    pub best: BestPatternMap,
    pub tolerances: Vec<Tolerance>,
    pub results: Vec<ClassificationResult>,
    pub tolerance_factor: f64,
}

/// One chosen pair in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub historical_id: String,
    pub reference_id: String,
    pub sse: f64,
    pub max_dev: Option<f64>,
}

/// Serializable overview of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub tolerance_factor: f64,
    pub fits: Vec<FitSummary>,
    pub observations: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

impl RunOutcome {
    pub fn assigned_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_assigned()).count()
    }

    pub fn tolerance_for(&self, historical_id: &str) -> Option<&Tolerance> {
        self.tolerances
            .iter()
            .find(|t| t.historical_id == historical_id)
    }

    pub fn summary(&self) -> RunSummary {
        let assigned = self.assigned_count();
        RunSummary {
            tolerance_factor: self.tolerance_factor,
            fits: self
                .best
                .iter()
                .map(|fit| FitSummary {
                    historical_id: fit.historical_id.clone(),
                    reference_id: fit.reference_id.clone(),
                    sse: fit.sse,
                    max_dev: self.tolerance_for(&fit.historical_id).map(|t| t.max_dev),
                })
                .collect(),
            observations: self.results.len(),
            assigned,
            unassigned: self.results.len() - assigned,
        }
    }
}

// ---------------------------------------------------------------------------
// execute – one classification run
// ---------------------------------------------------------------------------

/// Select patterns, then classify every observation.
///
/// A [`MatchError::MissingData`] from the selector is reported to the
/// observer and the run goes on with an empty pattern map, so every
/// observation comes out unassigned. Any other error stops the run.
pub fn execute(
    inputs: &RunInputs,
    config: &MatchConfig,
    observer: &dyn MatchObserver,
) -> MatchResult<RunOutcome> {
    config.validate()?;
    let classifier = ObservationClassifier::new(config.clone(), observer);
    let observations = classifier.observations_from(&inputs.observations)?;

    let historical = series_table(&inputs.historical, &config.x_column)?;
    let references = series_table(&inputs.references, &config.x_column)?;

    let best = match PatternSelector::new(observer).select(&historical, &references) {
        Ok(best) => best,
        Err(err @ MatchError::MissingData(_)) => {
            observer.recovered(&err);
            BestPatternMap::default()
        }
        Err(err) => return Err(err),
    };

    let tolerances = classifier.tolerances(&historical, &references, &best)?;
    let results =
        classifier.classify_observations(&observations, &historical, &references, &best)?;

    Ok(RunOutcome {
        historical,
        references,
        best,
        tolerances,
        results,
        tolerance_factor: config.tolerance_factor,
    })
}

/// A table without any column counts as an empty series table.
fn series_table(table: &Table, x_column: &str) -> MatchResult<SeriesTable> {
    if table.columns().is_empty() {
        return Ok(SeriesTable::default());
    }
    SeriesTable::from_table(table, x_column)
}
