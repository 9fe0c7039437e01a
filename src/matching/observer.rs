use crate::data::model::{ClassificationResult, PatternFit};
use crate::error::MatchError;

use super::classifier::Tolerance;

// ---------------------------------------------------------------------------
// Observer interface
// ---------------------------------------------------------------------------

/// Hooks through which the matching core reports progress.
///
/// The core never touches a global logger; callers pass an observer instead.
/// Every hook has an empty default so implementors pick what they need.
pub trait MatchObserver {
    fn pattern_selected(&self, _fit: &PatternFit) {}

    fn tolerance_computed(&self, _tolerance: &Tolerance) {}

    /// A `best` entry named a curve that does not exist and was skipped.
    fn pattern_skipped(&self, _historical_id: &str, _reference_id: &str) {}

    fn observation_classified(&self, _index: usize, _result: &ClassificationResult) {}

    /// An error the run recovered from (e.g. an empty pattern map).
    fn recovered(&self, _error: &MatchError) {}

    fn classification_finished(&self, _assigned: usize, _total: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {}

/// Observer forwarding to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl MatchObserver for LogObserver {
    fn pattern_selected(&self, fit: &PatternFit) {
        log::info!(
            "{} -> {} (sse {:.6})",
            fit.historical_id,
            fit.reference_id,
            fit.sse
        );
    }

    fn tolerance_computed(&self, tolerance: &Tolerance) {
        log::debug!(
            "max deviation for {} via {}: {:.6}",
            tolerance.historical_id,
            tolerance.reference_id,
            tolerance.max_dev
        );
    }

    fn pattern_skipped(&self, historical_id: &str, reference_id: &str) {
        log::warn!("skipping {historical_id} -> {reference_id}: curve not found");
    }

    fn observation_classified(&self, index: usize, result: &ClassificationResult) {
        log::trace!(
            "observation {index} ({}, {}) -> {:?}",
            result.x,
            result.y,
            result.assigned
        );
    }

    fn recovered(&self, error: &MatchError) {
        log::warn!("{error}; continuing without pattern assignments");
    }

    fn classification_finished(&self, assigned: usize, total: usize) {
        log::info!("{assigned} of {total} observations assigned to a reference curve");
    }
}
