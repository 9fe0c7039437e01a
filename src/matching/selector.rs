use crate::data::model::{BestPatternMap, HistoricalTable, ReferenceTable};
use crate::error::{MatchError, MatchResult};

use super::observer::{MatchObserver, NoopObserver};

// ---------------------------------------------------------------------------
// PatternSelector – least-squares choice of one reference per historical series
// ---------------------------------------------------------------------------

/// Picks, for every historical series, the reference curve with the smallest
/// sum of squared differences.
pub struct PatternSelector<'a> {
    observer: &'a dyn MatchObserver,
}

impl Default for PatternSelector<'static> {
    fn default() -> Self {
        Self {
            observer: &NoopObserver,
        }
    }
}

impl<'a> PatternSelector<'a> {
    pub fn new(observer: &'a dyn MatchObserver) -> Self {
        Self { observer }
    }

    /// Build the [`BestPatternMap`] in historical column order.
    ///
    /// Ties go to the reference curve that comes first in column order.
    /// Fails with [`MatchError::MissingData`] when either table is empty and
    /// with [`MatchError::MisalignedData`] when the x grids disagree.
    pub fn select(
        &self,
        historical: &HistoricalTable,
        references: &ReferenceTable,
    ) -> MatchResult<BestPatternMap> {
        if historical.is_empty() {
            return Err(MatchError::MissingData(
                "historical table is empty".to_string(),
            ));
        }
        if references.is_empty() {
            return Err(MatchError::MissingData(
                "reference table is empty".to_string(),
            ));
        }
        historical.check_aligned(references)?;

        let mut best = BestPatternMap::default();
        for h in &historical.series {
            let mut chosen: Option<(&str, f64)> = None;
            for r in &references.series {
                let err = sum_squared_error(&h.y, &r.y);
                if chosen.map_or(true, |(_, best_err)| err < best_err) {
                    chosen = Some((r.id.as_str(), err));
                }
            }
            if let Some((reference_id, sse)) = chosen {
                best.insert(h.id.clone(), reference_id, sse);
                if let Some(fit) = best.fit(&h.id) {
                    self.observer.pattern_selected(fit);
                }
            }
        }
        Ok(best)
    }
}

/// Convenience wrapper around [`PatternSelector::select`] without an observer.
pub fn select_best_patterns(
    historical: &HistoricalTable,
    references: &ReferenceTable,
) -> MatchResult<BestPatternMap> {
    PatternSelector::default().select(historical, references)
}

/// Σ (a[i] - b[i])² over the aligned rows. NaN sums rank as +∞.
fn sum_squared_error(a: &[f64], b: &[f64]) -> f64 {
    let sse: f64 = a.iter().zip(b).map(|(p, q)| (p - q).powi(2)).sum();
    if sse.is_nan() {
        f64::INFINITY
    } else {
        sse
    }
}
