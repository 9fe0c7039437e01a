use serde::Serialize;

use crate::config::MatchConfig;
use crate::data::model::{
    BestPatternMap, ClassificationResult, HistoricalTable, Observation, ReferenceTable, Series,
    Table,
};
use crate::error::{MatchError, MatchResult};

use super::index::XIndex;
use super::observer::{MatchObserver, NoopObserver};

// ---------------------------------------------------------------------------
// Tolerance – acceptance bound per historical series
// ---------------------------------------------------------------------------

/// Largest deviation an observation may have from `reference_id` and still be
/// assigned to it through `historical_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tolerance {
    pub historical_id: String,
    pub reference_id: String,
    pub max_dev: f64,
}

/// A tolerance paired with the reference curve it gates.
struct Candidate<'t> {
    tolerance: Tolerance,
    curve: &'t Series,
}

// ---------------------------------------------------------------------------
// ObservationClassifier
// ---------------------------------------------------------------------------

/// Assigns test observations to the reference curves chosen by the
/// [`PatternSelector`](super::selector::PatternSelector).
pub struct ObservationClassifier<'a> {
    config: MatchConfig,
    observer: &'a dyn MatchObserver,
}

impl Default for ObservationClassifier<'static> {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
            observer: &NoopObserver,
        }
    }
}

impl<'a> ObservationClassifier<'a> {
    pub fn new(config: MatchConfig, observer: &'a dyn MatchObserver) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Check the observation table's schema, then classify every row.
    ///
    /// The x / y columns are looked up once, before any row is processed;
    /// a missing one fails the whole batch with [`MatchError::InvalidInput`].
    pub fn classify(
        &self,
        observations: &Table,
        historical: &HistoricalTable,
        references: &ReferenceTable,
        best: &BestPatternMap,
    ) -> MatchResult<Vec<ClassificationResult>> {
        let observations = self.observations_from(observations)?;
        self.classify_observations(&observations, historical, references, best)
    }

    /// Extract `(x, y)` pairs from a raw observation table.
    pub fn observations_from(&self, table: &Table) -> MatchResult<Vec<Observation>> {
        let (x_name, y_name) = (&self.config.x_column, &self.config.y_column);
        let xs = table.column(x_name).ok_or_else(|| {
            MatchError::InvalidInput(format!("observations lack the '{x_name}' column"))
        })?;
        let ys = table.column(y_name).ok_or_else(|| {
            MatchError::InvalidInput(format!("observations lack the '{y_name}' column"))
        })?;
        Ok(xs
            .values
            .iter()
            .zip(&ys.values)
            .map(|(&x, &y)| Observation { x, y })
            .collect())
    }

    /// Classify already-extracted observations, one result per input, in order.
    pub fn classify_observations(
        &self,
        observations: &[Observation],
        historical: &HistoricalTable,
        references: &ReferenceTable,
        best: &BestPatternMap,
    ) -> MatchResult<Vec<ClassificationResult>> {
        self.config.validate()?;
        let candidates = self.candidates(historical, references, best)?;
        let index = XIndex::new(&references.x);

        let mut results = Vec::with_capacity(observations.len());
        let mut assigned = 0;
        for (i, &obs) in observations.iter().enumerate() {
            let result = assign(obs, &candidates, &index);
            if result.is_assigned() {
                assigned += 1;
            }
            self.observer.observation_classified(i, &result);
            results.push(result);
        }
        self.observer
            .classification_finished(assigned, observations.len());
        Ok(results)
    }

    /// `max_dev` for every usable `(historical, best[historical])` pair, in
    /// historical column order.
    pub fn tolerances(
        &self,
        historical: &HistoricalTable,
        references: &ReferenceTable,
        best: &BestPatternMap,
    ) -> MatchResult<Vec<Tolerance>> {
        self.config.validate()?;
        Ok(self
            .candidates(historical, references, best)?
            .into_iter()
            .map(|c| c.tolerance)
            .collect())
    }

    fn candidates<'t>(
        &self,
        historical: &HistoricalTable,
        references: &'t ReferenceTable,
        best: &BestPatternMap,
    ) -> MatchResult<Vec<Candidate<'t>>> {
        for fit in best.iter() {
            if historical.get(&fit.historical_id).is_none() {
                self.observer
                    .pattern_skipped(&fit.historical_id, &fit.reference_id);
            }
        }

        let mut aligned = false;
        let mut candidates = Vec::new();
        for h in &historical.series {
            let Some(reference_id) = best.get(&h.id) else {
                continue;
            };
            let Some(curve) = references.get(reference_id) else {
                self.observer.pattern_skipped(&h.id, reference_id);
                continue;
            };
            if !aligned {
                historical.check_aligned(references)?;
                aligned = true;
            }
            let tolerance = Tolerance {
                historical_id: h.id.clone(),
                reference_id: curve.id.clone(),
                max_dev: self.config.tolerance_factor * max_abs_difference(&h.y, &curve.y),
            };
            self.observer.tolerance_computed(&tolerance);
            candidates.push(Candidate { tolerance, curve });
        }
        Ok(candidates)
    }
}

/// Best accepted candidate for one observation. Only a strictly smaller
/// deviation replaces the current pick, so earlier historical series win ties.
fn assign(obs: Observation, candidates: &[Candidate<'_>], index: &XIndex) -> ClassificationResult {
    let Some(row) = index.row_of(obs.x) else {
        return ClassificationResult::unassigned(obs);
    };

    let mut chosen: Option<(&str, f64)> = None;
    for c in candidates {
        let deviation = (obs.y - c.curve.y[row]).abs();
        if deviation <= c.tolerance.max_dev
            && chosen.map_or(true, |(_, min_dev)| deviation < min_dev)
        {
            chosen = Some((c.tolerance.reference_id.as_str(), deviation));
        }
    }

    match chosen {
        Some((reference_id, deviation)) => ClassificationResult {
            x: obs.x,
            y: obs.y,
            deviation: Some(deviation),
            assigned: Some(reference_id.to_string()),
        },
        None => ClassificationResult::unassigned(obs),
    }
}

fn max_abs_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(p, q)| (p - q).abs())
        .fold(0.0, f64::max)
}

/// Convenience wrapper around [`ObservationClassifier::classify`] with the
/// default √2 margin and no observer.
pub fn classify(
    observations: &Table,
    historical: &HistoricalTable,
    references: &ReferenceTable,
    best: &BestPatternMap,
) -> MatchResult<Vec<ClassificationResult>> {
    ObservationClassifier::default().classify(observations, historical, references, best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, SeriesTable};
    use crate::matching::selector::select_best_patterns;

    fn series_table(x: &[f64], cols: &[(&str, &[f64])]) -> SeriesTable {
        SeriesTable {
            x: x.to_vec(),
            series: cols
                .iter()
                .map(|(id, y)| Series {
                    id: id.to_string(),
                    y: y.to_vec(),
                })
                .collect(),
        }
    }

    fn obs_table(points: &[(f64, f64)]) -> Table {
        Table::from_columns(vec![
            Column::new("x", points.iter().map(|p| p.0).collect()),
            Column::new("y", points.iter().map(|p| p.1).collect()),
        ])
        .unwrap()
    }

    /// h1 == r1 exactly; r2 is flat zero.
    fn scenario_one() -> (SeriesTable, SeriesTable) {
        let x = [1.0, 2.0, 3.0];
        (
            series_table(&x, &[("h1", &[10.0, 20.0, 30.0])]),
            series_table(&x, &[("r1", &[10.0, 20.0, 30.0]), ("r2", &[0.0, 0.0, 0.0])]),
        )
    }

    #[test]
    fn identical_curve_has_zero_tolerance() {
        let (hist, refs) = scenario_one();
        let best = select_best_patterns(&hist, &refs).unwrap();
        let tol = ObservationClassifier::default()
            .tolerances(&hist, &refs, &best)
            .unwrap();
        assert_eq!(tol.len(), 1);
        assert_eq!(tol[0].reference_id, "r1");
        assert_eq!(tol[0].max_dev, 0.0);
    }

    #[test]
    fn identical_curves_accept_every_exact_point() {
        let x: Vec<f64> = (0..30).map(|i| f64::from(i) * 0.5 - 7.0).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v - 3.0 * v).collect();
        let hist = series_table(&x, &[("h1", &y)]);
        let refs = series_table(&x, &[("noise", &vec![1.0; x.len()]), ("same", &y)]);
        let best = select_best_patterns(&hist, &refs).unwrap();
        assert_eq!(best.get("h1"), Some("same"));

        let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).rev().collect();
        let results = classify(&obs_table(&points), &hist, &refs, &best).unwrap();
        assert_eq!(results.len(), points.len());
        for (r, (px, py)) in results.iter().zip(&points) {
            assert_eq!((r.x, r.y), (*px, *py));
            assert_eq!(r.deviation, Some(0.0));
            assert_eq!(r.assigned.as_deref(), Some("same"));
        }
    }

    #[test]
    fn exact_hit_accepted_and_near_miss_rejected() {
        let (hist, refs) = scenario_one();
        let best = select_best_patterns(&hist, &refs).unwrap();
        let results = classify(&obs_table(&[(2.0, 20.0), (2.0, 21.0)]), &hist, &refs, &best).unwrap();
        assert_eq!(results[0].deviation, Some(0.0));
        assert_eq!(results[0].assigned.as_deref(), Some("r1"));
        assert_eq!(results[1].deviation, None);
        assert_eq!(results[1].assigned, None);
    }

    #[test]
    fn empty_reference_table_leaves_everything_unassigned() {
        let (hist, _) = scenario_one();
        let refs = SeriesTable::default();
        let best = select_best_patterns(&hist, &refs).unwrap_or_else(|e| {
            assert!(matches!(e, MatchError::MissingData(_)));
            BestPatternMap::default()
        });
        assert!(best.is_empty());
        let results = classify(&obs_table(&[(1.0, 10.0), (3.0, 30.0)]), &hist, &refs, &best).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.assigned.is_none() && r.deviation.is_none()));
    }

    #[test]
    fn missing_y_column_fails_before_any_result() {
        let (hist, refs) = scenario_one();
        let best = select_best_patterns(&hist, &refs).unwrap();
        let table = Table::from_columns(vec![Column::new("x", vec![1.0, 2.0])]).unwrap();
        let err = classify(&table, &hist, &refs, &best).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)));
    }

    #[test]
    fn x_off_grid_is_unassigned() {
        let (hist, refs) = scenario_one();
        let best = select_best_patterns(&hist, &refs).unwrap();
        let results = classify(&obs_table(&[(2.5, 25.0)]), &hist, &refs, &best).unwrap();
        assert_eq!(results, vec![ClassificationResult::unassigned(Observation { x: 2.5, y: 25.0 })]);
    }

    #[test]
    fn tolerance_uses_sqrt_two_margin() {
        let x = [0.0, 1.0];
        let hist = series_table(&x, &[("h1", &[1.0, 3.0])]);
        let refs = series_table(&x, &[("r1", &[1.0, 2.0])]);
        let best = select_best_patterns(&hist, &refs).unwrap();
        let classifier = ObservationClassifier::default();
        let tol = classifier.tolerances(&hist, &refs, &best).unwrap();
        assert!((tol[0].max_dev - 2f64.sqrt()).abs() < 1e-12);

        // 1.4 <= √2 accepted, 1.5 > √2 rejected
        let results = classifier
            .classify(&obs_table(&[(0.0, 2.4), (0.0, 2.5)]), &hist, &refs, &best)
            .unwrap();
        assert_eq!(results[0].assigned.as_deref(), Some("r1"));
        assert!(results[1].assigned.is_none());
    }

    #[test]
    fn smallest_deviation_wins_and_ties_keep_first_series() {
        let x = [0.0];
        let hist = series_table(&x, &[("h1", &[0.0]), ("h2", &[10.0]), ("h3", &[20.0])]);
        let refs = series_table(&x, &[("low", &[5.0]), ("mid", &[9.0]), ("dup", &[9.0])]);
        let mut best = BestPatternMap::default();
        best.insert("h1", "low", 0.0);
        best.insert("h2", "mid", 0.0);
        best.insert("h3", "dup", 0.0);
        // tolerances: low 5√2, mid √2, dup 11√2
        let results = classify(
            &obs_table(&[(0.0, 6.0), (0.0, 9.0), (0.0, 20.0)]),
            &hist,
            &refs,
            &best,
        )
        .unwrap();
        // |6-5| = 1 < |6-9| = 3
        assert_eq!(results[0].assigned.as_deref(), Some("low"));
        assert_eq!(results[0].deviation, Some(1.0));
        // mid and dup both give 0; h2 precedes h3
        assert_eq!(results[1].assigned.as_deref(), Some("mid"));
        // only dup's tolerance reaches 11
        assert_eq!(results[2].assigned.as_deref(), Some("dup"));
        assert_eq!(results[2].deviation, Some(11.0));
    }

    #[test]
    fn historical_column_order_sets_priority_not_map_order() {
        let x = [0.0];
        let hist = series_table(&x, &[("h1", &[1.0]), ("h2", &[-1.0])]);
        let refs = series_table(&x, &[("a", &[0.0]), ("b", &[0.0])]);
        let mut best = BestPatternMap::default();
        best.insert("h2", "b", 0.0);
        best.insert("h1", "a", 0.0);
        let results = classify(&obs_table(&[(0.0, 0.5)]), &hist, &refs, &best).unwrap();
        assert_eq!(results[0].assigned.as_deref(), Some("a"));
    }

    #[test]
    fn unknown_reference_in_map_is_skipped() {
        let (hist, refs) = scenario_one();
        let mut best = BestPatternMap::default();
        best.insert("h1", "gone", 0.0);
        best.insert("h_missing", "r1", 0.0);
        let classifier = ObservationClassifier::default();
        assert!(classifier.tolerances(&hist, &refs, &best).unwrap().is_empty());
        let results = classifier
            .classify(&obs_table(&[(1.0, 10.0)]), &hist, &refs, &best)
            .unwrap();
        assert!(results[0].assigned.is_none());
    }

    #[test]
    fn larger_margin_never_accepts_fewer() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let h: Vec<f64> = x.iter().map(|v| v * 2.0 + (v * 0.7).sin()).collect();
        let r: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let hist = series_table(&x, &[("h1", &h)]);
        let refs = series_table(&x, &[("r1", &r)]);
        let best = select_best_patterns(&hist, &refs).unwrap();
        let points: Vec<(f64, f64)> = x.iter().map(|v| (*v, v * 2.0 + (v * 1.3).cos() * 1.5)).collect();
        let table = obs_table(&points);

        let mut previous = 0;
        for factor in [0.0, 0.5, 1.0, 2f64.sqrt(), 2.0, 4.0] {
            let config = MatchConfig {
                tolerance_factor: factor,
                ..MatchConfig::default()
            };
            let accepted = ObservationClassifier::new(config, &NoopObserver)
                .classify(&table, &hist, &refs, &best)
                .unwrap()
                .iter()
                .filter(|r| r.is_assigned())
                .count();
            assert!(accepted >= previous, "factor {factor}: {accepted} < {previous}");
            previous = accepted;
        }
    }

    #[test]
    fn misaligned_tables_fail() {
        let hist = series_table(&[1.0, 2.0], &[("h1", &[1.0, 1.0])]);
        let refs = series_table(&[1.0, 3.0], &[("r1", &[1.0, 1.0])]);
        let mut best = BestPatternMap::default();
        best.insert("h1", "r1", 0.0);
        assert!(matches!(
            classify(&obs_table(&[(1.0, 1.0)]), &hist, &refs, &best),
            Err(MatchError::MisalignedData(_))
        ));
    }

    #[test]
    fn custom_column_names() {
        let (hist, refs) = scenario_one();
        let best = select_best_patterns(&hist, &refs).unwrap();
        let table = Table::from_columns(vec![
            Column::new("t", vec![3.0]),
            Column::new("value", vec![30.0]),
        ])
        .unwrap();
        let config = MatchConfig {
            x_column: "t".to_string(),
            y_column: "value".to_string(),
            ..MatchConfig::default()
        };
        let results = ObservationClassifier::new(config, &NoopObserver)
            .classify(&table, &hist, &refs, &best)
            .unwrap();
        assert_eq!(results[0].assigned.as_deref(), Some("r1"));
    }
}
