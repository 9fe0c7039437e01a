use std::collections::BTreeSet;

use super::model::ClassificationResult;

// ---------------------------------------------------------------------------
// Filter predicate: which assignment groups are shown
// ---------------------------------------------------------------------------

/// Label used for observations without an assigned reference curve.
pub const UNASSIGNED: &str = "<none>";

/// Selected assignment groups (reference ids and/or [`UNASSIGNED`]).
pub type FilterState = BTreeSet<String>;

/// Group label of a single result.
pub fn group_of(result: &ClassificationResult) -> &str {
    result.assigned.as_deref().unwrap_or(UNASSIGNED)
}

/// Every group that occurs in `results`, sorted.
pub fn groups(results: &[ClassificationResult]) -> BTreeSet<String> {
    results.iter().map(|r| group_of(r).to_string()).collect()
}

/// Initialise a [`FilterState`] with all groups selected (i.e., show everything).
pub fn init_filter_state(results: &[ClassificationResult]) -> FilterState {
    groups(results)
}

/// Return indices of results whose group is selected.
pub fn filtered_indices(results: &[ClassificationResult], filters: &FilterState) -> Vec<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.contains(group_of(r)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(assigned: Option<&str>) -> ClassificationResult {
        ClassificationResult {
            x: 0.0,
            y: 0.0,
            deviation: assigned.map(|_| 0.0),
            assigned: assigned.map(str::to_string),
        }
    }

    #[test]
    fn all_groups_selected_initially() {
        let results = vec![result(Some("y3")), result(None), result(Some("y1"))];
        let filters = init_filter_state(&results);
        assert_eq!(
            filters.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["<none>", "y1", "y3"]
        );
        assert_eq!(filtered_indices(&results, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn deselecting_unassigned_hides_it() {
        let results = vec![result(Some("y3")), result(None), result(Some("y3"))];
        let mut filters = init_filter_state(&results);
        filters.remove(UNASSIGNED);
        assert_eq!(filtered_indices(&results, &filters), vec![0, 2]);
        filters.clear();
        assert!(filtered_indices(&results, &filters).is_empty());
    }
}
