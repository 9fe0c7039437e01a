use std::cmp::Ordering;

/// Exact-match lookup from an x value to its row in a column.
///
/// Built once per x column and reused for every observation, instead of
/// scanning the column for each lookup. When an x value occurs on several
/// rows, the earliest row is returned. NaN is never indexed and never found.
#[derive(Debug, Clone, Default)]
pub struct XIndex {
    /// `(x, row)` sorted by x, then by row.
    entries: Vec<(f64, usize)>,
}

impl XIndex {
    pub fn new(xs: &[f64]) -> Self {
        let mut entries: Vec<(f64, usize)> = xs
            .iter()
            .enumerate()
            .filter(|(_, x)| !x.is_nan())
            .map(|(row, &x)| (canonical(x), row))
            .collect();
        // Stable sort keeps duplicate x values in row order.
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries }
    }

    /// Row whose x equals `x` exactly, if any.
    pub fn row_of(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        let x = canonical(x);
        let pos = self
            .entries
            .partition_point(|(probe, _)| probe.total_cmp(&x) == Ordering::Less);
        self.entries
            .get(pos)
            .filter(|(probe, _)| *probe == x)
            .map(|&(_, row)| row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fold -0.0 onto 0.0 so `total_cmp` agrees with `==`.
fn canonical(x: f64) -> f64 {
    x + 0.0
}
