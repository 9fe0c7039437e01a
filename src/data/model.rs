use serde::Serialize;

use crate::error::{MatchError, MatchResult};

// ---------------------------------------------------------------------------
// Column / Table – the raw frame handed over by the loader
// ---------------------------------------------------------------------------

/// One named column of real numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An ordered set of equal-length columns, in source-file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting ragged columns and duplicate names.
    pub fn from_columns(columns: Vec<Column>) -> MatchResult<Self> {
        if let Some(first) = columns.first() {
            let n = first.values.len();
            for col in &columns[1..] {
                if col.values.len() != n {
                    return Err(MatchError::InvalidInput(format!(
                        "column '{}' has {} rows but '{}' has {n}",
                        col.name,
                        col.values.len(),
                        first.name
                    )));
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(MatchError::InvalidInput(format!(
                    "duplicate column '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows (0 for a table without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.n_rows() == 0
    }
}

// ---------------------------------------------------------------------------
// Series / SeriesTable – historical and reference curves on a shared x grid
// ---------------------------------------------------------------------------

/// One curve of a [`SeriesTable`]; its x values live on the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: String,
    pub y: Vec<f64>,
}

/// A set of curves sharing one x column, row-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    /// Shared independent variable.
    pub x: Vec<f64>,
    /// Curves in source column order; this order drives every tie-break.
    pub series: Vec<Series>,
}

/// Training data: one series per historical column.
pub type HistoricalTable = SeriesTable;
/// Candidate ideal functions.
pub type ReferenceTable = SeriesTable;

impl SeriesTable {
    /// Split a raw table into its x column and the remaining series.
    pub fn from_table(table: &Table, x_column: &str) -> MatchResult<Self> {
        let x = table
            .column(x_column)
            .ok_or_else(|| {
                MatchError::InvalidInput(format!("table has no '{x_column}' column"))
            })?
            .values
            .clone();

        let series = table
            .columns()
            .iter()
            .filter(|c| c.name != x_column)
            .map(|c| Series {
                id: c.name.clone(),
                y: c.values.clone(),
            })
            .collect();

        Ok(Self { x, series })
    }

    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.id.as_str())
    }

    pub fn n_rows(&self) -> usize {
        self.x.len()
    }

    /// No curves, or curves without rows.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty() || self.x.is_empty()
    }

    /// Verify that `other` has the same row count and x values row-for-row.
    pub fn check_aligned(&self, other: &SeriesTable) -> MatchResult<()> {
        if self.x.len() != other.x.len() {
            return Err(MatchError::MisalignedData(format!(
                "row counts differ: {} vs {}",
                self.x.len(),
                other.x.len()
            )));
        }
        for s in self.series.iter().chain(&other.series) {
            if s.y.len() != self.x.len() {
                return Err(MatchError::MisalignedData(format!(
                    "series '{}' has {} rows, x has {}",
                    s.id,
                    s.y.len(),
                    self.x.len()
                )));
            }
        }
        if let Some(row) = self
            .x
            .iter()
            .zip(&other.x)
            .position(|(a, b)| !same_x(*a, *b))
        {
            return Err(MatchError::MisalignedData(format!(
                "x differs at row {row}: {} vs {}",
                self.x[row], other.x[row]
            )));
        }
        Ok(())
    }
}

fn same_x(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

// ---------------------------------------------------------------------------
// BestPatternMap – historical id → chosen reference id
// ---------------------------------------------------------------------------

/// The least-squares fit chosen for one historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternFit {
    pub historical_id: String,
    pub reference_id: String,
    /// Sum of squared differences between the two curves.
    pub sse: f64,
}

/// Ordered mapping from historical series to exactly one reference curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BestPatternMap {
    fits: Vec<PatternFit>,
}

impl BestPatternMap {
    /// Record the fit for `historical_id`, replacing any earlier one in place.
    pub fn insert(
        &mut self,
        historical_id: impl Into<String>,
        reference_id: impl Into<String>,
        sse: f64,
    ) {
        let fit = PatternFit {
            historical_id: historical_id.into(),
            reference_id: reference_id.into(),
            sse,
        };
        match self
            .fits
            .iter_mut()
            .find(|f| f.historical_id == fit.historical_id)
        {
            Some(existing) => *existing = fit,
            None => self.fits.push(fit),
        }
    }

    /// Reference id chosen for `historical_id`.
    pub fn get(&self, historical_id: &str) -> Option<&str> {
        self.fit(historical_id).map(|f| f.reference_id.as_str())
    }

    pub fn fit(&self, historical_id: &str) -> Option<&PatternFit> {
        self.fits.iter().find(|f| f.historical_id == historical_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternFit> {
        self.fits.iter()
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Observation / ClassificationResult
// ---------------------------------------------------------------------------

/// A test point; its x need not lie on the reference grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

/// Outcome for one observation. Both optional fields are `None` together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "delta_y")]
    pub deviation: Option<f64>,
    #[serde(rename = "assigned_reference_id")]
    pub assigned: Option<String>,
}

impl ClassificationResult {
    pub fn unassigned(obs: Observation) -> Self {
        Self {
            x: obs.x,
            y: obs.y,
            deviation: None,
            assigned: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[(&str, &[f64])]) -> Table {
        Table::from_columns(
            cols.iter()
                .map(|(n, v)| Column::new(*n, v.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Table::from_columns(vec![
            Column::new("x", vec![1.0, 2.0]),
            Column::new("y1", vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)));
    }

    #[test]
    fn series_table_keeps_column_order() {
        let t = table(&[("y2", &[0.0]), ("x", &[1.0]), ("y1", &[5.0])]);
        let st = SeriesTable::from_table(&t, "x").unwrap();
        assert_eq!(st.x, vec![1.0]);
        assert_eq!(st.ids().collect::<Vec<_>>(), vec!["y2", "y1"]);
    }

    #[test]
    fn missing_x_column() {
        let t = table(&[("y1", &[1.0])]);
        assert!(matches!(
            SeriesTable::from_table(&t, "x"),
            Err(MatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn alignment_detects_shifted_grid() {
        let a = SeriesTable::from_table(&table(&[("x", &[1.0, 2.0]), ("a", &[0.0, 0.0])]), "x").unwrap();
        let b = SeriesTable::from_table(&table(&[("x", &[1.0, 3.0]), ("b", &[0.0, 0.0])]), "x").unwrap();
        let c = SeriesTable::from_table(&table(&[("x", &[1.0]), ("c", &[0.0])]), "x").unwrap();
        assert!(a.check_aligned(&a).is_ok());
        assert!(matches!(a.check_aligned(&b), Err(MatchError::MisalignedData(_))));
        assert!(matches!(a.check_aligned(&c), Err(MatchError::MisalignedData(_))));
    }

    #[test]
    fn best_map_insert_replaces_in_place() {
        let mut map = BestPatternMap::default();
        map.insert("h1", "r1", 1.0);
        map.insert("h2", "r2", 2.0);
        map.insert("h1", "r3", 0.5);
        let ids: Vec<_> = map.iter().map(|f| (f.historical_id.as_str(), f.reference_id.as_str())).collect();
        assert_eq!(ids, vec![("h1", "r3"), ("h2", "r2")]);
        assert_eq!(map.get("h2"), Some("r2"));
        assert_eq!(map.get("h9"), None);
    }
}
