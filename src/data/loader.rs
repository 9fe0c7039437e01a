use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a numeric table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one numeric column per field (`x,y1,y2,…`)
/// * `.json`    – `{ "x": [...], "y1": [...] }` or `[{ "x": 1, "y1": 2 }, ...]`
/// * `.parquet` – flat Float64 / Float32 / Int64 / Int32 columns
///
/// Column names are trimmed and lower-cased.
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!(
        "Loaded {} ({} rows, columns {:?})",
        path.display(),
        table.n_rows(),
        table.column_names()
    );
    Ok(table)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn build_table(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Table> {
    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::from_columns(columns)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one row per x value.
fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

pub(crate) fn read_csv<R: std::io::Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(normalize_name)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cell) in record.iter().enumerate() {
            let value = cell.parse::<f64>().with_context(|| {
                format!(
                    "CSV row {row_no}, column '{}': '{cell}' is not a number",
                    headers[col_idx]
                )
            })?;
            columns[col_idx].push(value);
        }
    }

    build_table(headers, columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepts the two layouts pandas writes by default:
///
/// ```json
/// { "x": [1.0, 2.0], "y1": [0.5, 0.7] }
/// ```
///
/// ```json
/// [ { "x": 1.0, "y1": 0.5 }, { "x": 2.0, "y1": 0.7 } ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub(crate) fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    match root {
        JsonValue::Object(obj) => {
            let mut names = Vec::with_capacity(obj.len());
            let mut columns = Vec::with_capacity(obj.len());
            for (key, val) in &obj {
                let arr = val
                    .as_array()
                    .with_context(|| format!("Column '{key}' is not an array"))?;
                let values = arr
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.as_f64()
                            .with_context(|| format!("{key}[{i}]: not a number"))
                    })
                    .collect::<Result<Vec<f64>>>()?;
                names.push(normalize_name(key));
                columns.push(values);
            }
            build_table(names, columns)
        }
        JsonValue::Array(records) => {
            let mut names: Vec<String> = Vec::new();
            let mut keys: Vec<String> = Vec::new();
            let mut columns: Vec<Vec<f64>> = Vec::new();
            for (i, rec) in records.iter().enumerate() {
                let obj = rec
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                if i == 0 {
                    keys = obj.keys().cloned().collect();
                    names = keys.iter().map(|k| normalize_name(k)).collect();
                    columns = vec![Vec::with_capacity(records.len()); keys.len()];
                } else if obj.len() != keys.len() {
                    bail!("Row {i} has {} fields, expected {}", obj.len(), keys.len());
                }
                for (col, key) in keys.iter().enumerate() {
                    let value = obj
                        .get(key)
                        .and_then(JsonValue::as_f64)
                        .with_context(|| format!("Row {i}: missing or non-numeric '{key}'"))?;
                    columns[col].push(value);
                }
            }
            build_table(names, columns)
        }
        _ => bail!("Expected a JSON object of columns or an array of records"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns are all flat numbers.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_name(f.name()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            extend_f64(values, batch.column(col_idx))
                .with_context(|| format!("column '{}'", names[col_idx]))?;
        }
    }

    build_table(names, columns)
}

// -- Arrow helpers --

/// Append a numeric Arrow column to `out`, nulls becoming NaN.
fn extend_f64(out: &mut Vec<f64>, col: &Arc<dyn Array>) -> Result<()> {
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => {
            let arr = any
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        DataType::Float32 => {
            let arr = any
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        }
        DataType::Int64 => {
            let arr = any
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)));
        }
        DataType::Int32 => {
            let arr = any
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    }
    Ok(())
}
