use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use super::model::ClassificationResult;

/// Column names of the persisted result table, in order.
pub const RESULT_COLUMNS: [&str; 4] = ["x", "y", "delta_y", "assigned_reference_id"];

/// Write classification results, format chosen by extension.
///
/// "No assignment" is an empty cell in CSV, `null` in JSON and a null slot
/// in Parquet.
pub fn write_results(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, results)?,
        "json" => write_json(path, results)?,
        "parquet" | "pq" => write_parquet(path, results)?,
        other => bail!("Unsupported output extension: .{other}"),
    }
    log::info!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// Pretty-printed JSON of any serializable value (run summaries).
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, value).context("serializing JSON")?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

fn write_csv(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv_to(file, results)
}

pub(crate) fn write_csv_to<W: Write>(out: W, results: &[ClassificationResult]) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(RESULT_COLUMNS)?;
    for r in results {
        w.write_record([
            r.x.to_string(),
            r.y.to_string(),
            r.deviation.map(|d| d.to_string()).unwrap_or_default(),
            r.assigned.clone().unwrap_or_default(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_json(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    write_json_pretty(path, &results)
}

/// Arrow record batch with the [`RESULT_COLUMNS`] schema.
pub fn results_batch(results: &[ClassificationResult]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(RESULT_COLUMNS[0], DataType::Float64, false),
        Field::new(RESULT_COLUMNS[1], DataType::Float64, false),
        Field::new(RESULT_COLUMNS[2], DataType::Float64, true),
        Field::new(RESULT_COLUMNS[3], DataType::Utf8, true),
    ]));

    let x = Float64Array::from(results.iter().map(|r| r.x).collect::<Vec<_>>());
    let y = Float64Array::from(results.iter().map(|r| r.y).collect::<Vec<_>>());
    let delta = Float64Array::from(results.iter().map(|r| r.deviation).collect::<Vec<_>>());
    let assigned = StringArray::from(
        results
            .iter()
            .map(|r| r.assigned.as_deref())
            .collect::<Vec<_>>(),
    );

    let columns: Vec<ArrayRef> = vec![
        Arc::new(x),
        Arc::new(y),
        Arc::new(delta),
        Arc::new(assigned),
    ];
    RecordBatch::try_new(schema, columns).context("building result batch")
}

fn write_parquet(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    let batch = results_batch(results)?;
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
