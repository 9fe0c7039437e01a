/// Data layer: core types, loading, persistence and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (named f64 columns)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SeriesTable  │  shared x column + ordered curves
///   └─────────────┘
///        │   (matching)
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  writer   │      │  filter   │  results → file / visible indices
///   └──────────┘      └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
