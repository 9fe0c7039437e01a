//! Least-squares ideal-function selection and bounded-deviation
//! classification of test observations.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod matching;
pub mod run;

pub use crate::config::MatchConfig;
pub use crate::data::model::{
    BestPatternMap, ClassificationResult, Column, HistoricalTable, Observation, PatternFit,
    ReferenceTable, Series, SeriesTable, Table,
};
pub use crate::error::{MatchError, MatchResult};
pub use crate::matching::classifier::{ObservationClassifier, Tolerance, classify};
pub use crate::matching::observer::{LogObserver, MatchObserver, NoopObserver};
pub use crate::matching::selector::{PatternSelector, select_best_patterns};
pub use crate::run::{RunInputs, RunOutcome};
