/// Matching core: pattern selection and observation classification.
///
/// ```text
///  HistoricalTable + ReferenceTable
///        │
///        ▼
///   ┌──────────┐
///   │ selector │  least squares → BestPatternMap
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ classifier │  max_dev gate + XIndex lookup → ClassificationResult[]
///   └────────────┘
/// ```
///
/// Everything here is pure computation over borrowed tables; progress is
/// reported through a caller-supplied [`observer::MatchObserver`].

pub mod classifier;
pub mod index;
pub mod observer;
pub mod selector;
