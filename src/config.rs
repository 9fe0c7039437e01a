use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, MatchResult};

// ---------------------------------------------------------------------------
// MatchConfig – tunables of a classification run
// ---------------------------------------------------------------------------

/// Parameters of a classification run. Every field has a default, so a JSON
/// config file only needs the keys it overrides:
///
/// ```json
/// { "tolerance_factor": 1.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Multiplier applied to the worst historical-vs-reference deviation.
    pub tolerance_factor: f64,
    /// Name of the shared independent-variable column.
    pub x_column: String,
    /// Name of the dependent-variable column in the observation table.
    pub y_column: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance_factor: std::f64::consts::SQRT_2,
            x_column: "x".to_string(),
            y_column: "y".to_string(),
        }
    }
}

impl MatchConfig {
    /// Read a config from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: MatchConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the classifier cannot work with.
    pub fn validate(&self) -> MatchResult<()> {
        if !self.tolerance_factor.is_finite() || self.tolerance_factor < 0.0 {
            return Err(MatchError::InvalidInput(format!(
                "tolerance_factor must be finite and >= 0, got {}",
                self.tolerance_factor
            )));
        }
        if self.x_column.trim().is_empty() || self.y_column.trim().is_empty() {
            return Err(MatchError::InvalidInput(
                "x_column and y_column must be non-empty".to_string(),
            ));
        }
        if self.x_column == self.y_column {
            return Err(MatchError::InvalidInput(format!(
                "x_column and y_column are both '{}'",
                self.x_column
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reproduces_sqrt_two() {
        let config = MatchConfig::default();
        assert_eq!(config.tolerance_factor, 2f64.sqrt());
        assert_eq!(config.x_column, "x");
        assert_eq!(config.y_column, "y");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{ "tolerance_factor": 2.0 }"#).unwrap();
        assert_eq!(config.tolerance_factor, 2.0);
        assert_eq!(config.x_column, "x");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<MatchConfig>(r#"{ "tolerance": 2.0 }"#).is_err());
    }

    #[test]
    fn negative_factor_is_invalid() {
        let config = MatchConfig {
            tolerance_factor: -1.0,
            ..MatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(MatchError::InvalidInput(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        std::fs::write(&path, r#"{ "tolerance_factor": 0.5, "y_column": "value" }"#).unwrap();
        let config = MatchConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tolerance_factor, 0.5);
        assert_eq!(config.y_column, "value");
    }
}
