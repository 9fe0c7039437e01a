use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};

use crate::config::MatchConfig;

/// Paths and overrides shared by the viewer and the headless classifier.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    #[arg(long, help = "Historical (training) table: .csv, .json or .parquet")]
    pub historical: Option<PathBuf>,

    #[arg(long, help = "Ideal function table")]
    pub references: Option<PathBuf>,

    #[arg(long, help = "Test observations with x and y columns")]
    pub observations: Option<PathBuf>,

    #[arg(long, help = "JSON file with match settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the tolerance factor (default sqrt(2))")]
    pub tolerance_factor: Option<f64>,
}

impl InputArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn match_config(&self) -> Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::from_json_file(path)?,
            None => MatchConfig::default(),
        };
        if let Some(factor) = self.tolerance_factor {
            config.tolerance_factor = factor;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Parser)]
#[command(name = "ideal-match", version, about = "Ideal function viewer")]
pub struct ViewerCli {
    #[command(flatten)]
    pub inputs: InputArgs,
}

#[derive(Debug, Parser)]
#[command(
    name = "ideal-classify",
    version,
    about = "Select ideal functions and classify test observations"
)]
pub struct ClassifyCli {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[arg(long, help = "Result table: .csv, .json or .parquet")]
    pub out: PathBuf,

    #[arg(long, help = "Write a JSON run summary")]
    pub summary: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Print the first rows of the result")]
    pub preview: bool,
}
