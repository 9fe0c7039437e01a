use anyhow::{Context, Result, bail};
use clap::Parser;

use ideal_match::cli::ClassifyCli;
use ideal_match::data::writer::{results_batch, write_json_pretty, write_results};
use ideal_match::matching::observer::LogObserver;
use ideal_match::run::{RunInputs, execute};

const PREVIEW_ROWS: usize = 10;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = ClassifyCli::parse();
    let config = cli.inputs.match_config()?;

    let (Some(historical), Some(references), Some(observations)) = (
        &cli.inputs.historical,
        &cli.inputs.references,
        &cli.inputs.observations,
    ) else {
        bail!("--historical, --references and --observations are all required");
    };

    let inputs = RunInputs::load(historical, references, observations)?;
    let outcome = execute(&inputs, &config, &LogObserver).context("classification run failed")?;

    write_results(&cli.out, &outcome.results)?;
    if let Some(path) = &cli.summary {
        write_json_pretty(path, &outcome.summary())?;
        log::info!("Wrote run summary to {}", path.display());
    }

    if cli.preview {
        let head = &outcome.results[..outcome.results.len().min(PREVIEW_ROWS)];
        let batch = results_batch(head)?;
        println!("{}", arrow::util::pretty::pretty_format_batches(&[batch])?);
    }

    Ok(())
}
