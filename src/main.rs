mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::IdealMatchApp;
use ideal_match::cli::ViewerCli;
use ideal_match::data::loader::load_table;
use state::{AppState, TableKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = ViewerCli::parse();
    let mut state = AppState::new(cli.inputs.match_config()?);

    // Tables given on the command line are loaded up front.
    let preload = [
        (TableKind::Historical, &cli.inputs.historical),
        (TableKind::References, &cli.inputs.references),
        (TableKind::Observations, &cli.inputs.observations),
    ];
    for (kind, path) in preload {
        if let Some(path) = path {
            let table = load_table(path)
                .with_context(|| format!("loading {}", kind.label()))?;
            state.set_table(kind, path.clone(), table);
        }
    }
    if state.ready() {
        state.run();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ideal Match – Function Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(IdealMatchApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
