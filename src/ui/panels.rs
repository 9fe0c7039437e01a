use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use ideal_match::data::filter::{UNASSIGNED, group_of, groups};
use ideal_match::data::loader::load_table;
use ideal_match::data::writer::{write_json_pretty, write_results};

use crate::state::{AppState, TableKind};

// ---------------------------------------------------------------------------
// Left side panel – inputs, fits and filters
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Inputs");
    ui.separator();
    for kind in TableKind::ALL {
        let name = state
            .path(kind)
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "—".to_string());
        ui.horizontal(|ui: &mut Ui| {
            ui.strong(kind.label());
            ui.label(name);
        });
    }
    ui.add_space(4.0);

    let Some(outcome) = &state.outcome else {
        ui.label("Open the three tables, then press Run.");
        return;
    };

    ui.heading("Best patterns");
    ui.separator();
    let fits = outcome.summary().fits;
    ui.push_id("fits_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                for title in ["series", "ideal", "SSE", "max Δ"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for fit in &fits {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            let c = state.color_map.series_color(&fit.historical_id);
                            ui.label(RichText::new(&fit.historical_id).color(c));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&fit.reference_id);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.4}", fit.sse));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(
                                fit.max_dev
                                    .map(|d| format!("{d:.4}"))
                                    .unwrap_or_else(|| "—".to_string()),
                            );
                        });
                    });
                }
            });
    });
    ui.add_space(4.0);

    ui.heading("Assignments");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let all_groups = groups(&outcome.results);
    let counts: Vec<(String, usize)> = all_groups
        .iter()
        .map(|g| {
            let n = outcome.results.iter().filter(|r| group_of(r) == g).count();
            (g.clone(), n)
        })
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (group, n) in &counts {
                let color = if group == UNASSIGNED {
                    Color32::GRAY
                } else {
                    state.color_map.reference_color(Some(group))
                };
                let mut checked = state.filters.contains(group);
                let text = RichText::new(format!("{group}  ({n})")).color(color);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_group(group);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Bottom panel – result table
// ---------------------------------------------------------------------------

/// Render the visible classification results.
pub fn results_panel(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        return;
    };

    ui.push_id("results_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(18.0, |mut header| {
                for title in ["x", "y", "delta_y", "assigned"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, state.visible_indices.len(), |mut row| {
                    let r = &outcome.results[state.visible_indices[row.index()]];
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{}", r.x));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{}", r.y));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(
                            r.deviation
                                .map(|d| format!("{d:.4}"))
                                .unwrap_or_default(),
                        );
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(r.assigned.as_deref().unwrap_or(""));
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for kind in TableKind::ALL {
                if ui.button(format!("Open {}…", kind.label())).clicked() {
                    open_table_dialog(state, kind);
                    ui.close_menu();
                }
            }
            ui.separator();
            let has_outcome = state.outcome.is_some();
            if ui
                .add_enabled(has_outcome, egui::Button::new("Export results…"))
                .clicked()
            {
                export_results_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_outcome, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Tolerance factor");
        ui.add(
            egui::DragValue::new(&mut state.config.tolerance_factor)
                .speed(0.01)
                .range(0.0..=100.0),
        );

        if ui
            .add_enabled(state.ready(), egui::Button::new("Run"))
            .clicked()
        {
            state.run();
        }

        ui.separator();

        if let Some(outcome) = &state.outcome {
            ui.label(format!(
                "{} of {} observations assigned, {} visible",
                outcome.assigned_count(),
                outcome.results.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.show_references, "Ideal functions")
            .clicked()
        {
            state.show_references = !state.show_references;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_table(kind: TableKind) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(format!("Open {}", kind.label()))
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

pub fn open_table_dialog(state: &mut AppState, kind: TableKind) {
    let Some(path) = pick_table(kind) else {
        return;
    };
    match load_table(&path) {
        Ok(table) => state.set_table(kind, path, table),
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_results_dialog(state: &mut AppState) {
    let Some(outcome) = &state.outcome else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export results")
        .set_file_name("results.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = write_results(&path, &outcome.results) {
            log::error!("Failed to export results: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_summary_dialog(state: &mut AppState) {
    let Some(outcome) = &state.outcome else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = write_json_pretty(&path, &outcome.summary()) {
            log::error!("Failed to export summary: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
