use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot, Points};

use ideal_match::data::filter::{UNASSIGNED, group_of};
use ideal_match::data::model::SeriesTable;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Match plot (central panel)
// ---------------------------------------------------------------------------

fn curve(table: &SeriesTable, y: &[f64]) -> Vec<[f64; 2]> {
    table
        .x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| [xi, yi])
        .collect()
}

/// Historical series (solid), their ideal functions (dashed) and the
/// observations coloured by assignment.
pub fn match_plot(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open the three tables and press Run  (File → Open…)");
        });
        return;
    };

    let colors = &state.color_map;

    // Visible observations grouped by assignment, so each group gets one legend entry.
    let mut groups: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for &idx in &state.visible_indices {
        let r = &outcome.results[idx];
        groups.entry(group_of(r)).or_default().push([r.x, r.y]);
    }

    Plot::new("match_plot")
        .legend(Legend::default())
        .x_axis_label("x")
        .y_axis_label("y")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &outcome.historical.series {
                let color = colors.series_color(&series.id);
                plot_ui.line(
                    Line::new(curve(&outcome.historical, &series.y))
                        .name(format!("historical {}", series.id))
                        .color(color)
                        .width(1.5),
                );

                if !state.show_references {
                    continue;
                }
                let Some(reference) = outcome
                    .best
                    .get(&series.id)
                    .and_then(|id| outcome.references.get(id))
                else {
                    continue;
                };
                plot_ui.line(
                    Line::new(curve(&outcome.references, &reference.y))
                        .name(format!("ideal {} ({})", reference.id, series.id))
                        .color(color)
                        .style(LineStyle::dashed_loose())
                        .width(1.0),
                );
            }

            for (group, points) in groups {
                let assigned = (group != UNASSIGNED).then_some(group);
                plot_ui.points(
                    Points::new(points)
                        .name(format!("test → {group}"))
                        .color(colors.reference_color(assigned))
                        .radius(3.0),
                );
            }
        });
}
