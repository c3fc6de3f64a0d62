use std::collections::BTreeSet;

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, View};

/// Text shown for an undefined mean.
pub const UNDEFINED: &str = "N/A";

/// Two-decimal rendering of a mean, `N/A` when undefined.
pub fn fmt_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| UNDEFINED.to_string(), |m| format!("{m:.2}"))
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Filter edits are applied once per frame.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let store = state.store;
    let mut filters = state.filters.clone();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Classification ----
            let changed = value_checklist(
                ui,
                "Qualis classification",
                &store.classifications,
                &filters.classifications,
            );
            match changed {
                Some(Selection::All) => filters.select_all_classifications(store),
                Some(Selection::None) => filters.select_no_classifications(),
                Some(Selection::Toggle(v)) => filters.toggle_classification(&v),
                None => {}
            }
            ui.separator();

            // ---- Year range ----
            ui.strong("Year range");
            let (min, max) = store.year_bounds;
            let (mut lo, mut hi) = filters.year_range;
            let lo_changed = ui
                .add(egui::Slider::new(&mut lo, min..=max).text("from"))
                .changed();
            let hi_changed = ui
                .add(egui::Slider::new(&mut hi, min..=max).text("to"))
                .changed();
            // Dragging one end past the other drags both.
            if lo_changed && lo > hi {
                hi = lo;
            }
            if hi_changed && hi < lo {
                lo = hi;
            }
            filters.set_year_range(store, lo, hi);
            ui.separator();

            // ---- Evaluation area ----
            let changed = value_checklist(
                ui,
                "Evaluation area",
                &store.evaluation_areas,
                &filters.areas,
            );
            match changed {
                Some(Selection::All) => filters.select_all_areas(store),
                Some(Selection::None) => filters.select_no_areas(),
                Some(Selection::Toggle(v)) => filters.toggle_area(&v),
                None => {}
            }
            ui.separator();

            if ui
                .add_enabled(
                    !filters.is_unconstrained(store),
                    egui::Button::new("Reset filters"),
                )
                .clicked()
            {
                reset = true;
            }
        });

    if reset {
        state.reset_filters();
    } else {
        state.set_filters(filters);
    }
}

enum Selection {
    All,
    None,
    Toggle(String),
}

/// Collapsible checkbox list with All/None buttons. Returns the edit made
/// this frame, if any.
fn value_checklist(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<String>,
    selected: &BTreeSet<String>,
) -> Option<Selection> {
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());
    let mut edit = None;

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    edit = Some(Selection::All);
                }
                if ui.small_button("None").clicked() {
                    edit = Some(Selection::None);
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.as_str()).changed() {
                    edit = Some(Selection::Toggle(val.clone()));
                }
            }
        });

    edit
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, source: &str) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.selectable_value(&mut state.view, View::Charts, "Charts");
        ui.selectable_value(&mut state.view, View::Articles, "Articles");

        ui.separator();

        ui.label(format!(
            "{source}: {} articles loaded, {} visible",
            state.store.len(),
            state.visible_indices.len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Metric row
// ---------------------------------------------------------------------------

/// The four headline numbers above the charts.
pub fn metrics_row(ui: &mut Ui, state: &AppState) {
    let s = &state.summary;
    let metrics = [
        ("Total articles".to_string(), s.total_count.to_string()),
        (
            "Mean articles per year".to_string(),
            fmt_mean(s.mean_articles_per_year),
        ),
        (
            "Mean impact factor".to_string(),
            fmt_mean(s.mean_impact_factor),
        ),
        (
            format!("Articles in {}", s.reference_year),
            s.current_year_count.to_string(),
        ),
    ];

    ui.columns(metrics.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics) {
            col.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(28.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Articles table
// ---------------------------------------------------------------------------

/// Table of the articles passing the current filters.
pub fn articles_table(ui: &mut Ui, state: &AppState) {
    let articles = state.visible_articles();
    if articles.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No articles match the current filters.");
        });
        return;
    }

    let headers = [
        "ID",
        "Year",
        "Classification",
        "Evaluation area",
        "Specific area",
        "Impact factor",
        "Internationalization",
    ];

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::initial(200.0).clip(true))
        .column(Column::initial(200.0).clip(true))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            for title in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, articles.len(), |mut row| {
                let a = articles[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(a.id.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(a.year.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(a.classification.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(a.evaluation_area.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(a.specific_area.as_str());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(fmt_mean(a.impact_factor));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(a.internationalized.as_str());
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_mean_renders_as_na() {
        assert_eq!(fmt_mean(None), "N/A");
        assert_eq!(fmt_mean(Some(0.0)), "0.00");
        assert_eq!(fmt_mean(Some(2.456)), "2.46");
    }
}
