use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;
const BAR_COLOR: Color32 = Color32::from_rgb(100, 149, 237);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Axis formatter that prints `labels[i]` at integer position `i` and
/// nothing elsewhere.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let v = mark.value;
        if (v - v.round()).abs() > 1e-6 || v < -0.5 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

/// Axis formatter that only labels whole years contained in `years`.
fn year_axis(years: Vec<i32>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let v = mark.value;
        if (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        let year = v.round() as i32;
        if years.contains(&year) {
            year.to_string()
        } else {
            String::new()
        }
    }
}

/// A fixed, non-interactive plot. Charts are regenerated on every filter
/// change, so panning would only get in the way.
fn static_plot<'a>(id: &str) -> Plot<'a> {
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

/// Placeholder when the filtered set leaves a chart without data.
fn empty_chart(ui: &mut Ui) {
    ui.add_sized(
        [ui.available_width(), CHART_HEIGHT / 3.0],
        egui::Label::new(RichText::new("No data for the current filters.").weak()),
    );
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.heading(title);
}

// ---------------------------------------------------------------------------
// Page layout
// ---------------------------------------------------------------------------

/// Introduction, then all nine charts.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.label(
        "Insights into scientific production: Qualis classification, impact factor and \
         internationalization of the published articles. Use the filters on the left to \
         explore the data and spot the strongest areas for a graduate program.",
    );
    ui.separator();

    ui.columns(2, |cols| {
        classification_distribution(&mut cols[0], state);
        impact_by_classification(&mut cols[1], state);
    });
    internationalization_ratio(ui, state);
    articles_by_year(ui, state);
    impact_by_year_top_areas(ui, state);
    impact_by_evaluation_area(ui, state);
    classification_vs_impact(ui, state);
    specific_area_distribution(ui, state);
    internationalization_by_classification(ui, state);
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn classification_distribution(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Articles by Qualis classification");
    let data = &state.summary.classification_distribution;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let labels: Vec<String> = data.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (class, n))| {
            Bar::new(i as f64, *n as f64)
                .name(class)
                .fill(state.palettes.classification.color_for(class))
                .width(0.7)
        })
        .collect();

    static_plot("classification_distribution")
        .x_axis_label("Classification")
        .y_axis_label("Articles")
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

fn impact_by_classification(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Mean impact factor by classification");
    let data = &state.summary.impact_by_classification;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let labels: Vec<String> = data.iter().map(|(c, _)| c.clone()).collect();
    // Classes without any known impact factor keep their slot but get no bar.
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .filter_map(|(i, (class, mean))| {
            mean.map(|m| {
                Bar::new(i as f64, m)
                    .name(class)
                    .fill(state.palettes.classification.color_for(class))
                    .width(0.7)
            })
        })
        .collect();

    static_plot("impact_by_classification")
        .x_axis_label("Classification")
        .y_axis_label("Mean impact factor")
        .x_axis_formatter(category_axis(labels))
        .include_x(-0.5)
        .include_x(data.len() as f64 - 0.5)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

fn internationalization_ratio(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Share of internationalized articles");
    let data = &state.summary.internationalization_ratio;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let slices: Vec<(String, f64, Color32)> = data
        .iter()
        .map(|(label, share)| (label.clone(), *share, state.palettes.flag.color_for(label)))
        .collect();
    pie_chart(ui, &slices);
}

fn articles_by_year(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Articles per year");
    let data = &state.summary.articles_by_year;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let years: Vec<i32> = data.iter().map(|(y, _)| *y).collect();
    let bars: Vec<Bar> = data
        .iter()
        .map(|(year, n)| {
            Bar::new(*year as f64, *n as f64)
                .name(year.to_string())
                .fill(BAR_COLOR)
                .width(0.7)
        })
        .collect();

    static_plot("articles_by_year")
        .x_axis_label("Year")
        .y_axis_label("Articles")
        .x_axis_formatter(year_axis(years))
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

fn impact_by_year_top_areas(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Impact factor per year, top specific areas");
    let trends = &state.summary.impact_by_year_top_areas;
    if trends.series.is_empty() {
        return empty_chart(ui);
    }

    static_plot("impact_by_year_top_areas")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Mean impact factor")
        .x_axis_formatter(year_axis(trends.years.clone()))
        .show(ui, |plot_ui| {
            for series in &trends.series {
                let color = state.palettes.specific_area.color_for(&series.area);
                let line: PlotPoints = series
                    .points
                    .iter()
                    .map(|&(year, mean)| [year as f64, mean])
                    .collect();
                let markers: PlotPoints = series
                    .points
                    .iter()
                    .map(|&(year, mean)| [year as f64, mean])
                    .collect();
                let name = format!("{} ({})", series.area, series.count);
                plot_ui.line(Line::new(line).name(&name).color(color).width(2.0));
                plot_ui.points(
                    Points::new(markers)
                        .name(&name)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(4.0),
                );
            }
        });
}

fn impact_by_evaluation_area(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Mean impact factor by evaluation area");
    let data = &state.summary.impact_by_evaluation_area;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let labels: Vec<String> = data.iter().map(|(a, _)| a.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .filter_map(|(i, (area, mean))| {
            mean.map(|m| {
                Bar::new(i as f64, m)
                    .name(area)
                    .fill(state.palettes.evaluation_area.color_for(area))
                    .width(0.7)
            })
        })
        .collect();

    static_plot("impact_by_evaluation_area")
        .x_axis_label("Mean impact factor")
        .y_axis_formatter(category_axis(labels))
        .include_y(-0.5)
        .include_y(data.len() as f64 - 0.5)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn classification_vs_impact(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Classification vs. impact factor");
    let points = &state.summary.classification_vs_impact;
    if points.is_empty() {
        return empty_chart(ui);
    }

    // x positions follow the classification order of the bar charts.
    let labels: Vec<String> = state
        .summary
        .classification_distribution
        .iter()
        .map(|(c, _)| c.clone())
        .collect();
    let x_of = |class: &str| labels.iter().position(|l| l == class).unwrap_or(0) as f64;

    let mut areas: Vec<&str> = points.iter().map(|p| p.evaluation_area.as_str()).collect();
    areas.sort_unstable();
    areas.dedup();

    let groups: Vec<(&str, PlotPoints)> = areas
        .iter()
        .map(|&area| {
            let series: PlotPoints = points
                .iter()
                .filter(|p| p.evaluation_area == area)
                .map(|p| [x_of(p.classification.as_str()), p.impact_factor])
                .collect();
            (area, series)
        })
        .collect();

    static_plot("classification_vs_impact")
        .legend(Legend::default())
        .x_axis_label("Classification")
        .y_axis_label("Impact factor")
        .x_axis_formatter(category_axis(labels.clone()))
        .include_x(-0.5)
        .include_x(labels.len() as f64 - 0.5)
        .show(ui, |plot_ui| {
            for (area, series) in groups {
                plot_ui.points(
                    Points::new(series)
                        .name(area)
                        .color(state.palettes.evaluation_area.color_for(area))
                        .shape(MarkerShape::Circle)
                        .radius(5.0),
                );
            }
        });
}

fn specific_area_distribution(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Articles by specific area");
    let data = &state.summary.specific_area_distribution;
    if data.is_empty() {
        return empty_chart(ui);
    }

    // Largest area on top.
    let n = data.len();
    let labels: Vec<String> = data.iter().rev().map(|(a, _)| a.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (area, count))| {
            Bar::new((n - 1 - i) as f64, *count as f64)
                .name(area)
                .fill(state.palettes.specific_area.color_for(area))
                .width(0.7)
        })
        .collect();

    static_plot("specific_area_distribution")
        .x_axis_label("Articles")
        .y_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn internationalization_by_classification(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Internationalization by Qualis classification");
    let data = &state.summary.internationalization_by_classification;
    if data.is_empty() {
        return empty_chart(ui);
    }

    let classes: Vec<String> = state
        .summary
        .classification_distribution
        .iter()
        .map(|(c, _)| c.clone())
        .collect();
    let mut flags: Vec<&str> = data.iter().map(|(_, f, _)| f.as_str()).collect();
    flags.sort_unstable();
    flags.dedup();

    let group_width = 0.8;
    let bar_width = group_width / flags.len() as f64;
    let charts: Vec<BarChart> = flags
        .iter()
        .enumerate()
        .map(|(j, &flag)| {
            let offset = -group_width / 2.0 + bar_width * (j as f64 + 0.5);
            let bars: Vec<Bar> = data
                .iter()
                .filter(|(_, f, _)| f == flag)
                .filter_map(|(class, _, n)| {
                    let i = classes.iter().position(|c| c == class)?;
                    Some(Bar::new(i as f64 + offset, *n as f64).width(bar_width * 0.95))
                })
                .collect();
            BarChart::new(bars)
                .name(flag)
                .color(state.palettes.flag.color_for(flag))
        })
        .collect();

    static_plot("internationalization_by_classification")
        .legend(Legend::default())
        .x_axis_label("Classification")
        .y_axis_label("Articles")
        .x_axis_formatter(category_axis(classes))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart (egui_plot has none, so paint it directly)
// ---------------------------------------------------------------------------

/// Largest angle of one convex wedge polygon.
const MAX_WEDGE: f32 = FRAC_PI_2;
const ARC_STEPS_PER_WEDGE: usize = 24;

fn pie_chart(ui: &mut Ui, slices: &[(String, f64, Color32)]) {
    ui.horizontal(|ui: &mut Ui| {
        let size = CHART_HEIGHT;
        let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;
        let at = |angle: f32, r: f32| center + egui::vec2(angle.cos(), angle.sin()) * r;

        // Start at twelve o'clock, go clockwise in screen space.
        let mut start = -FRAC_PI_2;
        for (_, share, color) in slices {
            let sweep = *share as f32 * TAU;
            let wedges = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            for w in 0..wedges {
                let a0 = start + sweep * w as f32 / wedges as f32;
                let a1 = start + sweep * (w + 1) as f32 / wedges as f32;
                let mut poly = vec![center];
                poly.extend(
                    (0..=ARC_STEPS_PER_WEDGE)
                        .map(|k| at(a0 + (a1 - a0) * k as f32 / ARC_STEPS_PER_WEDGE as f32, radius)),
                );
                painter.add(Shape::convex_polygon(poly, *color, Stroke::NONE));
            }

            let mid = start + sweep / 2.0;
            painter.text(
                at(mid, radius * 0.6),
                Align2::CENTER_CENTER,
                format!("{:.1}%", share * 100.0),
                FontId::proportional(14.0),
                Color32::BLACK,
            );
            start += sweep;
        }

        // White separators between slices.
        if slices.len() > 1 {
            let mut edge = -FRAC_PI_2;
            for (_, share, _) in slices {
                painter.line_segment([center, at(edge, radius)], Stroke::new(2.0, Color32::WHITE));
                edge += *share as f32 * TAU;
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, _, color) in slices {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, *color);
                    ui.label(label.as_str());
                });
            }
        });
    });
}
