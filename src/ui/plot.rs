use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::format_thousands;
use crate::data::model::RecordSet;
use crate::data::series::{revenue_by, revenue_over_time};
use crate::state::{DashboardState, LabelKind};

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

fn date_to_x(d: NaiveDate) -> f64 {
    f64::from(d.num_days_from_ce())
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Revenue over time, one line per category.
pub fn revenue_line_chart(ui: &mut Ui, rows: &RecordSet, colors: Option<&ColorMap>) {
    ui.strong("Revenue over time");
    let series = revenue_over_time(rows);

    Plot::new("revenue_over_time")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Date")
        .y_axis_label("Revenue")
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|name, point| {
            let date = x_to_date(point.x)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            format!("{name}\n{date}\nRevenue: {}", format_thousands(point.y))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (category, points) in &series {
                let color = colors
                    .map(|cm| cm.color_for(category))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let xy: Vec<[f64; 2]> = points.iter().map(|&(d, r)| [date_to_x(d), r]).collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(xy.clone()))
                        .name(category)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(xy))
                        .name(category)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Horizontal bars of revenue per label of `kind`, largest on top.
///
/// Returns the label of a clicked bar.
pub fn revenue_bar_chart(
    ui: &mut Ui,
    rows: &RecordSet,
    kind: LabelKind,
    title: &str,
    colors: Option<&ColorMap>,
) -> Option<String> {
    ui.strong(title);
    let totals = revenue_by(rows, kind.column());
    let n = totals.len();
    // Bar i sits at y = n - 1 - i so the largest is drawn on top.
    let labels: Vec<String> = totals.iter().rev().map(|(l, _)| l.clone()).collect();

    let bars: Vec<Bar> = totals
        .iter()
        .enumerate()
        .map(|(i, (label, revenue))| {
            let color = colors
                .map(|cm| cm.color_for(label))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new((n - 1 - i) as f64, *revenue)
                .name(format!("{label}: {}", format_thousands(*revenue)))
                .fill(color)
                .width(0.7)
        })
        .collect();

    let axis_labels = labels.clone();
    let response = Plot::new(("revenue_by", kind.column()))
        .height(240.0)
        .x_axis_label("Revenue")
        .y_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if (v - v.round()).abs() > f64::EPSILON || v < 0.0 {
                return String::new();
            }
            axis_labels.get(v as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let pointer = response.inner?;
    let slot = pointer.y.round();
    if slot < 0.0 || pointer.x < 0.0 {
        return None;
    }
    labels.get(slot as usize).cloned()
}

/// The line chart above the two bar charts. Clicking a bar toggles the
/// chart focus.
pub fn charts(ui: &mut Ui, state: &mut DashboardState) {
    let rows = state.chart_rows();
    if let Some(focus) = focus_summary(state) {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!("Focused on {focus}"));
            if ui.small_button("Clear").clicked() {
                state.focus.clear();
            }
        });
    }

    revenue_line_chart(ui, &rows, state.category_colors.as_ref());
    ui.add_space(8.0);

    let mut clicked = None;
    ui.columns(2, |cols| {
        if let Some(label) = revenue_bar_chart(
            &mut cols[0],
            &rows,
            LabelKind::Category,
            "Revenue by category",
            state.category_colors.as_ref(),
        ) {
            clicked = Some((LabelKind::Category, label));
        }
        if let Some(label) = revenue_bar_chart(
            &mut cols[1],
            &rows,
            LabelKind::Region,
            "Revenue by region",
            state.region_colors.as_ref(),
        ) {
            clicked = Some((LabelKind::Region, label));
        }
    });
    if let Some((kind, label)) = clicked {
        log::debug!("chart focus toggled on {} = {label}", kind.column());
        state.focus.toggle(kind.column(), &label);
    }
}

fn focus_summary(state: &DashboardState) -> Option<String> {
    let parts: Vec<&str> = [state.focus.category.as_deref(), state.focus.region.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    (!parts.is_empty()).then(|| parts.join(" / "))
}
