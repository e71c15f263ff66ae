use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use retention_dashboard::analytics::{CategoryRate, GroupRate, Rate, Segment};
use retention_dashboard::EmailEngagement;

use crate::color::{generate_palette, rate_color, segment_color};

const CHART_HEIGHT: f32 = 240.0;

/// One labelled bar.
struct BarSpec {
    label: String,
    rate: Rate,
    color: Color32,
}

// ---------------------------------------------------------------------------
// Return-rate bar charts
// ---------------------------------------------------------------------------

/// Render bars as return-rate percentages. Each bar is its own chart so the
/// legend doubles as the x-axis labelling.
fn rate_bars(ui: &mut Ui, id: &str, title: &str, bars: Vec<BarSpec>) {
    ui.strong(title);
    if bars.is_empty() {
        ui.label("No data to chart.");
        return;
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Return rate (%)")
        .include_y(0.0)
        .include_y(100.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, spec) in bars.into_iter().enumerate() {
                let name = if spec.rate.no_data() {
                    format!("{} (no data)", spec.label)
                } else {
                    format!("{} ({:.1}%)", spec.label, spec.rate.percent())
                };
                let bar = Bar::new(i as f64, spec.rate.percent())
                    .width(0.7)
                    .name(&name);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&name).color(spec.color));
            }
        });
}

/// Return rate by category, one colour per category.
pub fn category_chart(ui: &mut Ui, rates: &[CategoryRate]) {
    let colors = generate_palette(rates.len());
    let bars = rates
        .iter()
        .zip(colors)
        .map(|(g, color)| BarSpec {
            label: g.key.clone(),
            rate: g.rate,
            color,
        })
        .collect();
    rate_bars(ui, "category_chart", "Return Rate by Category", bars);
}

/// Return rate by email engagement level, coloured by the rate itself.
pub fn engagement_chart(ui: &mut Ui, groups: &[GroupRate<EmailEngagement>]) {
    let bars = groups
        .iter()
        .map(|g| BarSpec {
            label: g.key.to_string(),
            rate: g.rate,
            color: rate_color(g.rate.value),
        })
        .collect();
    rate_bars(
        ui,
        "engagement_chart",
        "Impact of Email Engagement on Return Visits",
        bars,
    );
}

/// Return rate by spend segment.
pub fn segment_chart(ui: &mut Ui, groups: &[GroupRate<Segment>]) {
    let bars = groups
        .iter()
        .map(|g| BarSpec {
            label: g.key.to_string(),
            rate: g.rate,
            color: segment_color(g.key),
        })
        .collect();
    rate_bars(ui, "segment_chart", "Return Rate by Spending Segment", bars);
}
