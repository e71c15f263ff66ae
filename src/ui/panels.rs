use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use retention_dashboard::analytics::insights::{format_currency, format_percent};
use retention_dashboard::{CategoryFilter, Lookup};

use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…  Ctrl+O").clicked() {
                open_dataset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open model…  Ctrl+M").clicked() {
                open_model_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        let table = &state.context.table;
        let mut text = format!(
            "{} rows · {} categories · {} model",
            table.len(),
            table.categories().len(),
            state.context.model.artifact().estimator.kind()
        );
        if let Some((first, last)) = table.date_range() {
            text.push_str(&format!(" · {first} to {last}"));
        }
        ui.label(text);

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter and customer lookup
// ---------------------------------------------------------------------------

/// Render the left panel: category filter, breakdown tables, lookup tool.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filter");
            ui.separator();
            category_filter(ui, state);

            ui.add_space(12.0);
            ui.heading("Breakdown");
            ui.separator();
            breakdown_tables(ui, state);

            ui.add_space(12.0);
            ui.heading("Predict Return Probability");
            ui.separator();
            customer_lookup(ui, state);
        });
}

fn category_filter(ui: &mut Ui, state: &mut AppState) {
    let options = CategoryFilter::options(&state.context.table);
    let mut chosen = None;

    ui.strong("Filter by Category:");
    egui::ComboBox::from_id_salt("category_filter")
        .selected_text(state.filter.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for option in &options {
                if ui
                    .selectable_label(state.filter == *option, option.to_string())
                    .clicked()
                {
                    chosen = Some(option.clone());
                }
            }
        });

    if let Some(filter) = chosen {
        state.set_filter(filter);
    }

    let rate = &state.filtered_rate;
    let text = if rate.no_data() {
        "Return Rate: no data".to_string()
    } else {
        format!("Return Rate: {} ({} rows)", format_percent(rate.value), rate.rows)
    };
    ui.label(RichText::new(text).strong());
}

fn breakdown_tables(ui: &mut Ui, state: &AppState) {
    let engagement: Vec<(String, String, usize)> = state
        .summary
        .by_email_engagement
        .iter()
        .map(|g| (g.key.to_string(), format_percent(g.rate.value), g.rate.rows))
        .collect();
    let discount: Vec<(String, String, usize)> = state
        .summary
        .by_discount
        .iter()
        .map(|g| {
            let label = if g.key { "Discount" } else { "No discount" };
            (label.to_string(), format_percent(g.rate.value), g.rate.rows)
        })
        .collect();

    ui.push_id("engagement_table", |ui: &mut Ui| {
        rate_table(ui, "Email engagement", &engagement);
    });
    ui.add_space(6.0);
    ui.push_id("discount_table", |ui: &mut Ui| {
        rate_table(ui, "Discount", &discount);
    });
}

fn rate_table(ui: &mut Ui, heading: &str, rows: &[(String, String, usize)]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong(heading);
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Return rate");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Rows");
            });
        })
        .body(|mut body| {
            for (label, rate, count) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(label);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(rate);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(count.to_string());
                    });
                });
            }
        });
}

fn customer_lookup(ui: &mut Ui, state: &mut AppState) {
    ui.label("Enter Customer ID:");
    let response = ui.text_edit_singleline(&mut state.customer_input);
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    if ui.button("Predict").clicked() || submitted {
        state.run_lookup();
    }

    match &state.lookup {
        None => {}
        Some(Ok(Lookup::Found { probability, .. })) => {
            ui.label(
                RichText::new(format!("Return Probability: {}", format_percent(*probability)))
                    .strong()
                    .color(Color32::from_rgb(40, 160, 80)),
            );
            ui.label("Use this prediction to plan targeted retention campaigns.");
        }
        Some(Ok(Lookup::NotFound)) => {
            ui.label("No such customer.");
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – KPIs, insights, charts
// ---------------------------------------------------------------------------

/// Render the KPI row, key insights and the three charts.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Client Retention Dashboard");
            ui.label("Monitor return behavior, rebooking patterns & marketing effectiveness.");
            ui.separator();

            let no_data = |flag: bool, text: String| {
                if flag {
                    "no data".to_string()
                } else {
                    text
                }
            };
            let kpis = [
                ("Total Customers", summary.total_customers.to_string()),
                (
                    "Overall Return Rate",
                    no_data(
                        summary.overall_return_rate.no_data(),
                        format_percent(summary.overall_return_rate.value),
                    ),
                ),
                (
                    "Avg Purchase Value",
                    no_data(
                        summary.average_purchase_value.no_data(),
                        format_currency(summary.average_purchase_value.value),
                    ),
                ),
                (
                    "Email Click Rate",
                    no_data(
                        summary.email_click_rate.no_data(),
                        format_percent(summary.email_click_rate.value),
                    ),
                ),
            ];
            ui.columns(kpis.len(), |columns| {
                for (col, (title, value)) in columns.iter_mut().zip(kpis.iter()) {
                    col.group(|ui: &mut Ui| {
                        ui.label(*title);
                        ui.heading(value.as_str());
                    });
                }
            });
            ui.separator();

            ui.heading("Key Insights");
            if state.insights.is_empty() {
                ui.label("Not enough data for insights.");
            }
            for line in &state.insights {
                ui.label(format!("• {line}"));
            }
            ui.separator();

            ui.heading("Insights & Trends");
            ui.columns(2, |columns| {
                plot::category_chart(&mut columns[0], &summary.by_category);
                plot::engagement_chart(&mut columns[1], &summary.by_email_engagement);
            });
            ui.add_space(8.0);

            ui.heading("Customer Spending Segments");
            plot::segment_chart(ui, &summary.by_segment);
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dataset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.reload_dataset(&path);
    }
}

pub fn open_model_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open retention model")
        .add_filter("Model JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.reload_model(&path);
    }
}
