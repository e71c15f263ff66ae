use std::path::Path;

use retention_dashboard::analytics::insights::key_insights;
use retention_dashboard::analytics::{DashboardSummary, Rate};
use retention_dashboard::config::Config;
use retention_dashboard::{
    CategoryFilter, DashboardContext, DashboardError, Lookup, TrainedModel, apply_filter,
    filtered_return_rate, load_dataset, lookup_customer,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table and model. Replaced wholesale on reload.
    pub context: DashboardContext,

    /// Paths the context came from.
    pub config: Config,

    /// Aggregates over the whole table (cached until the context changes).
    pub summary: DashboardSummary,

    /// Narrative bullet points derived from `summary`.
    pub insights: Vec<String>,

    /// Current category selection.
    pub filter: CategoryFilter,

    /// Return rate of the rows passing `filter`.
    pub filtered_rate: Rate,

    /// Text typed into the customer lookup field.
    pub customer_input: String,

    /// Result of the last lookup, if one ran.
    pub lookup: Option<Result<Lookup, DashboardError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config, context: DashboardContext) -> Self {
        let summary = DashboardSummary::compute(&context.table.view());
        Self {
            insights: key_insights(&summary),
            filtered_rate: summary.overall_return_rate,
            summary,
            context,
            config,
            filter: CategoryFilter::All,
            customer_input: String::new(),
            lookup: None,
            status_message: None,
        }
    }

    /// Rebuild everything derived from the context.
    fn recompute(&mut self) {
        self.summary = DashboardSummary::compute(&self.context.table.view());
        self.insights = key_insights(&self.summary);
        if !self.context.table.categories().contains(&self.filter.to_string()) {
            self.filter = CategoryFilter::All;
        }
        self.refilter();
        if self.lookup.is_some() {
            self.run_lookup();
        }
    }

    /// Recompute `filtered_rate` for the current selection.
    fn refilter(&mut self) {
        match apply_filter(&self.context.table, &self.filter) {
            Ok(view) => self.filtered_rate = filtered_return_rate(&view),
            Err(e) => {
                log::warn!("{e}; falling back to all categories");
                self.status_message = Some(e.to_string());
                self.filter = CategoryFilter::All;
                self.filtered_rate = filtered_return_rate(&self.context.table.view());
            }
        }
    }

    /// Change the category selection.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.status_message = None;
            self.refilter();
        }
    }

    /// Score the customer currently typed in. An empty field clears the result.
    pub fn run_lookup(&mut self) {
        if self.customer_input.trim().is_empty() {
            self.lookup = None;
            return;
        }
        let result = lookup_customer(
            &self.context.table,
            &self.context.model,
            &self.customer_input,
        );
        if let Err(e) = &result {
            log::warn!("Lookup for '{}' failed: {e}", self.customer_input.trim());
        }
        self.lookup = Some(result);
    }

    /// Replace the dataset, keeping the model. On failure the previous
    /// dataset stays and the error is shown.
    pub fn reload_dataset(&mut self, path: &Path) {
        match load_dataset(path) {
            Ok(table) => {
                self.context.table = table;
                self.config.data_path = path.to_path_buf();
                self.status_message = None;
                self.recompute();
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Replace the model, keeping the dataset.
    pub fn reload_model(&mut self, path: &Path) {
        match TrainedModel::load(path) {
            Ok(model) => {
                self.context.model = model;
                self.config.model_path = path.to_path_buf();
                self.status_message = None;
                if self.lookup.is_some() {
                    self.run_lookup();
                }
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
    }
}
