use std::fmt;

use crate::analytics::Rate;
use crate::config::ALL_CATEGORIES;
use crate::error::{DashboardError, Result};

use super::model::{CustomerTable, CustomerView};

// ---------------------------------------------------------------------------
// Filter predicate: which category the user selected
// ---------------------------------------------------------------------------

/// The category selector's value. `All` is the sentinel meaning "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Interpret the selector text; `None` and `"All"` both mean no filter.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None => CategoryFilter::All,
            Some(s) if s == ALL_CATEGORIES => CategoryFilter::All,
            Some(s) => CategoryFilter::Category(s.to_string()),
        }
    }

    /// Selector entries for a table: `"All"` followed by every category in
    /// discovery order.
    pub fn options(table: &CustomerTable) -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(
                table
                    .categories()
                    .names()
                    .iter()
                    .map(|n| CategoryFilter::Category(n.clone())),
            )
            .collect()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Category(name) => f.write_str(name),
        }
    }
}

/// Narrow the table to the selected category.
///
/// * `All` → every row, unmodified
/// * a known category → rows whose indicator for it is set
/// * anything else → [`DashboardError::UnknownCategory`]
pub fn apply_filter<'a>(
    table: &'a CustomerTable,
    filter: &CategoryFilter,
) -> Result<CustomerView<'a>> {
    let name = match filter {
        CategoryFilter::All => return Ok(table.view()),
        CategoryFilter::Category(name) => name,
    };

    let position = table
        .categories()
        .position(name)
        .ok_or_else(|| DashboardError::UnknownCategory(name.clone()))?;

    let indices = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| rec.in_category(position))
        .map(|(i, _)| i)
        .collect();

    Ok(CustomerView::from_indices(table, indices))
}

/// Mean `Return_Visit` over a view; zero rows gives 0 flagged as no data.
pub fn filtered_return_rate(view: &CustomerView<'_>) -> Rate {
    Rate::from_flags(view.records().map(|r| r.return_visit))
}
