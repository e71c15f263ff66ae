use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// EmailEngagement – categorical marketing-email interaction
// ---------------------------------------------------------------------------

/// How a customer reacted to the last marketing email.
///
/// Ordered by label text so grouped output is alphabetical
/// (`Clicked`, `None`, `Opened`, then anything else by name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmailEngagement {
    Clicked,
    Opened,
    None,
    /// Any other level present in the source data.
    Other(String),
}

impl EmailEngagement {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Clicked" => EmailEngagement::Clicked,
            "Opened" => EmailEngagement::Opened,
            "None" => EmailEngagement::None,
            other => EmailEngagement::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EmailEngagement::Clicked => "Clicked",
            EmailEngagement::Opened => "Opened",
            EmailEngagement::None => "None",
            EmailEngagement::Other(s) => s,
        }
    }

    /// Opened or clicked, i.e. the customer saw the email.
    pub fn is_engaged(&self) -> bool {
        matches!(self, EmailEngagement::Clicked | EmailEngagement::Opened)
    }
}

impl PartialOrd for EmailEngagement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EmailEngagement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for EmailEngagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the prepared table
// ---------------------------------------------------------------------------

/// A single customer event.
///
/// Columns the aggregations depend on are required at load time. The
/// remaining model features may be empty in the source and are kept as
/// `None`; they only matter when the row is scored.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub date: NaiveDate,
    pub purchase_value: f64,
    pub email_engagement: EmailEngagement,
    pub discount_used: Option<bool>,
    /// The label.
    pub return_visit: bool,
    pub frequency: Option<f64>,
    pub total_spent: Option<f64>,
    pub avg_spent: Option<f64>,
    pub recency_days: Option<i64>,
    pub purchase_month: Option<i64>,
    pub purchase_day_of_week: Option<i64>,
    /// Category indicators, positionally aligned with [`CategorySet`].
    pub categories: Vec<bool>,
}

impl CustomerRecord {
    /// Whether the indicator at `category` (a [`CategorySet`] position) is set.
    pub fn in_category(&self, category: usize) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// CategorySet – category names discovered from the column headers
// ---------------------------------------------------------------------------

/// Ordered category names, in the order their indicator columns appear in
/// the source table. Resolved once when the table is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
    columns: Vec<String>,
}

impl CategorySet {
    /// Build from `(name, source column)` pairs. The caller guarantees names
    /// are unique.
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let (names, columns) = pairs.into_iter().unzip();
        Self { names, columns }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Source column names (`Category_<Name>`), same order as [`names`](Self::names).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.names.iter().map(String::as_str).enumerate()
    }
}

// ---------------------------------------------------------------------------
// CustomerTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded dataset. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerTable {
    records: Vec<CustomerRecord>,
    categories: CategorySet,
}

impl CustomerTable {
    /// Every record must carry exactly one indicator per category.
    pub fn new(records: Vec<CustomerRecord>, categories: CategorySet) -> Self {
        debug_assert!(records.iter().all(|r| r.categories.len() == categories.len()));
        Self {
            records,
            categories,
        }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A view over every row, in load order.
    pub fn view(&self) -> CustomerView<'_> {
        CustomerView {
            table: self,
            indices: (0..self.records.len()).collect(),
        }
    }

    /// Earliest and latest `Date` in the table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }
}

// ---------------------------------------------------------------------------
// CustomerView – a subset of rows, by index
// ---------------------------------------------------------------------------

/// A borrowed selection of rows from a [`CustomerTable`], in load order.
#[derive(Debug, Clone)]
pub struct CustomerView<'a> {
    table: &'a CustomerTable,
    indices: Vec<usize>,
}

impl<'a> CustomerView<'a> {
    pub(crate) fn from_indices(table: &'a CustomerTable, indices: Vec<usize>) -> Self {
        Self { table, indices }
    }

    pub fn categories(&self) -> &'a CategorySet {
        &self.table.categories
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a CustomerRecord> + '_ {
        let records = &self.table.records;
        self.indices.iter().map(move |&i| &records[i])
    }
}
