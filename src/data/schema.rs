use std::fmt;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::config::CATEGORY_PREFIX;

use super::model::{CategorySet, CustomerRecord, CustomerTable, EmailEngagement};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const CUSTOMER_ID: &str = "Customer_ID";
pub const DATE: &str = "Date";
pub const PURCHASE_VALUE: &str = "Purchase_Value";
pub const EMAIL_ENGAGEMENT: &str = "Email_Engagement";
pub const DISCOUNT_USED: &str = "Discount_Used";
pub const RETURN_VISIT: &str = "Return_Visit";
pub const FREQUENCY: &str = "frequency";
pub const TOTAL_SPENT: &str = "total_spent";
pub const AVG_SPENT: &str = "avg_spent";
pub const RECENCY_DAYS: &str = "recency_days";
pub const PURCHASE_MONTH: &str = "purchase_month";
pub const PURCHASE_DAY_OF_WEEK: &str = "purchase_dayofweek";

/// Columns every input table must carry, category indicators aside.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    CUSTOMER_ID,
    DATE,
    PURCHASE_VALUE,
    EMAIL_ENGAGEMENT,
    DISCOUNT_USED,
    RETURN_VISIT,
    FREQUENCY,
    TOTAL_SPENT,
    AVG_SPENT,
    RECENCY_DAYS,
    PURCHASE_MONTH,
    PURCHASE_DAY_OF_WEEK,
];

// ---------------------------------------------------------------------------
// Cell – one untyped value as read from a file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, the common currency of the CSV, JSON and
/// Parquet readers before schema validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

static NULL_CELL: Cell = Cell::Null;

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{d}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// Guess the type of a text cell (CSV).
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => Cell::Bool(true),
            "false" | "False" | "FALSE" => Cell::Bool(false),
            _ => Cell::String(s.to_string()),
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if v.is_nan() => None,
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Cell::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// 0/1 indicator, `true`/`false`, or `1.0`/`0.0`.
    fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Integer(0) => Some(false),
            Cell::Integer(1) => Some(true),
            Cell::Float(v) if *v == 0.0 => Some(false),
            Cell::Float(v) if *v == 1.0 => Some(true),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::String(s) => parse_date(s),
            _ => None,
        }
    }
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
/// Timezone-aware text, e.g. `2024-01-05 00:00:00+00:00`.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Parse the date formats pandas commonly writes.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            // The calendar date is taken in the timestamp's own offset.
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
                .or_else(|| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.date_naive())
        })
}

// ---------------------------------------------------------------------------
// RawTable – header plus untyped rows
// ---------------------------------------------------------------------------

/// What a file reader produces: column names in source order and one
/// `Vec<Cell>` per row, aligned with the header.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// TableSchema – column positions resolved once
// ---------------------------------------------------------------------------

/// Positions of the required columns and the discovered category indicators.
#[derive(Debug, Clone)]
pub struct TableSchema {
    required: [usize; REQUIRED_COLUMNS.len()],
    category_columns: Vec<usize>,
    categories: CategorySet,
}

impl TableSchema {
    /// Locate every required column and discover `Category_<Name>` columns,
    /// keeping their source order.
    pub fn resolve(columns: &[String]) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|req| !columns.iter().any(|c| c == req))
            .collect();
        if !missing.is_empty() {
            bail!("missing required column(s): {}", missing.join(", "));
        }

        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            // Presence checked above.
            *slot = columns.iter().position(|c| c == name).unwrap_or_default();
        }

        let mut category_columns = Vec::new();
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (idx, col) in columns.iter().enumerate() {
            let Some(name) = col.strip_prefix(CATEGORY_PREFIX) else {
                continue;
            };
            if name.is_empty() {
                bail!("category column '{col}' has no category name");
            }
            if pairs.iter().any(|(n, _)| n == name) {
                bail!("duplicate category column '{col}'");
            }
            category_columns.push(idx);
            pairs.push((name.to_string(), col.clone()));
        }

        Ok(Self {
            required,
            category_columns,
            categories: CategorySet::from_pairs(pairs),
        })
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    fn cell<'r>(&self, row: &'r [Cell], column: &str) -> &'r Cell {
        let slot = REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.required[i]);
        slot.and_then(|i| row.get(i)).unwrap_or(&NULL_CELL)
    }

    /// Convert one raw row into a typed record.
    pub fn to_record(&self, row: &[Cell], row_no: usize) -> Result<CustomerRecord> {
        let required = |column: &str| -> Result<Cell> {
            let cell = self.cell(row, column).clone();
            if cell.is_null() {
                bail!("row {row_no}: missing value in '{column}'");
            }
            Ok(cell)
        };
        let optional_f64 = |column: &str| -> Result<Option<f64>> {
            let cell = self.cell(row, column);
            if cell.is_null() {
                return Ok(None);
            }
            cell.as_f64()
                .map(Some)
                .with_context(|| format!("row {row_no}: '{column}' = '{cell}' is not a number"))
        };
        let optional_i64 = |column: &str| -> Result<Option<i64>> {
            let cell = self.cell(row, column);
            if cell.is_null() {
                return Ok(None);
            }
            cell.as_i64()
                .map(Some)
                .with_context(|| format!("row {row_no}: '{column}' = '{cell}' is not an integer"))
        };

        let customer_id = required(CUSTOMER_ID)?
            .as_text()
            .with_context(|| format!("row {row_no}: empty '{CUSTOMER_ID}'"))?;

        let date_cell = required(DATE)?;
        let date = date_cell
            .as_date()
            .with_context(|| format!("row {row_no}: '{DATE}' = '{date_cell}' is not a date"))?;

        let pv_cell = required(PURCHASE_VALUE)?;
        let purchase_value = pv_cell
            .as_f64()
            .with_context(|| format!("row {row_no}: '{PURCHASE_VALUE}' = '{pv_cell}' is not a number"))?;
        if purchase_value < 0.0 {
            bail!("row {row_no}: '{PURCHASE_VALUE}' is negative ({purchase_value})");
        }

        let email_engagement = required(EMAIL_ENGAGEMENT)?
            .as_text()
            .map(|s| EmailEngagement::from_label(&s))
            .with_context(|| format!("row {row_no}: empty '{EMAIL_ENGAGEMENT}'"))?;

        let rv_cell = required(RETURN_VISIT)?;
        let return_visit = rv_cell
            .as_bool()
            .with_context(|| format!("row {row_no}: '{RETURN_VISIT}' = '{rv_cell}' is not 0/1"))?;

        let discount_cell = self.cell(row, DISCOUNT_USED);
        let discount_used = if discount_cell.is_null() {
            None
        } else {
            Some(discount_cell.as_bool().with_context(|| {
                format!("row {row_no}: '{DISCOUNT_USED}' = '{discount_cell}' is not 0/1")
            })?)
        };

        let categories = self
            .category_columns
            .iter()
            .zip(self.categories.columns())
            .map(|(&idx, col)| {
                let cell = row.get(idx).unwrap_or(&NULL_CELL);
                if cell.is_null() {
                    // An empty indicator means "not in this category".
                    return Ok(false);
                }
                cell.as_bool()
                    .with_context(|| format!("row {row_no}: '{col}' = '{cell}' is not 0/1"))
            })
            .collect::<Result<Vec<bool>>>()?;

        Ok(CustomerRecord {
            customer_id,
            date,
            purchase_value,
            email_engagement,
            discount_used,
            return_visit,
            frequency: optional_f64(FREQUENCY)?,
            total_spent: optional_f64(TOTAL_SPENT)?,
            avg_spent: optional_f64(AVG_SPENT)?,
            recency_days: optional_i64(RECENCY_DAYS)?,
            purchase_month: optional_i64(PURCHASE_MONTH)?,
            purchase_day_of_week: optional_i64(PURCHASE_DAY_OF_WEEK)?,
            categories,
        })
    }
}

/// Validate a raw table against the schema and build the typed table.
pub fn build_table(raw: RawTable) -> Result<CustomerTable> {
    let schema = TableSchema::resolve(&raw.columns)?;
    let records = raw
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| schema.to_record(row, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(CustomerTable::new(records, schema.categories().clone()))
}
