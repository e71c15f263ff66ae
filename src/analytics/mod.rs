//! Return-rate analytics over a [`CustomerView`].
//!
//! Every function here is pure: it reads the view and allocates its result,
//! so calling it twice on the same view gives the same answer. Empty inputs
//! never fail; they produce `0.0` with the `no_data` flag set.

pub mod insights;
pub mod segment;

use std::collections::BTreeMap;

use crate::data::model::{CustomerView, EmailEngagement};

pub use segment::Segment;

// ---------------------------------------------------------------------------
// Rate / Average – a mean plus the number of rows behind it
// ---------------------------------------------------------------------------

/// Fraction of rows for which a flag holds, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub value: f64,
    pub hits: usize,
    pub rows: usize,
}

impl Rate {
    pub fn from_counts(hits: usize, rows: usize) -> Self {
        let value = if rows == 0 {
            0.0
        } else {
            hits as f64 / rows as f64
        };
        Self { value, hits, rows }
    }

    pub fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let (hits, rows) = flags
            .into_iter()
            .fold((0, 0), |(h, n), f| (h + usize::from(f), n + 1));
        Self::from_counts(hits, rows)
    }

    /// No rows contributed; `value` is a placeholder 0.
    pub fn no_data(&self) -> bool {
        self.rows == 0
    }

    pub fn percent(&self) -> f64 {
        self.value * 100.0
    }

    /// `value` rounded to `decimals` places.
    pub fn rounded(&self, decimals: i32) -> f64 {
        let scale = 10f64.powi(decimals);
        (self.value * scale).round() / scale
    }
}

/// Arithmetic mean of a real-valued column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Average {
    pub value: f64,
    pub rows: usize,
}

impl Average {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (sum, rows) = values
            .into_iter()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        let value = if rows == 0 { 0.0 } else { sum / rows as f64 };
        Self { value, rows }
    }

    pub fn no_data(&self) -> bool {
        self.rows == 0
    }
}

/// One bar of a grouped series.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate<K> {
    pub key: K,
    pub rate: Rate,
}

/// Return rate of one category, keyed by category name.
pub type CategoryRate = GroupRate<String>;

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Row count. Rows are customer events, so a repeated ID counts each time.
pub fn total_customers(view: &CustomerView<'_>) -> usize {
    view.len()
}

pub fn overall_return_rate(view: &CustomerView<'_>) -> Rate {
    Rate::from_flags(view.records().map(|r| r.return_visit))
}

pub fn average_purchase_value(view: &CustomerView<'_>) -> Average {
    Average::from_values(view.records().map(|r| r.purchase_value))
}

/// Share of rows whose engagement is exactly `Clicked`.
pub fn email_click_rate(view: &CustomerView<'_>) -> Rate {
    Rate::from_flags(
        view.records()
            .map(|r| r.email_engagement == EmailEngagement::Clicked),
    )
}

// ---------------------------------------------------------------------------
// Grouped rates
// ---------------------------------------------------------------------------

/// Return rate per category, in discovery order.
///
/// Indicators are not assumed to be exclusive: a row counts towards every
/// category whose indicator is set. A category without members is still
/// listed, with a no-data rate.
pub fn return_rate_by_category(view: &CustomerView<'_>) -> Vec<CategoryRate> {
    let categories = view.categories();
    let mut counts = vec![(0usize, 0usize); categories.len()];
    for rec in view.records() {
        for (slot, _) in categories.iter() {
            if rec.in_category(slot) {
                let (hits, rows) = &mut counts[slot];
                *hits += usize::from(rec.return_visit);
                *rows += 1;
            }
        }
    }

    categories
        .names()
        .iter()
        .zip(counts)
        .map(|(name, (hits, rows))| GroupRate {
            key: name.clone(),
            rate: Rate::from_counts(hits, rows),
        })
        .collect()
}

/// Return rate per engagement level, ordered by level label.
/// Group sizes add up to the size of the view.
pub fn return_rate_by_email_engagement(view: &CustomerView<'_>) -> Vec<GroupRate<EmailEngagement>> {
    grouped(view.records().map(|r| (r.email_engagement.clone(), r.return_visit)))
}

/// Return rate per spend segment, always `Low`, `Medium`, `High`.
/// Rows without a segment are left out of every bucket.
pub fn segment_and_aggregate(view: &CustomerView<'_>) -> Vec<GroupRate<Segment>> {
    let mut groups: BTreeMap<Segment, Rate> = grouped(view.records().filter_map(|r| {
        Segment::from_purchase_value(r.purchase_value).map(|s| (s, r.return_visit))
    }))
    .into_iter()
    .map(|g| (g.key, g.rate))
    .collect();

    Segment::ALL
        .iter()
        .map(|&key| GroupRate {
            key,
            rate: groups.remove(&key).unwrap_or(Rate::from_counts(0, 0)),
        })
        .collect()
}

/// Return rate with (`true`) and without (`false`) a discount. Rows with an
/// unknown discount flag are left out.
pub fn return_rate_by_discount(view: &CustomerView<'_>) -> Vec<GroupRate<bool>> {
    grouped(
        view.records()
            .filter_map(|r| r.discount_used.map(|d| (d, r.return_visit))),
    )
}

/// Highest and lowest category by return rate.
///
/// Ties resolve to the category discovered first. `None` when the table has
/// no category columns.
pub fn top_and_bottom_category(view: &CustomerView<'_>) -> Option<(CategoryRate, CategoryRate)> {
    let rates = return_rate_by_category(view);
    let mut iter = rates.iter();
    let first = iter.next()?;
    let (mut top, mut bottom) = (first, first);
    for entry in iter {
        if entry.rate.value > top.rate.value {
            top = entry;
        }
        if entry.rate.value < bottom.rate.value {
            bottom = entry;
        }
    }
    Some((top.clone(), bottom.clone()))
}

fn grouped<K: Ord, I: IntoIterator<Item = (K, bool)>>(pairs: I) -> Vec<GroupRate<K>> {
    let mut counts: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for (key, returned) in pairs {
        let (hits, rows) = counts.entry(key).or_default();
        *hits += usize::from(returned);
        *rows += 1;
    }
    counts
        .into_iter()
        .map(|(key, (hits, rows))| GroupRate {
            key,
            rate: Rate::from_counts(hits, rows),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardSummary – everything the dashboard shows, computed once
// ---------------------------------------------------------------------------

/// The aggregate values for one view, computed in a single pass of calls.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_customers: usize,
    pub overall_return_rate: Rate,
    pub average_purchase_value: Average,
    pub email_click_rate: Rate,
    pub by_category: Vec<CategoryRate>,
    pub by_email_engagement: Vec<GroupRate<EmailEngagement>>,
    pub by_segment: Vec<GroupRate<Segment>>,
    pub by_discount: Vec<GroupRate<bool>>,
    pub top_and_bottom: Option<(CategoryRate, CategoryRate)>,
}

impl DashboardSummary {
    pub fn compute(view: &CustomerView<'_>) -> Self {
        Self {
            total_customers: total_customers(view),
            overall_return_rate: overall_return_rate(view),
            average_purchase_value: average_purchase_value(view),
            email_click_rate: email_click_rate(view),
            by_category: return_rate_by_category(view),
            by_email_engagement: return_rate_by_email_engagement(view),
            by_segment: segment_and_aggregate(view),
            by_discount: return_rate_by_discount(view),
            top_and_bottom: top_and_bottom_category(view),
        }
    }

    /// No rows at all behind the KPIs.
    pub fn no_data(&self) -> bool {
        self.total_customers == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CategorySet, CustomerRecord, CustomerTable};
    use chrono::NaiveDate;

    fn record(value: f64, engagement: &str, returned: bool, cats: &[bool]) -> CustomerRecord {
        CustomerRecord {
            customer_id: format!("C{value}"),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            purchase_value: value,
            email_engagement: EmailEngagement::from_label(engagement),
            discount_used: Some(returned),
            return_visit: returned,
            frequency: Some(1.0),
            total_spent: Some(value),
            avg_spent: Some(value),
            recency_days: Some(5),
            purchase_month: Some(5),
            purchase_day_of_week: Some(2),
            categories: cats.to_vec(),
        }
    }

    fn categories(names: &[&str]) -> CategorySet {
        CategorySet::from_pairs(
            names
                .iter()
                .map(|n| (n.to_string(), format!("Category_{n}")))
                .collect(),
        )
    }

    fn sample() -> CustomerTable {
        CustomerTable::new(
            vec![
                record(40.0, "Clicked", true, &[true, false, false]),
                record(90.0, "Opened", false, &[true, true, false]),
                record(200.0, "None", true, &[false, true, false]),
                record(310.0, "Clicked", false, &[false, false, false]),
            ],
            categories(&["Hair", "Nails", "Spa"]),
        )
    }

    #[test]
    fn three_row_example_rounds_to_two_thirds() {
        let table = CustomerTable::new(
            vec![
                record(10.0, "None", true, &[]),
                record(10.0, "None", false, &[]),
                record(10.0, "None", true, &[]),
            ],
            CategorySet::default(),
        );
        let rate = overall_return_rate(&table.view());
        assert_eq!(rate.rounded(3), 0.667);
    }

    #[test]
    fn kpis_on_sample() {
        let table = sample();
        let view = table.view();
        assert_eq!(total_customers(&view), 4);
        assert_eq!(overall_return_rate(&view).value, 0.5);
        assert_eq!(average_purchase_value(&view).value, 160.0);
        assert_eq!(email_click_rate(&view).value, 0.5);
    }

    #[test]
    fn empty_view_reports_no_data() {
        let table = CustomerTable::new(Vec::new(), categories(&["Hair"]));
        let summary = DashboardSummary::compute(&table.view());
        assert!(summary.no_data());
        assert!(summary.overall_return_rate.no_data());
        assert_eq!(summary.overall_return_rate.value, 0.0);
        assert!(summary.average_purchase_value.no_data());
        assert_eq!(summary.by_category.len(), 1);
        assert!(summary.by_category[0].rate.no_data());
    }

    #[test]
    fn category_rates_count_overlapping_rows_and_keep_empty_ones() {
        let table = sample();
        let rates = return_rate_by_category(&table.view());
        let keys: Vec<&str> = rates.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["Hair", "Nails", "Spa"]);
        assert_eq!(rates[0].rate.value, 0.5);
        assert_eq!(rates[0].rate.rows, 2);
        assert_eq!(rates[1].rate.value, 0.5);
        assert_eq!(rates[1].rate.rows, 2);
        assert_eq!(rates[2].rate.value, 0.0);
        assert!(rates[2].rate.no_data());
    }

    #[test]
    fn engagement_group_sizes_add_up() {
        let table = sample();
        let groups = return_rate_by_email_engagement(&table.view());
        let labels: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(labels, ["Clicked", "None", "Opened"]);
        let total: usize = groups.iter().map(|g| g.rate.rows).sum();
        assert_eq!(total, table.len());
        assert_eq!(groups[0].rate.value, 0.5);
    }

    #[test]
    fn segments_exclude_out_of_range_rows() {
        let table = sample();
        let segs = segment_and_aggregate(&table.view());
        let keys: Vec<Segment> = segs.iter().map(|g| g.key).collect();
        assert_eq!(keys, Segment::ALL);
        let counted: usize = segs.iter().map(|g| g.rate.rows).sum();
        assert_eq!(counted, 3);
        assert_eq!(segs[0].rate.value, 1.0);
        assert_eq!(segs[1].rate.value, 0.0);
        assert_eq!(segs[2].rate.value, 1.0);
    }

    #[test]
    fn empty_segment_is_listed_with_no_data() {
        let table = CustomerTable::new(vec![record(20.0, "None", true, &[])], CategorySet::default());
        let segs = segment_and_aggregate(&table.view());
        assert_eq!(segs.len(), 3);
        assert!(!segs[0].rate.no_data());
        assert!(segs[1].rate.no_data());
        assert!(segs[2].rate.no_data());
    }

    #[test]
    fn discount_split_on_sample() {
        let table = sample();
        let split = return_rate_by_discount(&table.view());
        assert_eq!(split.len(), 2);
        assert!(!split[0].key);
        assert_eq!(split[0].rate.value, 0.0);
        assert!(split[1].key);
        assert_eq!(split[1].rate.value, 1.0);
    }

    #[test]
    fn top_and_bottom_prefer_first_on_ties() {
        let table = sample();
        let (top, bottom) = top_and_bottom_category(&table.view()).unwrap();
        // Hair and Nails tie at 0.5; Hair was discovered first.
        assert_eq!(top.key, "Hair");
        assert_eq!(bottom.key, "Spa");

        let all_equal = CustomerTable::new(
            vec![record(10.0, "None", true, &[true, true])],
            categories(&["B", "A"]),
        );
        let (top, bottom) = top_and_bottom_category(&all_equal.view()).unwrap();
        assert_eq!(top.key, "B");
        assert_eq!(bottom.key, "B");
    }

    #[test]
    fn top_and_bottom_without_categories_is_none() {
        let table = CustomerTable::new(vec![record(10.0, "None", true, &[])], CategorySet::default());
        assert!(top_and_bottom_category(&table.view()).is_none());
    }

    #[test]
    fn aggregations_are_idempotent() {
        let table = sample();
        let view = table.view();
        assert_eq!(DashboardSummary::compute(&view), DashboardSummary::compute(&view));
    }
}
