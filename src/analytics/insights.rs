//! Narrative text derived from a [`DashboardSummary`].

use super::{CategoryRate, DashboardSummary, GroupRate, Rate};
use crate::data::model::EmailEngagement;

/// `0.6667` → `"66.7%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// `123.456` → `"$123.46"`.
pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

/// Percentage, flagged when no rows stand behind it.
fn rate_text(rate: &Rate) -> String {
    if rate.no_data() {
        format!("{} (no data)", format_percent(rate.value))
    } else {
        format_percent(rate.value)
    }
}

pub fn top_category_sentence(top: &CategoryRate) -> String {
    format!(
        "The category with the highest return rate is {} at {}.",
        top.key,
        rate_text(&top.rate)
    )
}

pub fn bottom_category_sentence(bottom: &CategoryRate) -> String {
    format!(
        "The category with the lowest return rate is {} at {}.",
        bottom.key,
        rate_text(&bottom.rate)
    )
}

/// Bullet points for the insights panel. The two category sentences come
/// first; the engagement, discount and segment comparisons follow when the
/// data supports them.
pub fn key_insights(summary: &DashboardSummary) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some((top, bottom)) = &summary.top_and_bottom {
        lines.push(top_category_sentence(top));
        lines.push(bottom_category_sentence(bottom));
    }

    if let Some(line) = engagement_insight(&summary.by_email_engagement) {
        lines.push(line);
    }
    if let Some(line) = discount_insight(&summary.by_discount) {
        lines.push(line);
    }
    if let Some(line) = segment_insight(summary) {
        lines.push(line);
    }

    lines
}

fn merge(rates: impl Iterator<Item = Rate>) -> Rate {
    let (hits, rows) = rates.fold((0, 0), |(h, n), r| (h + r.hits, n + r.rows));
    Rate::from_counts(hits, rows)
}

/// "`subject` return at X versus Y for `baseline`", with the direction
/// of the difference from the subject's side.
fn compare(subject: &str, baseline: &str, subject_rate: Rate, baseline_rate: Rate) -> String {
    let verb = if subject_rate.value > baseline_rate.value {
        "higher"
    } else if subject_rate.value < baseline_rate.value {
        "lower"
    } else {
        "the same"
    };
    format!(
        "{subject} return at {} versus {} for {baseline} ({verb}).",
        format_percent(subject_rate.value),
        format_percent(baseline_rate.value)
    )
}

fn engagement_insight(groups: &[GroupRate<EmailEngagement>]) -> Option<String> {
    let engaged = merge(groups.iter().filter(|g| g.key.is_engaged()).map(|g| g.rate));
    let others = merge(groups.iter().filter(|g| !g.key.is_engaged()).map(|g| g.rate));
    if engaged.no_data() || others.no_data() {
        return None;
    }
    Some(compare(
        "Customers who open or click marketing emails",
        "everyone else",
        engaged,
        others,
    ))
}

fn discount_insight(groups: &[GroupRate<bool>]) -> Option<String> {
    let with = groups.iter().find(|g| g.key)?.rate;
    let without = groups.iter().find(|g| !g.key)?.rate;
    Some(compare(
        "Customers who used a discount",
        "full-price customers",
        with,
        without,
    ))
}

fn segment_insight(summary: &DashboardSummary) -> Option<String> {
    let populated: Vec<_> = summary
        .by_segment
        .iter()
        .filter(|g| !g.rate.no_data())
        .collect();
    let (first, last) = (populated.first()?, populated.last()?);
    if first.key == last.key {
        return None;
    }
    Some(compare(
        &format!("{} spenders", last.key),
        &format!("{} spenders", first.key),
        last.rate,
        first.rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Segment;

    fn rate(hits: usize, rows: usize) -> Rate {
        Rate::from_counts(hits, rows)
    }

    fn summary() -> DashboardSummary {
        DashboardSummary {
            total_customers: 10,
            overall_return_rate: rate(5, 10),
            average_purchase_value: crate::analytics::Average { value: 90.0, rows: 10 },
            email_click_rate: rate(3, 10),
            by_category: Vec::new(),
            by_email_engagement: vec![
                GroupRate { key: EmailEngagement::Clicked, rate: rate(3, 3) },
                GroupRate { key: EmailEngagement::None, rate: rate(1, 5) },
                GroupRate { key: EmailEngagement::Opened, rate: rate(1, 2) },
            ],
            by_segment: vec![
                GroupRate { key: Segment::Low, rate: rate(1, 4) },
                GroupRate { key: Segment::Medium, rate: rate(2, 4) },
                GroupRate { key: Segment::High, rate: rate(0, 0) },
            ],
            by_discount: vec![GroupRate { key: true, rate: rate(4, 5) }],
            top_and_bottom: Some((
                GroupRate { key: "Hair".into(), rate: rate(2, 3) },
                GroupRate { key: "Spa".into(), rate: rate(0, 2) },
            )),
        }
    }

    #[test]
    fn formats_match_dashboard_display() {
        assert_eq!(format_percent(2.0 / 3.0), "66.7%");
        assert_eq!(format_currency(123.456), "$123.46");
    }

    #[test]
    fn category_sentences_lead() {
        let lines = key_insights(&summary());
        assert_eq!(
            lines[0],
            "The category with the highest return rate is Hair at 66.7%."
        );
        assert_eq!(lines[1], "The category with the lowest return rate is Spa at 0.0%.");
    }

    #[test]
    fn engagement_is_pooled_and_segments_skip_empty_tiers() {
        let lines = key_insights(&summary());
        // Engaged 4/5 = 80% against 1/5 = 20%.
        assert!(lines.iter().any(|l| l.contains("80.0% versus 20.0%")));
        // High is empty, so Medium is compared with Low.
        assert!(lines.iter().any(|l| l.starts_with("Medium spenders")));
        // Only one side of the discount split is present.
        assert!(!lines.iter().any(|l| l.contains("discount")));
    }

    #[test]
    fn empty_bottom_category_is_flagged() {
        let mut s = summary();
        s.top_and_bottom = Some((
            GroupRate { key: "Hair".into(), rate: rate(2, 3) },
            GroupRate { key: "Brows".into(), rate: rate(0, 0) },
        ));
        let lines = key_insights(&s);
        assert_eq!(
            lines[1],
            "The category with the lowest return rate is Brows at 0.0% (no data)."
        );
        assert!(!lines[0].contains("no data"));
    }

    #[test]
    fn comparison_reads_from_the_subject_side() {
        assert_eq!(
            compare("Discount users", "full-price customers", rate(1, 4), rate(1, 2)),
            "Discount users return at 25.0% versus 50.0% for full-price customers (lower)."
        );
    }
}
