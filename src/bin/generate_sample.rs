use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

use retention_dashboard::classifier::artifact::sigmoid;
use retention_dashboard::classifier::{Estimator, ModelArtifact, BASE_FEATURES};
use retention_dashboard::config::CATEGORY_PREFIX;
use retention_dashboard::data::schema::REQUIRED_COLUMNS;

const CATEGORIES: [&str; 4] = ["Hair", "Nails", "Makeup", "Skincare"];
const ENGAGEMENT: [(&str, f64); 3] = [("None", 0.0), ("Opened", 1.0), ("Clicked", 2.0)];
const N_CUSTOMERS: usize = 300;
const N_EVENTS: usize = 450;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One generated customer event.
struct Row {
    customer_id: String,
    date: NaiveDate,
    purchase_value: f64,
    engagement: usize,
    discount: bool,
    returned: bool,
    frequency: f64,
    total_spent: f64,
    avg_spent: f64,
    recency_days: i64,
    category: usize,
}

/// Ground-truth weights the labels are drawn from; also written out as the
/// "trained" model so predictions line up with the data.
fn true_coefficients() -> (f64, Vec<f64>) {
    let mut coefficients = vec![
        0.004,  // Purchase_Value
        0.45,   // Email_Engagement
        0.6,    // Discount_Used
        0.15,   // frequency
        0.0005, // total_spent
        0.0,    // avg_spent
        -0.01,  // recency_days
        0.0,    // purchase_month
        0.0,    // purchase_dayofweek
    ];
    coefficients.extend([0.3, -0.2, 0.1, -0.4]);
    (-0.9, coefficients)
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let (intercept, w) = true_coefficients();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut visits: BTreeMap<usize, (f64, f64)> = BTreeMap::new();

    (0..N_EVENTS)
        .map(|_| {
            let customer = rng.below(N_CUSTOMERS);
            let date = start + Duration::days(rng.below(365) as i64);
            let category = rng.below(CATEGORIES.len());
            // Spend spread over all three tiers, with a few outliers above 300.
            let purchase_value = (20.0 + rng.next_f64() * 300.0).round();
            let engagement = rng.below(ENGAGEMENT.len());
            let discount = rng.chance(0.35);

            let (count, spent) = visits.entry(customer).or_insert((0.0, 0.0));
            *count += 1.0;
            *spent += purchase_value;
            let (frequency, total_spent) = (*count, *spent);
            let avg_spent = total_spent / frequency;
            let recency_days = rng.below(120) as i64;

            let mut x = vec![
                purchase_value,
                ENGAGEMENT[engagement].1,
                if discount { 1.0 } else { 0.0 },
                frequency,
                total_spent,
                avg_spent,
                recency_days as f64,
                date.month() as f64,
                date.weekday().num_days_from_monday() as f64,
            ];
            x.extend((0..CATEGORIES.len()).map(|c| if c == category { 1.0 } else { 0.0 }));
            let z = intercept + w.iter().zip(&x).map(|(a, b)| a * b).sum::<f64>();
            let returned = rng.chance(sigmoid(z));

            Row {
                customer_id: format!("CUST{:04}", customer + 1),
                date,
                purchase_value,
                engagement,
                discount,
                returned,
                frequency,
                total_spent,
                avg_spent,
                recency_days,
                category,
            }
        })
        .collect()
}

fn column_names() -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(CATEGORIES.iter().map(|c| format!("{CATEGORY_PREFIX}{c}")))
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(column_names())?;
    for r in rows {
        let mut record = vec![
            r.customer_id.clone(),
            r.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", r.purchase_value),
            ENGAGEMENT[r.engagement].0.to_string(),
            u8::from(r.discount).to_string(),
            u8::from(r.returned).to_string(),
            r.frequency.to_string(),
            format!("{:.2}", r.total_spent),
            format!("{:.2}", r.avg_spent),
            r.recency_days.to_string(),
            r.date.month().to_string(),
            r.date.weekday().num_days_from_monday().to_string(),
        ];
        record.extend((0..CATEGORIES.len()).map(|c| u8::from(c == r.category).to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn int_col(rows: &[Row], f: impl Fn(&Row) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn float_col(rows: &[Row], f: impl Fn(&Row) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(Date32Array::from(
            rows.iter()
                .map(|r| Date32Type::from_naive_date(r.date))
                .collect::<Vec<_>>(),
        )),
        float_col(rows, |r| r.purchase_value),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| ENGAGEMENT[r.engagement].0)
                .collect::<Vec<_>>(),
        )),
        int_col(rows, |r| i64::from(r.discount)),
        int_col(rows, |r| i64::from(r.returned)),
        float_col(rows, |r| r.frequency),
        float_col(rows, |r| r.total_spent),
        float_col(rows, |r| r.avg_spent),
        int_col(rows, |r| r.recency_days),
        int_col(rows, |r| i64::from(r.date.month())),
        int_col(rows, |r| i64::from(r.date.weekday().num_days_from_monday())),
    ];
    for c in 0..CATEGORIES.len() {
        arrays.push(int_col(rows, |r| i64::from(r.category == c)));
    }

    let fields: Vec<Field> = column_names()
        .into_iter()
        .zip(&arrays)
        .map(|(name, array)| Field::new(name, array.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_model(path: &str) -> Result<()> {
    let (intercept, coefficients) = true_coefficients();
    let artifact = ModelArtifact {
        feature_names: BASE_FEATURES
            .iter()
            .map(|s| s.to_string())
            .chain(CATEGORIES.iter().map(|c| format!("{CATEGORY_PREFIX}{c}")))
            .collect(),
        engagement_encoding: ENGAGEMENT.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        estimator: Estimator::Logistic {
            intercept,
            coefficients,
        },
    };
    artifact.validate()?;
    std::fs::write(path, serde_json::to_string_pretty(&artifact)?).context("writing model")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "prepared.csv")?;
    write_parquet(&rows, "prepared.parquet")?;
    write_model("retention_model.json")?;

    let returned = rows.iter().filter(|r| r.returned).count();
    println!(
        "Wrote {} events for up to {N_CUSTOMERS} customers ({returned} returns) to prepared.csv / prepared.parquet, model to retention_model.json",
        rows.len()
    );
    Ok(())
}
