//! Integration tests for the retention dashboard core

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, DictionaryArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Date32Type, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use tempfile::{Builder, NamedTempFile};

use retention_dashboard::analytics::{
    self, DashboardSummary, Segment, insights::key_insights,
};
use retention_dashboard::classifier::{FeatureVector, ReturnClassifier};
use retention_dashboard::cli::Args;
use retention_dashboard::config::Config;
use retention_dashboard::{
    CategoryFilter, DashboardContext, DashboardError, Lookup, apply_filter, filtered_return_rate,
    load_dataset, lookup_customer,
};

const HEADER: &str = "Customer_ID,Date,Purchase_Value,Email_Engagement,Discount_Used,Return_Visit,frequency,total_spent,avg_spent,recency_days,purchase_month,purchase_dayofweek,Category_Hair,Category_Nails,Category_Makeup";

/// Create a test CSV file with sample data
fn create_test_csv() -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{HEADER}").unwrap();

    // Customer C001 - two visits, hair
    writeln!(file, "C001,2024-01-05,45.00,Clicked,1,1,1,45.00,45.00,30,1,4,1,0,0").unwrap();
    writeln!(file, "C001,2024-02-10,95.50,Opened,0,1,2,140.50,70.25,5,2,5,1,0,0").unwrap();

    // Customer C002 - nails, never came back
    writeln!(file, "C002,2024-01-20,150.00,None,0,0,1,150.00,150.00,60,1,5,0,1,0").unwrap();

    // Customer C003 - big spender across hair and nails
    writeln!(file, "C003,2024-03-01 10:15:00,299.00,Clicked,1,1,4,900.00,225.00,2,3,4,1,1,0").unwrap();

    // Customer C004 - above the top segment bound
    writeln!(file, "C004,2024-03-15,300.00,None,0,0,1,300.00,300.00,90,3,4,0,1,0").unwrap();

    // Customer C005 - missing frequency
    writeln!(file, "C005,2024-04-02,80.00,Opened,1,0,,80.00,80.00,12,4,1,1,0,0").unwrap();

    file
}

/// Logistic model matching the CSV's feature schema.
fn create_test_model(intercept: f64) -> NamedTempFile {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    let names = [
        "Purchase_Value",
        "Email_Engagement",
        "Discount_Used",
        "frequency",
        "total_spent",
        "avg_spent",
        "recency_days",
        "purchase_month",
        "purchase_dayofweek",
        "Category_Hair",
        "Category_Nails",
        "Category_Makeup",
    ];
    let json = serde_json::json!({
        "feature_names": names,
        "engagement_encoding": {"None": 0.0, "Opened": 1.0, "Clicked": 2.0},
        "estimator": {
            "type": "logistic",
            "intercept": intercept,
            "coefficients": [0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        }
    });
    write!(file, "{json}").unwrap();
    file
}

fn load_context(data: &Path, model: &Path) -> DashboardContext {
    let config = Config {
        data_path: data.to_path_buf(),
        model_path: model.to_path_buf(),
    };
    DashboardContext::load(&config).unwrap()
}

#[test]
fn test_end_to_end_summary() {
    let data = create_test_csv();
    let model = create_test_model(0.0);
    let ctx = load_context(data.path(), model.path());

    assert_eq!(ctx.table.len(), 6);
    assert_eq!(ctx.table.categories().names(), ["Hair", "Nails", "Makeup"]);
    assert_eq!(
        ctx.table.date_range(),
        Some((
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
        ))
    );

    let summary = DashboardSummary::compute(&ctx.table.view());
    assert_eq!(summary.total_customers, 6);
    assert_eq!(summary.overall_return_rate.value, 0.5);
    assert!((summary.average_purchase_value.value - 969.5 / 6.0).abs() < 1e-9);
    assert_eq!(summary.email_click_rate.rounded(3), 0.333);

    // Category keys are exactly the discovered set, every value in [0, 1].
    let keys: Vec<&str> = summary.by_category.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, ["Hair", "Nails", "Makeup"]);
    for g in &summary.by_category {
        assert!((0.0..=1.0).contains(&g.rate.value));
    }
    assert!(summary.by_category[2].rate.no_data());

    // Engagement groups cover every row.
    let covered: usize = summary.by_email_engagement.iter().map(|g| g.rate.rows).sum();
    assert_eq!(covered, 6);

    // 300.00 falls outside every segment.
    let segmented: usize = summary.by_segment.iter().map(|g| g.rate.rows).sum();
    assert_eq!(segmented, 5);
    let medium = summary
        .by_segment
        .iter()
        .find(|g| g.key == Segment::Medium)
        .unwrap();
    assert_eq!(medium.rate.rows, 2);

    let insights = key_insights(&summary);
    assert!(insights[0].contains("highest return rate is Hair at 75.0%"));
    assert!(insights[1].contains("lowest return rate is Makeup at 0.0%"));
}

#[test]
fn test_filtering() {
    let data = create_test_csv();
    let table = load_dataset(data.path()).unwrap();

    let all = apply_filter(&table, &CategoryFilter::All).unwrap();
    assert_eq!(all.len(), table.len());
    assert_eq!(
        filtered_return_rate(&all),
        analytics::overall_return_rate(&table.view())
    );

    let nails = apply_filter(&table, &CategoryFilter::from_selection(Some("Nails"))).unwrap();
    assert_eq!(nails.len(), 3);
    assert_eq!(filtered_return_rate(&nails).rounded(3), 0.333);

    let before = table.clone();
    let err = apply_filter(&table, &CategoryFilter::from_selection(Some("Tattoo"))).unwrap_err();
    assert_eq!(err, DashboardError::UnknownCategory("Tattoo".into()));
    assert_eq!(table, before);
}

#[test]
fn test_prediction() {
    let data = create_test_csv();
    let model = create_test_model(-1.0);
    let ctx = load_context(data.path(), model.path());

    // C001's first row is Clicked: z = -1 + 0.5 * 2 = 0.
    let result = lookup_customer(&ctx.table, &ctx.model, "C001").unwrap();
    assert_eq!(result, Lookup::Found { row: 0, probability: 0.5 });

    // C002 is None: z = -1.
    let p = lookup_customer(&ctx.table, &ctx.model, "C002")
        .unwrap()
        .probability()
        .unwrap();
    assert!((p - 1.0 / (1.0 + 1f64.exp())).abs() < 1e-12);

    assert_eq!(
        lookup_customer(&ctx.table, &ctx.model, "C999").unwrap(),
        Lookup::NotFound
    );

    // Null feature: recoverable, not fatal.
    let err = lookup_customer(&ctx.table, &ctx.model, "C005").unwrap_err();
    assert!(matches!(err, DashboardError::ModelInput(_)));
    assert_eq!(err.exit_code(), None);
}

#[test]
fn test_model_schema_mismatch_is_model_input_error() {
    let data = create_test_csv();
    let table = load_dataset(data.path()).unwrap();

    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"feature_names": ["Purchase_Value"], "engagement_encoding": {{}},
            "estimator": {{"type": "logistic", "intercept": 0.0, "coefficients": [1.0]}}}}"#
    )
    .unwrap();
    let model = retention_dashboard::TrainedModel::load(file.path()).unwrap();

    let features = FeatureVector::from_record(&table.records()[0], table.categories()).unwrap();
    let err = model.predict_probability(&features).unwrap_err();
    assert!(matches!(err, DashboardError::ModelInput(ref m) if m.contains("expects 1 features")));
}

#[test]
fn test_startup_errors_are_fatal() {
    let model = create_test_model(0.0);
    let args = Args::try_parse_from([
        OsStr::new("retention-dashboard"),
        OsStr::new("/missing/prepared.csv"),
        model.path().as_os_str(),
    ])
    .unwrap();
    let config = args.into_config().unwrap();
    let err = DashboardContext::load(&config).unwrap_err();
    assert!(matches!(err, DashboardError::DataLoad { .. }));
    assert_eq!(err.exit_code(), Some(1));

    let data = create_test_csv();
    let config = Config {
        data_path: data.path().to_path_buf(),
        model_path: "/missing/model.json".into(),
    };
    let err = DashboardContext::load(&config).unwrap_err();
    assert!(matches!(err, DashboardError::ModelLoad { .. }));
}

#[test]
fn test_json_dataset() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[
  {{"Customer_ID": 42, "Date": "2024-06-01", "Purchase_Value": 85.5, "Email_Engagement": "Opened",
    "Discount_Used": true, "Return_Visit": 1, "frequency": 1, "total_spent": 85.5, "avg_spent": 85.5,
    "recency_days": 10, "purchase_month": 6, "purchase_dayofweek": 5, "Category_Nails": 1, "Category_Hair": 0}},
  {{"Customer_ID": "43", "Date": "06/02/2024", "Purchase_Value": 20, "Email_Engagement": "None",
    "Discount_Used": false, "Return_Visit": 0, "frequency": null, "total_spent": 20, "avg_spent": 20,
    "recency_days": 4, "purchase_month": 6, "purchase_dayofweek": 6, "Category_Nails": 0, "Category_Hair": 1}}
]"#
    )
    .unwrap();

    let table = load_dataset(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].customer_id, "42");
    assert_eq!(table.records()[0].discount_used, Some(true));
    assert_eq!(table.records()[1].frequency, None);
    assert_eq!(
        table.records()[1].date,
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
    );
    // Key order in the file decides category order.
    assert_eq!(table.categories().names(), ["Nails", "Hair"]);

    let summary = DashboardSummary::compute(&table.view());
    let low = summary.by_segment.iter().find(|g| g.key == Segment::Low).unwrap();
    let medium = summary.by_segment.iter().find(|g| g.key == Segment::Medium).unwrap();
    assert_eq!((low.rate.rows, medium.rate.rows), (1, 1));
}

#[test]
fn test_parquet_dataset() {
    let dates = [
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
    ];
    let engagement: DictionaryArray<Int32Type> = vec!["Clicked", "None"].into_iter().collect();

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("Customer_ID", Arc::new(StringArray::from(vec!["P1", "P2"]))),
        (
            "Date",
            Arc::new(Date32Array::from(
                dates.iter().map(|d| Date32Type::from_naive_date(*d)).collect::<Vec<_>>(),
            )),
        ),
        ("Purchase_Value", Arc::new(Float64Array::from(vec![60.0, 160.0]))),
        ("Email_Engagement", Arc::new(engagement)),
        ("Discount_Used", Arc::new(Int64Array::from(vec![1, 0]))),
        ("Return_Visit", Arc::new(Int64Array::from(vec![1, 0]))),
        ("frequency", Arc::new(Float64Array::from(vec![1.0, 2.0]))),
        ("total_spent", Arc::new(Float64Array::from(vec![60.0, 320.0]))),
        ("avg_spent", Arc::new(Float64Array::from(vec![60.0, 160.0]))),
        ("recency_days", Arc::new(Int64Array::from(vec![3, 45]))),
        ("purchase_month", Arc::new(Int64Array::from(vec![5, 5]))),
        ("purchase_dayofweek", Arc::new(Int64Array::from(vec![2, 3]))),
        ("Category_Spa", Arc::new(Int64Array::from(vec![0, 1]))),
    ];
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .unwrap();

    let file = Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load_dataset(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].date, dates[0]);
    assert_eq!(table.records()[1].email_engagement.as_str(), "None");
    assert_eq!(table.categories().names(), ["Spa"]);

    let spa = analytics::return_rate_by_category(&table.view());
    assert_eq!(spa[0].rate.value, 0.0);
    assert_eq!(spa[0].rate.rows, 1);
}
