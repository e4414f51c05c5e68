use rental_metrics::*;
use std::fs;

const HEADERS: [&str; 11] = [
    "Month",
    "Year",
    "Nights",
    "Gross Income",
    "Commissions (Booking, AirBnB)",
    "Property Management",
    "Internet",
    "Electricity",
    "Water",
    "Condominio",
    "Extra",
];

fn sheet(rows: &[&[&str]]) -> SheetGrid {
    let mut values = vec![HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    values.extend(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
    );
    SheetGrid::from_values(values)
}

fn row(property: Property, month: Month, year: i32, nights: u32, gross: f64) -> NormalizedRow {
    NormalizedRow::new(
        property,
        Some(month),
        Some(year),
        nights,
        gross,
        ExpenseBreakdown::default(),
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.05,
        "expected {expected}, got {actual}"
    );
}

/// Two years of bookings for both apartments, formatted the way the owners
/// keep them in the spreadsheet.
fn booking_history() -> (PropertyDataset, Vec<IngestReport>) {
    let lovely = sheet(&[
        &["January", "2023", "12", "€1,080.00", "-€162.00", "-€216.00", "-30", "-85.50", "-20", "-60", ""],
        &["April", "2023", "18", "€1,620.00", "-€243.00", "-€324.00", "-30", "-40", "-20", "-60", ""],
        &["July", "2023", "29", "€3,480.00", "-€522.00", "-€696.00", "-30", "-95", "-25", "-60", "-120"],
        &["October", "2023", "20", "€1,900.00", "-€285.00", "-€380.00", "-30", "-45", "-20", "-60", ""],
        &["January", "2024", "14", "€1,330.00", "-€199.50", "-€266.00", "-30", "-90", "-20", "-60", ""],
        &["April", "2024", "22", "€2,090.00", "-€313.50", "-€418.00", "-30", "-42", "-20", "-60", ""],
        &["July", "2024", "31", "€4,030.00", "-€604.50", "-€806.00", "-30", "-110", "-25", "-60", ""],
        &["October", "2024", "24", "€2,400.00", "-€360.00", "-€480.00", "-30", "-48", "-20", "-60", "-75"],
        &["Total", "", "170", "€17,930.00", "", "", "", "", "", "", ""],
    ]);
    let relaxing = sheet(&[
        &["January", "2023", "8", "€640.00", "-€96.00", "-€128.00", "-30", "-70", "-18", "-55", ""],
        &["July", "2023", "27", "€2,700.00", "-€405.00", "-€540.00", "-30", "-88", "-22", "-55", ""],
        &["January", "2024", "10", "€850.00", "-€127.50", "-€170.00", "-30", "-75", "-18", "-55", ""],
        &["July", "2024", "30", "€3,150.00", "-€472.50", "-€630.00", "-30", "-100", "-22", "-55", ""],
        &["August", "2024", "99999999999", "€0.00", "", "", "", "", "", "", ""],
    ]);

    build_dataset([(Property::Lovely, lovely), (Property::Relaxing, relaxing)])
}

#[test]
fn test_ingestion_reports() {
    let (dataset, reports) = booking_history();

    assert_eq!(reports.len(), 2);
    let lovely = &reports[0];
    assert_eq!(lovely.property, Property::Lovely);
    assert_eq!(lovely.total_rows, 9);
    assert_eq!(lovely.kept_rows, 9);

    let relaxing = &reports[1];
    assert_eq!(relaxing.total_rows, 5);
    assert_eq!(relaxing.kept_rows, 4);
    assert_eq!(relaxing.dropped_rows, 1);

    // The "Total" footer survives ingestion but carries no period.
    let footer = dataset.rows(Property::Lovely).last().unwrap();
    assert_eq!(footer.month, None);
    assert_eq!(footer.year, None);

    let first = dataset.rows(Property::Lovely)[0];
    assert_close(first.gross, 1080.0);
    assert_close(first.expenses.total(), -573.5);
    assert_close(first.net, 506.5);

    assert_eq!(dataset.available_years(), vec![2023, 2024]);
    assert_eq!(dataset.latest_year(), Some(2024));
}

#[test]
fn test_year_kpis_against_previous_year() {
    let (dataset, _) = booking_history();
    let filter = DashboardFilter::new(PropertyFilter::Both, YearFilter::Year(2024));
    let kpis = compute_kpis(&dataset, &filter);

    assert_eq!(kpis.trend_period, "vs 2023");
    assert_eq!(kpis.metrics.total_nights, 131);
    assert_close(kpis.metrics.total_gross, 13850.0);

    // 2024 has January, April, July, October: 31 + 30 + 31 + 31 days, two flats.
    assert_close(kpis.metrics.occupancy_rate, 131.0 / 246.0 * 100.0);
    assert_close(kpis.metrics.avg_nightly_rate, 13850.0 / 131.0);

    let revenue_2023 = 1080.0 + 1620.0 + 3480.0 + 1900.0 + 640.0 + 2700.0;
    assert_close(
        kpis.trends.revenue.value_or_zero(),
        (13850.0 - revenue_2023) / revenue_2023 * 100.0,
    );
    assert!(kpis.trends.nightly.is_defined());
}

#[test]
fn test_all_time_kpis_use_record_windows() {
    let (dataset, _) = booking_history();
    let filter = DashboardFilter::new(PropertyFilter::Only(Property::Lovely), YearFilter::All);

    let window = select_comparison(&dataset, &filter);
    assert_eq!(window.label, "Last 6 months vs previous 6 months");
    assert_eq!(window.current.len(), 6);
    // Eight dated rows plus the footer leave three for the comparison side.
    assert_eq!(window.previous.len(), 3);
    assert_eq!(window.current[0].period(), Some((2024, Month::October)));
    assert_eq!(window.previous.last().and_then(|r| r.period()), None);

    let kpis = compute_kpis(&dataset, &filter);
    assert_eq!(kpis.trend_period, ALL_TIME_TREND_LABEL);
    assert!(kpis.trends.revenue.is_defined());
}

#[test]
fn test_all_time_window_across_both_properties() {
    let mut dataset = PropertyDataset::new();
    dataset.insert(
        Property::Lovely,
        [Month::January, Month::February, Month::March, Month::April, Month::May]
            .into_iter()
            .map(|m| row(Property::Lovely, m, 2024, 10, 1000.0))
            .collect(),
    );
    dataset.insert(
        Property::Relaxing,
        [Month::March, Month::April, Month::May]
            .into_iter()
            .map(|m| row(Property::Relaxing, m, 2024, 8, 700.0))
            .collect(),
    );

    let window = select_comparison(&dataset, &DashboardFilter::default());
    let order = |rows: &[NormalizedRow]| -> Vec<(Property, Option<Month>)> {
        rows.iter().map(|r| (r.property, r.month)).collect()
    };

    // Six rows cover only three calendar months once both flats report;
    // within a month the Lovely row stays ahead of the Relaxing one.
    assert_eq!(
        order(&window.current),
        vec![
            (Property::Lovely, Some(Month::May)),
            (Property::Relaxing, Some(Month::May)),
            (Property::Lovely, Some(Month::April)),
            (Property::Relaxing, Some(Month::April)),
            (Property::Lovely, Some(Month::March)),
            (Property::Relaxing, Some(Month::March)),
        ]
    );
    assert_eq!(
        order(&window.previous),
        vec![
            (Property::Lovely, Some(Month::February)),
            (Property::Lovely, Some(Month::January)),
        ]
    );

    let kpis = compute_kpis(&dataset, &DashboardFilter::default());
    assert_close(
        kpis.trends.revenue.value_or_zero(),
        (5100.0 - 2000.0) / 2000.0 * 100.0,
    );
}

#[test]
fn test_occupancy_examples() {
    let mut dataset = PropertyDataset::new();
    dataset.insert(Property::Lovely, vec![row(Property::Lovely, Month::April, 2024, 15, 1500.0)]);
    dataset.insert(Property::Relaxing, vec![row(Property::Relaxing, Month::April, 2024, 10, 900.0)]);

    let single = DashboardFilter::new(PropertyFilter::Only(Property::Lovely), YearFilter::Year(2024));
    assert_close(compute_kpis(&dataset, &single).metrics.occupancy_rate, 50.0);

    let both = DashboardFilter::new(PropertyFilter::Both, YearFilter::Year(2024));
    let kpis = compute_kpis(&dataset, &both);
    assert_close(kpis.metrics.occupancy_rate, 41.7);
    assert_eq!(kpis.trends.revenue, TrendValue::Undefined);
    assert_eq!(kpis.trends.revenue.value_or_zero(), 0.0);
}

#[test]
fn test_degenerate_inputs() {
    let empty = compute_metrics(&[], PropertyFilter::Both);
    assert_eq!(empty.total_gross, 0.0);
    assert_eq!(empty.total_nights, 0);
    assert_eq!(empty.occupancy_rate, 0.0);
    assert_eq!(empty.avg_nightly_rate, 0.0);

    let unbooked = compute_metrics(
        &[row(Property::Lovely, Month::May, 2024, 0, 250.0)],
        PropertyFilter::Both,
    );
    assert_eq!(unbooked.avg_nightly_rate, 0.0);

    assert_eq!(percent_change(100.0, 0.0).value_or_zero(), 0.0);
    assert_eq!(parse_value("€1,234.50"), 1234.50);
    assert_eq!(parse_value(""), 0.0);
    assert_eq!(parse_value("N/A"), 0.0);
}

#[test]
fn test_buckets_and_seasons() {
    let rows = vec![
        row(Property::Lovely, Month::July, 2024, 25, 2500.0),
        row(Property::Lovely, Month::December, 2023, 12, 1100.0),
        row(Property::Relaxing, Month::July, 2024, 20, 1800.0),
    ];

    let seasons = group_by_season(&rows, PropertyFilter::Both);
    assert_eq!(seasons.len(), 4);
    for season in [Season::Spring, Season::Fall] {
        let bucket = seasons.iter().find(|b| b.season == season).unwrap();
        assert_eq!(bucket.totals.gross, 0.0);
        assert_eq!(bucket.totals.nights, 0);
    }
    let summer = seasons.iter().find(|b| b.season == Season::Summer).unwrap();
    assert_eq!(summer.by_property.len(), 2);

    let (dataset, _) = booking_history();
    let monthly = group_by_month(&dataset.all_rows(), PropertyFilter::Both);
    let periods: Vec<&str> = monthly.iter().map(|b| b.period.as_str()).collect();
    assert_eq!(
        periods,
        vec!["2023-01", "2023-04", "2023-07", "2023-10", "2024-01", "2024-04", "2024-07", "2024-10"]
    );
    assert_eq!(peak(&monthly, Metric::Gross).map(|b| b.label.as_str()), Some("July 2024"));
    assert_eq!(trough(&monthly, Metric::Nights).map(|b| b.label.as_str()), Some("April 2023"));

    let yearly = group_by_year(&dataset.all_rows(), PropertyFilter::Both);
    assert_eq!(yearly.iter().map(|b| b.year).collect::<Vec<_>>(), vec![2023, 2024]);
}

#[test]
fn test_comparison_insights() {
    let (dataset, _) = booking_history();

    let months = monthly_comparison(&dataset, 2024);
    assert_eq!(months.len(), 12);
    let july = &months[Month::July as usize];
    assert_eq!(july.properties.len(), 2);
    assert_close(july.properties[&Property::Relaxing].occupancy_rate, 30.0 / 31.0 * 100.0);

    let yoy = year_over_year(&dataset, Month::July, PropertyFilter::Both, YoyMetric::Revenue);
    assert_eq!(yoy.points.len(), 2);
    assert_eq!(yoy.changes.len(), 1);
    assert_close(
        yoy.changes[0].change.value_or_zero(),
        (7180.0 - 6180.0) / 6180.0 * 100.0,
    );

    let performance = compare_properties(&dataset);
    assert_eq!(performance.len(), 2);
    assert!(performance[0].profit_margin > 0.0);
    assert!(performance[0].revenue_per_day > 0.0);

    let expenses = expense_breakdown(&dataset.all_rows());
    assert!(expenses.total_expenses > 0.0);
    assert!(expenses.nonzero_categories().all(|c| c.amount > 0.0));
    assert_close(expenses.net_income, expenses.gross_income - expenses.total_expenses);
}

#[test]
fn test_payload_round_trip() {
    let (dataset, _) = booking_history();

    let json = serde_json::to_string(&dataset.to_payload()).unwrap();
    assert!(json.contains("Nuno Gomez Piano terra - Relaxing"));

    let payload: DatasetPayload = serde_json::from_str(&json).unwrap();
    let restored = PropertyDataset::from_payload(payload).unwrap();
    assert_eq!(restored, dataset);

    let schema = DatasetPayload::schema_as_json().unwrap();
    assert!(schema.contains("NormalizedRow"));
}

#[test]
fn test_export_snapshot_tables() {
    let (dataset, _) = booking_history();
    let snapshot = DashboardProcessor::snapshot(&dataset, &DashboardFilter::default());

    let mut rows_csv = Vec::new();
    write_rows_csv(&mut rows_csv, &dataset.all_rows()).unwrap();
    let rows_csv = String::from_utf8(rows_csv).unwrap();
    assert_eq!(rows_csv.lines().count(), 1 + dataset.len());

    let path = std::env::temp_dir().join("rental_metrics_monthly_export.csv");
    let records: Vec<BucketRow> = snapshot.monthly.iter().map(BucketRow::from).collect();
    write_csv_file(&path, &records).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("period,gross,net,nights,occupancy_rate"));
    assert_eq!(written.lines().count(), 1 + snapshot.monthly.len());
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_and_access_flow() {
    let access_path = std::env::temp_dir().join("rental_metrics_allowed_emails.json");
    fs::write(
        &access_path,
        r#"{"allowed_emails": ["owner@example.com", "Manager@Example.com"]}"#,
    )
    .unwrap();

    let config_json = format!(
        r#"{{"spreadsheet_id": "1AbCdEf", "access_list_path": {}}}"#,
        serde_json::to_string(&access_path).unwrap()
    );
    let config = DashboardConfig::from_json_str(&config_json).unwrap();
    assert_eq!(config.tabs.len(), 2);

    let access = config.load_access_list().unwrap();
    assert!(access.authorize(Some("manager@example.com")));
    assert!(!access.authorize(Some("guest@example.com")));
    assert!(!access.authorize(None));

    fs::remove_file(&access_path).unwrap();
}
