use rental_metrics::*;
use std::error::Error;

// Booking sheets as the spreadsheet API returns them: text cells, currency
// symbols and thousands separators included.
const LOVELY_SHEET: &[&[&str]] = &[
    &["Month", "Year", "Nights", "Gross Income", "Commissions (Booking, AirBnB)", "Property Management", "Electricity"],
    &["November", "2023", "11", "€990.00", "-€148.50", "-€198.00", "-70"],
    &["December", "2023", "19", "€2,090.00", "-€313.50", "-€418.00", "-95"],
    &["January", "2024", "9", "€810.00", "-€121.50", "-€162.00", "-88"],
    &["February", "2024", "13", "€1,170.00", "-€175.50", "-€234.00", "-80"],
    &["March", "2024", "17", "€1,615.00", "-€242.25", "-€323.00", "-60"],
    &["April", "2024", "21", "€2,100.00", "-€315.00", "-€420.00", "-45"],
    &["May", "2024", "24", "€2,520.00", "-€378.00", "-€504.00", "-40"],
];

const RELAXING_SHEET: &[&[&str]] = &[
    &["Month", "Year", "Nights", "Gross Income", "Commissions (Booking, AirBnB)", "Property Management", "Electricity"],
    &["December", "2023", "16", "€1,520.00", "-€228.00", "-€304.00", "-82"],
    &["January", "2024", "7", "€560.00", "-€84.00", "-€112.00", "-79"],
    &["April", "2024", "18", "€1,530.00", "-€229.50", "-€306.00", "-41"],
    &["May", "2024", "N/A", "", "", "", ""],
];

fn grid(rows: &[&[&str]]) -> SheetGrid {
    SheetGrid::from_values(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn trend(value: TrendValue) -> String {
    match value {
        TrendValue::Computed(v) => format!("{:+.1}%", v),
        TrendValue::Undefined => "n/a".to_string(),
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    println!("🏠 Rental Dashboard Summary\n");

    let (dataset, reports) = build_dataset([
        (Property::Lovely, grid(LOVELY_SHEET)),
        (Property::Relaxing, grid(RELAXING_SHEET)),
    ]);
    for report in &reports {
        println!(
            "Ingested {}: {} kept, {} dropped",
            report.property, report.kept_rows, report.dropped_rows
        );
    }

    for filter in [
        DashboardFilter::default(),
        DashboardFilter::new(PropertyFilter::Only(Property::Lovely), YearFilter::Year(2024)),
    ] {
        let snapshot = DashboardProcessor::snapshot(&dataset, &filter);
        let kpis = &snapshot.kpis;

        println!("\n📊 {:?} / {:?} ({})", filter.property, filter.year, kpis.trend_period);
        println!("  Revenue:      €{:>10.2}  {}", kpis.metrics.total_gross, trend(kpis.trends.revenue));
        println!("  Net income:   €{:>10.2}  {}", kpis.metrics.net_income, trend(kpis.trends.net_income));
        println!("  Nights:        {:>10}  {}", kpis.metrics.total_nights, trend(kpis.trends.nights));
        println!("  Occupancy:     {:>9.1}%  {}", kpis.metrics.occupancy_rate, trend(kpis.trends.occupancy));
        println!("  Nightly rate: €{:>10.2}  {}", kpis.metrics.avg_nightly_rate, trend(kpis.trends.nightly));

        if let Some(best) = snapshot.best_month(Metric::Gross) {
            println!("  Best month:   {} (€{:.2})", best.label, best.totals.gross);
        }
        if let Some(weakest) = snapshot.weakest_month(Metric::Occupancy) {
            println!("  Weakest month: {} ({:.1}%)", weakest.label, weakest.occupancy_rate);
        }

        println!("  Seasons:");
        for season in &snapshot.seasons {
            println!(
                "    {:<6} €{:>9.2}  {:>3} nights",
                season.season.to_string(), season.totals.gross, season.totals.nights
            );
        }

        println!("  Expenses (€{:.2} total):", snapshot.expenses.total_expenses);
        for category in snapshot.expenses.nonzero_categories() {
            println!(
                "    {:<20} €{:>8.2}  {:>5.1}%",
                category.category.label(),
                category.amount,
                snapshot.expenses.share(category.category)
            );
        }
    }

    println!("\n🏘  Property comparison");
    for perf in compare_properties(&dataset) {
        println!(
            "  {}: €{:.2}/night, {:.1}% occupancy, {:.1}% margin",
            perf.property, perf.avg_nightly_rate, perf.occupancy_rate, perf.profit_margin
        );
    }

    let monthly = group_by_month(&dataset.all_rows(), PropertyFilter::Both);
    let path = std::env::temp_dir().join("rental_monthly.csv");
    write_csv_file(&path, &monthly.iter().map(BucketRow::from).collect::<Vec<_>>())?;
    println!("\n💾 Monthly table written to {}", path.display());

    Ok(())
}
