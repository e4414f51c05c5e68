use anyhow::Context;
use dotenv::dotenv;
use rental_metrics::sheets::SheetsClient;
use rental_metrics::*;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = DashboardConfig::from_env()?;
    let client = match env::var("GOOGLE_SHEETS_API_KEY") {
        Ok(key) => SheetsClient::with_api_key(key),
        Err(_) => SheetsClient::with_token(
            env::var("GOOGLE_ACCESS_TOKEN")
                .context("set GOOGLE_SHEETS_API_KEY or GOOGLE_ACCESS_TOKEN")?,
        ),
    };

    if let Ok(email) = env::var("SIGNED_IN_EMAIL") {
        let access = config.load_access_list()?;
        if !access.authorize(Some(&email)) {
            println!("⛔ {} is not on the allow-list", email);
            return Ok(());
        }
    }

    println!("📥 Fetching {} tabs from {}", config.tabs.len(), config.spreadsheet_id);
    let (dataset, reports) = client
        .fetch_dataset(&config)
        .await
        .context("failed to load booking sheets")?;
    for report in &reports {
        println!(
            "  {}: {} rows ({} dropped)",
            report.property, report.kept_rows, report.dropped_rows
        );
    }

    let year = dataset.latest_year().map_or(YearFilter::All, YearFilter::Year);
    let snapshot = build_snapshot(&dataset, &DashboardFilter::new(PropertyFilter::Both, year));
    println!("{}", snapshot.to_json()?);

    Ok(())
}
