//! # Rental Metrics
//!
//! The analytics core of a dashboard for two short-term rental properties:
//! booking sheets come in as loosely formatted text, KPI, occupancy and trend
//! figures come out.
//!
//! ## Core Concepts
//!
//! - **Ingestion**: spreadsheet grids (currency symbols, thousands separators,
//!   blank cells) are normalized once into typed [`NormalizedRow`]s
//! - **Aggregation**: totals, occupancy rate and average nightly rate over any
//!   property/year selection, plus trends against a comparison period
//! - **Buckets**: monthly, yearly and seasonal series with peak and trough
//!   detection
//! - **Comparisons**: month-by-month per property, year over year for a
//!   single month, property against property, and expense breakdowns
//!
//! ## Example
//!
//! ```rust,ignore
//! use rental_metrics::*;
//!
//! let grid = SheetGrid::from_values(vec![
//!     vec!["Month".into(), "Year".into(), "Nights".into(), "Gross Income".into()],
//!     vec!["January".into(), "2024".into(), "12".into(), "€1,200.00".into()],
//! ]);
//! let (dataset, _reports) = build_dataset([(Property::Lovely, grid)]);
//!
//! let filter = DashboardFilter::new(PropertyFilter::Only(Property::Lovely), YearFilter::Year(2024));
//! let snapshot = DashboardProcessor::snapshot(&dataset, &filter);
//! println!("Occupancy: {:.1}%", snapshot.kpis.metrics.occupancy_rate);
//! ```

pub mod access;
pub mod buckets;
pub mod comparison;
pub mod config;
pub mod error;
pub mod expenses;
pub mod export;
pub mod ingestion;
pub mod metrics;
pub mod schema;
pub mod seasonality;
pub mod utils;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use access::AccessList;
pub use buckets::{group_by_month, group_by_year, peak, trough, Bucket, Metric, MonthlyBucket, PeriodTotals, YearlyBucket};
pub use comparison::*;
pub use config::{DashboardConfig, TabSource};
pub use error::{RentalMetricsError, Result};
pub use expenses::{expense_breakdown, CategoryTotal, ExpenseSummary};
pub use export::{write_buckets_csv, write_csv, write_csv_file, write_rows_csv, BucketRow, ExportRow};
pub use ingestion::*;
pub use metrics::*;
pub use schema::*;
pub use seasonality::{group_by_season, Season, SeasonBucket};
pub use utils::*;

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the dashboard overview draws for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardSnapshot {
    pub filter: DashboardFilter,
    pub kpis: KpiSummary,
    pub monthly: Vec<MonthlyBucket>,
    pub yearly: Vec<YearlyBucket>,
    pub seasons: Vec<SeasonBucket>,
    pub expenses: ExpenseSummary,
    pub available_years: Vec<i32>,
}

impl DashboardSnapshot {
    pub fn best_month(&self, metric: Metric) -> Option<&MonthlyBucket> {
        peak(&self.monthly, metric)
    }

    pub fn weakest_month(&self, metric: Metric) -> Option<&MonthlyBucket> {
        trough(&self.monthly, metric)
    }

    pub fn best_season(&self, metric: Metric) -> Option<&SeasonBucket> {
        peak(&self.seasons, metric)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct DashboardProcessor;

impl DashboardProcessor {
    pub fn snapshot(dataset: &PropertyDataset, filter: &DashboardFilter) -> DashboardSnapshot {
        debug!(
            "Building snapshot over {} rows for {:?}",
            dataset.len(),
            filter
        );

        let rows = dataset.filtered(filter);
        let kpis = compute_kpis(dataset, filter);

        let snapshot = DashboardSnapshot {
            filter: *filter,
            monthly: group_by_month(&rows, filter.property),
            yearly: group_by_year(&rows, filter.property),
            seasons: group_by_season(&rows, filter.property),
            expenses: expense_breakdown(&rows),
            available_years: dataset.available_years(),
            kpis,
        };

        info!(
            "Snapshot ready: {} months, gross {:.2}, occupancy {:.1}%",
            snapshot.monthly.len(),
            snapshot.kpis.metrics.total_gross,
            snapshot.kpis.metrics.occupancy_rate
        );
        snapshot
    }

    /// Ingests freshly fetched tables and builds the snapshot in one step.
    pub fn from_tables<I>(tables: I, filter: &DashboardFilter) -> (DashboardSnapshot, Vec<IngestReport>)
    where
        I: IntoIterator<Item = (Property, SheetGrid)>,
    {
        let (dataset, reports) = build_dataset(tables);
        (Self::snapshot(&dataset, filter), reports)
    }
}

pub fn build_snapshot(dataset: &PropertyDataset, filter: &DashboardFilter) -> DashboardSnapshot {
    DashboardProcessor::snapshot(dataset, filter)
}
