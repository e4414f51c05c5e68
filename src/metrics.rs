//! KPI totals, occupancy and period-over-period trends.
//!
//! Every function here is total: degenerate arithmetic (empty input, zero
//! denominators, missing comparison data) yields `0` or
//! [`TrendValue::Undefined`] instead of an error.

use crate::schema::{DashboardFilter, Month, NormalizedRow, PropertyDataset, PropertyFilter, YearFilter};
use crate::utils::{ratio_or_zero, sum_or_zero};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Number of most recent rows compared against the rows before them in the
/// all-time view.
pub const ALL_TIME_WINDOW: usize = 6;

pub const ALL_TIME_TREND_LABEL: &str = "Last 6 months vs previous 6 months";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DerivedMetrics {
    pub total_gross: f64,
    pub total_nights: u64,
    pub net_income: f64,
    pub occupancy_rate: f64,
    pub avg_nightly_rate: f64,
}

/// A percent change that may have no meaningful value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum TrendValue {
    Computed(f64),
    #[default]
    Undefined,
}

impl TrendValue {
    /// The dashboard renders a missing trend as 0%.
    pub fn value_or_zero(&self) -> f64 {
        match self {
            TrendValue::Computed(v) => *v,
            TrendValue::Undefined => 0.0,
        }
    }

    pub fn as_option(&self) -> Option<f64> {
        match self {
            TrendValue::Computed(v) => Some(*v),
            TrendValue::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, TrendValue::Computed(_))
    }
}

impl From<Option<f64>> for TrendValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(TrendValue::Undefined, TrendValue::Computed)
    }
}

impl From<TrendValue> for Option<f64> {
    fn from(value: TrendValue) -> Self {
        value.as_option()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrendSet {
    pub revenue: TrendValue,
    pub nights: TrendValue,
    pub occupancy: TrendValue,
    pub nightly: TrendValue,
    pub net_income: TrendValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiSummary {
    pub metrics: DerivedMetrics,
    pub trends: TrendSet,
    pub trend_period: String,
}

/// Rows of the selected period and of the period they are compared with.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonWindow {
    pub current: Vec<NormalizedRow>,
    pub previous: Vec<NormalizedRow>,
    pub label: String,
}

pub fn total_gross(rows: &[NormalizedRow]) -> f64 {
    sum_or_zero(rows.iter().map(|r| r.gross))
}

pub fn total_net(rows: &[NormalizedRow]) -> f64 {
    sum_or_zero(rows.iter().map(|r| r.net))
}

pub fn total_nights(rows: &[NormalizedRow]) -> u64 {
    rows.iter().map(|r| u64::from(r.nights)).sum()
}

/// Nights on offer over the distinct (year, month) pairs covered by `rows`,
/// each month counted `property_multiplier` times.
pub fn available_nights(rows: &[NormalizedRow], property_multiplier: u32) -> u64 {
    let months: BTreeSet<(i32, Month)> = rows.iter().filter_map(NormalizedRow::period).collect();
    months
        .iter()
        .map(|(year, month)| u64::from(month.days_in(*year)) * u64::from(property_multiplier))
        .sum()
}

/// Booked nights as a percentage of [`available_nights`]. Rows without a
/// known year and month take no part on either side of the ratio.
pub fn occupancy_rate(rows: &[NormalizedRow], property_multiplier: u32) -> f64 {
    let booked: u64 = rows
        .iter()
        .filter(|r| r.period().is_some())
        .map(|r| u64::from(r.nights))
        .sum();
    let available = available_nights(rows, property_multiplier);

    if available == 0 {
        0.0
    } else {
        booked as f64 / available as f64 * 100.0
    }
}

pub fn compute_metrics(rows: &[NormalizedRow], property_filter: PropertyFilter) -> DerivedMetrics {
    let total_gross = total_gross(rows);
    let total_nights = total_nights(rows);

    DerivedMetrics {
        total_gross,
        total_nights,
        net_income: total_net(rows),
        occupancy_rate: occupancy_rate(rows, property_filter.multiplier()),
        avg_nightly_rate: ratio_or_zero(total_gross, total_nights as f64),
    }
}

/// `(current - previous) / previous * 100`, undefined when `previous` is zero.
pub fn percent_change(current: f64, previous: f64) -> TrendValue {
    if previous == 0.0 {
        TrendValue::Undefined
    } else {
        TrendValue::Computed((current - previous) / previous * 100.0)
    }
}

pub fn compute_trends(
    current: &[NormalizedRow],
    previous: &[NormalizedRow],
    property_filter: PropertyFilter,
) -> TrendSet {
    if current.is_empty() || previous.is_empty() {
        return TrendSet::default();
    }

    let now = compute_metrics(current, property_filter);
    let before = compute_metrics(previous, property_filter);

    let nightly = if now.total_nights > 0 && before.total_nights > 0 {
        percent_change(now.avg_nightly_rate, before.avg_nightly_rate)
    } else {
        TrendValue::Undefined
    };

    TrendSet {
        revenue: percent_change(now.total_gross, before.total_gross),
        nights: percent_change(now.total_nights as f64, before.total_nights as f64),
        occupancy: percent_change(now.occupancy_rate, before.occupancy_rate),
        nightly,
        net_income: percent_change(now.net_income, before.net_income),
    }
}

/// Picks the rows to compare for the trend figures.
///
/// With a year selected the comparison is the prior calendar year under the
/// same property filter. In the all-time view the rows are ordered newest
/// first and the first [`ALL_TIME_WINDOW`] rows are compared with the next
/// [`ALL_TIME_WINDOW`]. That window counts rows across properties, not
/// calendar months.
pub fn select_comparison(dataset: &PropertyDataset, filter: &DashboardFilter) -> ComparisonWindow {
    let by_property = dataset.by_property(filter.property);

    match filter.year {
        YearFilter::Year(year) => {
            let previous_year = year.checked_sub(1);
            let (current, previous) = by_property.into_iter().fold(
                (Vec::new(), Vec::new()),
                |(mut current, mut previous), row| {
                    if row.year == Some(year) {
                        current.push(row);
                    } else if previous_year.is_some() && row.year == previous_year {
                        previous.push(row);
                    }
                    (current, previous)
                },
            );
            let label = match previous_year {
                Some(previous_year) => format!("vs {}", previous_year),
                None => "vs previous year".to_string(),
            };
            ComparisonWindow {
                current,
                previous,
                label,
            }
        }
        YearFilter::All => {
            let mut sorted = by_property;
            sorted.sort_by_key(|r| Reverse(r.date()));

            let current: Vec<NormalizedRow> =
                sorted.iter().take(ALL_TIME_WINDOW).copied().collect();
            let previous: Vec<NormalizedRow> = sorted
                .iter()
                .skip(ALL_TIME_WINDOW)
                .take(ALL_TIME_WINDOW)
                .copied()
                .collect();

            if sorted.len() < ALL_TIME_WINDOW * 2 {
                debug!(
                    "All-time trend window has only {} rows; comparison is partial",
                    sorted.len()
                );
            }

            ComparisonWindow {
                current,
                previous,
                label: ALL_TIME_TREND_LABEL.to_string(),
            }
        }
    }
}

/// Headline figures for the dashboard under the given filter.
pub fn compute_kpis(dataset: &PropertyDataset, filter: &DashboardFilter) -> KpiSummary {
    let rows = dataset.filtered(filter);
    let metrics = compute_metrics(&rows, filter.property);
    let window = select_comparison(dataset, filter);

    debug!(
        "KPIs over {} rows; trend window {} vs {} rows ({})",
        rows.len(),
        window.current.len(),
        window.previous.len(),
        window.label
    );

    KpiSummary {
        metrics,
        trends: compute_trends(&window.current, &window.previous, filter.property),
        trend_period: window.label,
    }
}
