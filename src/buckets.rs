use crate::metrics::occupancy_rate;
use crate::schema::{Month, NormalizedRow, PropertyFilter};
use crate::utils::period_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodTotals {
    pub gross: f64,
    pub net: f64,
    pub nights: u64,
}

impl PeriodTotals {
    pub fn add(&mut self, row: &NormalizedRow) {
        self.gross += row.gross;
        self.net += row.net;
        self.nights += u64::from(row.nights);
    }

    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedRow>,
    {
        let mut totals = Self::default();
        for row in rows {
            totals.add(row);
        }
        totals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Gross,
    Net,
    Nights,
    Occupancy,
}

/// Common view over monthly, yearly and seasonal buckets.
pub trait Bucket {
    fn totals(&self) -> &PeriodTotals;
    fn occupancy_rate(&self) -> f64;

    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Gross => self.totals().gross,
            Metric::Net => self.totals().net,
            Metric::Nights => self.totals().nights as f64,
            Metric::Occupancy => self.occupancy_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyBucket {
    /// Sort key, e.g. "2023-01".
    pub period: String,
    /// Display label, e.g. "January 2023".
    pub label: String,
    pub year: i32,
    pub month: Month,
    pub days_in_month: u32,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub occupancy_rate: f64,
}

impl Bucket for MonthlyBucket {
    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn occupancy_rate(&self) -> f64 {
        self.occupancy_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearlyBucket {
    pub year: i32,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub occupancy_rate: f64,
}

impl Bucket for YearlyBucket {
    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn occupancy_rate(&self) -> f64 {
        self.occupancy_rate
    }
}

/// One bucket per (year, month) present in `rows`, in calendar order.
/// Rows without a year or month are left out.
pub fn group_by_month(rows: &[NormalizedRow], property_filter: PropertyFilter) -> Vec<MonthlyBucket> {
    let mut groups: BTreeMap<(i32, Month), Vec<NormalizedRow>> = BTreeMap::new();
    for row in rows {
        if let Some(period) = row.period() {
            groups.entry(period).or_default().push(*row);
        }
    }

    groups
        .into_iter()
        .map(|((year, month), members)| MonthlyBucket {
            period: period_key(year, month),
            label: format!("{} {}", month, year),
            year,
            month,
            days_in_month: month.days_in(year),
            totals: PeriodTotals::from_rows(&members),
            occupancy_rate: occupancy_rate(&members, property_filter.multiplier()),
        })
        .collect()
}

/// One bucket per year present in `rows`, ascending. Occupancy is measured
/// against the months of that year that actually have rows.
pub fn group_by_year(rows: &[NormalizedRow], property_filter: PropertyFilter) -> Vec<YearlyBucket> {
    let mut groups: BTreeMap<i32, Vec<NormalizedRow>> = BTreeMap::new();
    for row in rows {
        if let Some(year) = row.year {
            groups.entry(year).or_default().push(*row);
        }
    }

    groups
        .into_iter()
        .map(|(year, members)| YearlyBucket {
            year,
            totals: PeriodTotals::from_rows(&members),
            occupancy_rate: occupancy_rate(&members, property_filter.multiplier()),
        })
        .collect()
}

/// Bucket with the highest value of `metric`; the first one wins a tie.
pub fn peak<B: Bucket>(buckets: &[B], metric: Metric) -> Option<&B> {
    buckets.iter().fold(None, |best: Option<&B>, b| match best {
        Some(current) if current.metric(metric) >= b.metric(metric) => Some(current),
        _ => Some(b),
    })
}

/// Bucket with the lowest value of `metric`; the first one wins a tie.
pub fn trough<B: Bucket>(buckets: &[B], metric: Metric) -> Option<&B> {
    buckets.iter().fold(None, |best: Option<&B>, b| match best {
        Some(current) if current.metric(metric) <= b.metric(metric) => Some(current),
        _ => Some(b),
    })
}
