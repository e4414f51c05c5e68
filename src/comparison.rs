use crate::buckets::PeriodTotals;
use crate::metrics::{available_nights, occupancy_rate, percent_change, TrendValue};
use crate::schema::{Month, NormalizedRow, Property, PropertyDataset, PropertyFilter};
use crate::utils::{percent_of, ratio_or_zero, sum_or_zero};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyMonth {
    pub gross: f64,
    pub net: f64,
    pub nights: u64,
    pub occupancy_rate: f64,
    pub gross_growth: TrendValue,
    pub net_growth: TrendValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthComparison {
    pub year: i32,
    pub month: Month,
    pub properties: BTreeMap<Property, PropertyMonth>,
}

/// Month-over-month growth is only shown when this month has a figure and
/// the previous month's figure is positive.
fn growth(current: f64, previous: f64) -> TrendValue {
    if current != 0.0 && previous > 0.0 {
        percent_change(current, previous)
    } else {
        TrendValue::Undefined
    }
}

/// Side-by-side monthly figures of each property for one year. Always twelve
/// entries, January first; a property without a row for a month is absent
/// from that month's map.
pub fn monthly_comparison(dataset: &PropertyDataset, year: i32) -> Vec<MonthComparison> {
    let mut months: Vec<MonthComparison> = Month::ALL
        .into_iter()
        .map(|month| MonthComparison {
            year,
            month,
            properties: BTreeMap::new(),
        })
        .collect();

    for property in dataset.properties() {
        for row in dataset.rows(property) {
            let Some(month) = row.month else { continue };
            if row.year != Some(year) {
                continue;
            }
            let slot = months[month as usize]
                .properties
                .entry(property)
                .or_default();
            slot.gross += row.gross;
            slot.net += row.net;
            slot.nights += u64::from(row.nights);
        }
    }

    for entry in months.iter_mut() {
        let days = entry.month.days_in(year);
        for slot in entry.properties.values_mut() {
            slot.occupancy_rate = percent_of(slot.nights as f64, f64::from(days));
        }
    }

    for idx in 1..months.len() {
        let (before, after) = months.split_at_mut(idx);
        let previous = &before[idx - 1];
        let current = &mut after[0];
        for (property, slot) in current.properties.iter_mut() {
            if let Some(prev) = previous.properties.get(property) {
                slot.gross_growth = growth(slot.gross, prev.gross);
                slot.net_growth = growth(slot.net, prev.net);
            }
        }
    }

    months
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum YoyMetric {
    Revenue,
    Net,
    Occupancy,
    AvgPrice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearFigures {
    pub gross: f64,
    pub net: f64,
    pub occupancy_rate: f64,
    pub avg_price: f64,
}

impl YearFigures {
    fn from_row(row: &NormalizedRow, month: Month, year: i32) -> Self {
        Self {
            gross: row.gross,
            net: row.net,
            occupancy_rate: percent_of(f64::from(row.nights), f64::from(month.days_in(year))),
            avg_price: ratio_or_zero(row.gross, f64::from(row.nights)),
        }
    }

    fn metric(&self, metric: YoyMetric) -> f64 {
        match metric {
            YoyMetric::Revenue => self.gross,
            YoyMetric::Net => self.net,
            YoyMetric::Occupancy => self.occupancy_rate,
            YoyMetric::AvgPrice => self.avg_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearPoint {
    pub year: i32,
    pub properties: BTreeMap<Property, YearFigures>,
}

impl YearPoint {
    /// Revenue and net are summed across properties; rates are averaged over
    /// the properties reporting a non-zero value.
    pub fn combined(&self, metric: YoyMetric) -> f64 {
        let values: Vec<f64> = self.properties.values().map(|f| f.metric(metric)).collect();
        match metric {
            YoyMetric::Revenue | YoyMetric::Net => sum_or_zero(values),
            YoyMetric::Occupancy | YoyMetric::AvgPrice => {
                let reporting: Vec<f64> = values.into_iter().filter(|v| *v != 0.0).collect();
                ratio_or_zero(sum_or_zero(reporting.iter().copied()), reporting.len() as f64)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearChange {
    pub year: i32,
    pub previous_year: i32,
    pub change: TrendValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YearOverYear {
    pub month: Month,
    pub metric: YoyMetric,
    pub points: Vec<YearPoint>,
    pub changes: Vec<YearChange>,
}

/// Compares one calendar month across every year that has it.
pub fn year_over_year(
    dataset: &PropertyDataset,
    month: Month,
    property_filter: PropertyFilter,
    metric: YoyMetric,
) -> YearOverYear {
    let years: BTreeSet<i32> = dataset
        .all_rows()
        .iter()
        .filter(|r| r.month == Some(month))
        .filter_map(|r| r.year)
        .collect();

    let points: Vec<YearPoint> = years
        .into_iter()
        .map(|year| {
            let properties = dataset
                .properties()
                .filter(|p| property_filter.includes(*p))
                .filter_map(|p| {
                    dataset
                        .rows(p)
                        .iter()
                        .find(|r| r.month == Some(month) && r.year == Some(year))
                        .map(|r| (p, YearFigures::from_row(r, month, year)))
                })
                .collect();
            YearPoint { year, properties }
        })
        .collect();

    let changes = points
        .windows(2)
        .map(|pair| {
            let previous = pair[0].combined(metric);
            let current = pair[1].combined(metric);
            let change = if previous > 0.0 {
                percent_change(current, previous)
            } else {
                TrendValue::Undefined
            };
            YearChange {
                year: pair[1].year,
                previous_year: pair[0].year,
                change,
            }
        })
        .collect();

    YearOverYear {
        month,
        metric,
        points,
        changes,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyPerformance {
    pub month: Month,
    pub avg_nights: f64,
    pub avg_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyPerformance {
    pub property: Property,
    pub totals: PeriodTotals,
    pub avg_nightly_rate: f64,
    pub occupancy_rate: f64,
    pub profit_margin: f64,
    pub revenue_per_day: f64,
    pub monthly: Vec<MonthlyPerformance>,
}

pub fn property_performance(rows: &[NormalizedRow], property: Property) -> PropertyPerformance {
    let own: Vec<NormalizedRow> = rows.iter().filter(|r| r.property == property).copied().collect();
    let totals = PeriodTotals::from_rows(&own);

    let mut by_month: BTreeMap<Month, (PeriodTotals, usize)> = BTreeMap::new();
    for row in &own {
        if let Some(month) = row.month {
            let (month_totals, count) = by_month.entry(month).or_default();
            month_totals.add(row);
            *count += 1;
        }
    }

    let monthly = by_month
        .into_iter()
        .map(|(month, (t, count))| MonthlyPerformance {
            month,
            avg_nights: ratio_or_zero(t.nights as f64, count as f64),
            avg_revenue: ratio_or_zero(t.gross, count as f64),
        })
        .collect();

    PropertyPerformance {
        property,
        totals,
        avg_nightly_rate: ratio_or_zero(totals.gross, totals.nights as f64),
        occupancy_rate: occupancy_rate(&own, 1),
        profit_margin: percent_of(totals.net, totals.gross),
        revenue_per_day: ratio_or_zero(totals.gross, available_nights(&own, 1) as f64),
        monthly,
    }
}

/// Performance of every known property over the whole dataset.
pub fn compare_properties(dataset: &PropertyDataset) -> Vec<PropertyPerformance> {
    let rows = dataset.all_rows();
    Property::ALL
        .into_iter()
        .map(|p| property_performance(&rows, p))
        .collect()
}
