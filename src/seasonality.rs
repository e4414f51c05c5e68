use crate::buckets::{Bucket, PeriodTotals};
use crate::metrics::occupancy_rate;
use crate::schema::{Month, NormalizedRow, Property, PropertyFilter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    pub fn months(&self) -> [Month; 3] {
        match self {
            Season::Winter => [Month::December, Month::January, Month::February],
            Season::Spring => [Month::March, Month::April, Month::May],
            Season::Summer => [Month::June, Month::July, Month::August],
            Season::Fall => [Month::September, Month::October, Month::November],
        }
    }

    pub fn of(month: Month) -> Season {
        match month {
            Month::December | Month::January | Month::February => Season::Winter,
            Month::March | Month::April | Month::May => Season::Spring,
            Month::June | Month::July | Month::August => Season::Summer,
            Month::September | Month::October | Month::November => Season::Fall,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonBucket {
    pub season: Season,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub occupancy_rate: f64,
    pub by_property: BTreeMap<Property, PeriodTotals>,
}

impl Bucket for SeasonBucket {
    fn totals(&self) -> &PeriodTotals {
        &self.totals
    }

    fn occupancy_rate(&self) -> f64 {
        self.occupancy_rate
    }
}

/// Always four buckets, Winter to Fall. Seasons without rows are zero-filled.
/// Winter groups December with the January and February of the same year
/// value, so callers usually pass a single year's rows.
pub fn group_by_season(rows: &[NormalizedRow], property_filter: PropertyFilter) -> Vec<SeasonBucket> {
    let mut groups: BTreeMap<Season, Vec<NormalizedRow>> =
        Season::ALL.into_iter().map(|s| (s, Vec::new())).collect();

    for row in rows {
        if let Some(month) = row.month {
            groups.entry(Season::of(month)).or_default().push(*row);
        }
    }

    groups
        .into_iter()
        .map(|(season, members)| {
            let mut by_property: BTreeMap<Property, PeriodTotals> = BTreeMap::new();
            for row in &members {
                by_property.entry(row.property).or_default().add(row);
            }
            SeasonBucket {
                season,
                totals: PeriodTotals::from_rows(&members),
                occupancy_rate: occupancy_rate(&members, property_filter.multiplier()),
                by_property,
            }
        })
        .collect()
}
