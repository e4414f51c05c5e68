use crate::error::{RentalMetricsError, Result};
use crate::utils::{days_in_month, first_of_month, sum_or_zero};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const LOVELY_TAB: &str = "Nuno Gomez Piano uno - Lovely";
pub const RELAXING_TAB: &str = "Nuno Gomez Piano terra - Relaxing";

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum Property {
    #[schemars(description = "First-floor apartment, sheet tab 'Nuno Gomez Piano uno - Lovely'")]
    Lovely,

    #[schemars(description = "Ground-floor apartment, sheet tab 'Nuno Gomez Piano terra - Relaxing'")]
    Relaxing,
}

impl Property {
    pub const ALL: [Property; 2] = [Property::Lovely, Property::Relaxing];

    pub fn short_name(&self) -> &'static str {
        match self {
            Property::Lovely => "Lovely",
            Property::Relaxing => "Relaxing",
        }
    }

    pub fn tab_name(&self) -> &'static str {
        match self {
            Property::Lovely => LOVELY_TAB,
            Property::Relaxing => RELAXING_TAB,
        }
    }

    /// Resolves a spreadsheet tab name to its property by looking for the
    /// property's short name inside the tab name.
    pub fn from_tab_name(tab: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| tab.contains(p.short_name()))
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Calendar number, 1 = January.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        if (1..=12).contains(&number) {
            Some(Self::ALL[(number - 1) as usize])
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Parses an English month name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    pub fn days_in(&self, year: i32) -> u32 {
        days_in_month(year, self.number())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Commissions,
    Management,
    Internet,
    Electricity,
    Water,
    Condominio,
    Extra,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Commissions,
        ExpenseCategory::Management,
        ExpenseCategory::Internet,
        ExpenseCategory::Electricity,
        ExpenseCategory::Water,
        ExpenseCategory::Condominio,
        ExpenseCategory::Extra,
    ];

    /// Column header used for this category in the booking sheet.
    pub fn header(&self) -> &'static str {
        match self {
            ExpenseCategory::Commissions => "Commissions (Booking, AirBnB)",
            ExpenseCategory::Management => "Property Management",
            ExpenseCategory::Internet => "Internet",
            ExpenseCategory::Electricity => "Electricity",
            ExpenseCategory::Water => "Water",
            ExpenseCategory::Condominio => "Condominio",
            ExpenseCategory::Extra => "Extra",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Commissions => "Commissions",
            ExpenseCategory::Management => "Management",
            ExpenseCategory::Internet => "Internet",
            ExpenseCategory::Electricity => "Electricity",
            ExpenseCategory::Water => "Water",
            ExpenseCategory::Condominio => "Condominio",
            ExpenseCategory::Extra => "Extra",
        }
    }
}

/// Itemized expenses for one property-month. Values keep the sign they had
/// in the sheet, where costs are normally entered as negative amounts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ExpenseBreakdown {
    #[serde(default)]
    pub commissions: f64,
    #[serde(default)]
    pub management: f64,
    #[serde(default)]
    pub internet: f64,
    #[serde(default)]
    pub electricity: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub condominio: f64,
    #[serde(default)]
    pub extra: f64,
}

impl ExpenseBreakdown {
    pub fn get(&self, category: ExpenseCategory) -> f64 {
        match category {
            ExpenseCategory::Commissions => self.commissions,
            ExpenseCategory::Management => self.management,
            ExpenseCategory::Internet => self.internet,
            ExpenseCategory::Electricity => self.electricity,
            ExpenseCategory::Water => self.water,
            ExpenseCategory::Condominio => self.condominio,
            ExpenseCategory::Extra => self.extra,
        }
    }

    pub fn set(&mut self, category: ExpenseCategory, value: f64) {
        let slot = match category {
            ExpenseCategory::Commissions => &mut self.commissions,
            ExpenseCategory::Management => &mut self.management,
            ExpenseCategory::Internet => &mut self.internet,
            ExpenseCategory::Electricity => &mut self.electricity,
            ExpenseCategory::Water => &mut self.water,
            ExpenseCategory::Condominio => &mut self.condominio,
            ExpenseCategory::Extra => &mut self.extra,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpenseCategory, f64)> + '_ {
        ExpenseCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Signed sum of every category.
    pub fn total(&self) -> f64 {
        sum_or_zero(self.iter().map(|(_, v)| v))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NormalizedRow {
    pub property: Property,

    #[schemars(description = "Calendar month of the row, absent when the sheet cell is not a month name")]
    pub month: Option<Month>,

    #[schemars(description = "Calendar year of the row, absent when the sheet cell is not an integer")]
    pub year: Option<i32>,

    pub nights: u32,

    pub gross: f64,

    #[schemars(description = "Gross plus the signed expense total, fixed when the row is built")]
    pub net: f64,

    #[serde(flatten)]
    pub expenses: ExpenseBreakdown,
}

impl NormalizedRow {
    pub fn new(
        property: Property,
        month: Option<Month>,
        year: Option<i32>,
        nights: u32,
        gross: f64,
        expenses: ExpenseBreakdown,
    ) -> Self {
        Self {
            property,
            month,
            year,
            nights,
            gross,
            net: gross + expenses.total(),
            expenses,
        }
    }

    /// The (year, month) pair when both are known.
    pub fn period(&self) -> Option<(i32, Month)> {
        Some((self.year?, self.month?))
    }

    /// First day of the row's month, used to order rows in time.
    pub fn date(&self) -> Option<NaiveDate> {
        let (year, month) = self.period()?;
        first_of_month(year, month.number())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "mode", content = "property", rename_all = "snake_case")]
pub enum PropertyFilter {
    #[default]
    Both,
    Only(Property),
}

impl PropertyFilter {
    pub fn includes(&self, property: Property) -> bool {
        match self {
            PropertyFilter::Both => true,
            PropertyFilter::Only(p) => *p == property,
        }
    }

    /// Number of properties whose nights are available in each calendar day.
    pub fn multiplier(&self) -> u32 {
        match self {
            PropertyFilter::Both => Property::ALL.len() as u32,
            PropertyFilter::Only(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(tag = "mode", content = "year", rename_all = "snake_case")]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl YearFilter {
    pub fn includes(&self, year: Option<i32>) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => year == Some(*y),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct DashboardFilter {
    pub property: PropertyFilter,
    pub year: YearFilter,
}

impl DashboardFilter {
    pub fn new(property: PropertyFilter, year: YearFilter) -> Self {
        Self { property, year }
    }
}

/// Rows of both properties as fetched in one pass over the spreadsheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDataset {
    tables: BTreeMap<Property, Vec<NormalizedRow>>,
}

impl PropertyDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rows of a property. Rows keep their order.
    pub fn insert(&mut self, property: Property, rows: Vec<NormalizedRow>) {
        self.tables.insert(property, rows);
    }

    pub fn rows(&self, property: Property) -> &[NormalizedRow] {
        self.tables.get(&property).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.tables.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// All rows of the selected properties, property by property.
    pub fn by_property(&self, filter: PropertyFilter) -> Vec<NormalizedRow> {
        self.tables
            .iter()
            .filter(|(p, _)| filter.includes(**p))
            .flat_map(|(_, rows)| rows.iter().copied())
            .collect()
    }

    pub fn filtered(&self, filter: &DashboardFilter) -> Vec<NormalizedRow> {
        self.by_property(filter.property)
            .into_iter()
            .filter(|r| filter.year.includes(r.year))
            .collect()
    }

    pub fn all_rows(&self) -> Vec<NormalizedRow> {
        self.by_property(PropertyFilter::Both)
    }

    pub fn available_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .tables
            .values()
            .flatten()
            .filter_map(|r| r.year)
            .collect();
        years.into_iter().collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.available_years().last().copied()
    }

    /// Feed shape served to the dashboard: rows keyed by sheet tab name.
    pub fn to_payload(&self) -> DatasetPayload {
        DatasetPayload {
            data: self
                .tables
                .iter()
                .map(|(p, rows)| (p.tab_name().to_string(), rows.clone()))
                .collect(),
        }
    }

    pub fn from_payload(payload: DatasetPayload) -> Result<Self> {
        let mut dataset = Self::new();
        for (tab, rows) in payload.data {
            let property = Property::from_tab_name(&tab)
                .ok_or_else(|| RentalMetricsError::UnknownProperty(tab.clone()))?;
            let rows = rows
                .into_iter()
                .map(|row| NormalizedRow { property, ..row })
                .collect();
            dataset.insert(property, rows);
        }
        Ok(dataset)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatasetPayload {
    #[schemars(description = "Normalized rows keyed by spreadsheet tab name")]
    pub data: BTreeMap<String, Vec<NormalizedRow>>,
}

impl DatasetPayload {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DatasetPayload)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
