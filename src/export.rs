use crate::buckets::{Bucket, MonthlyBucket, YearlyBucket};
use crate::error::Result;
use crate::schema::NormalizedRow;
use crate::seasonality::SeasonBucket;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flat CSV record of one normalized row, headed like the booking sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Property")]
    pub property: &'static str,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Nights")]
    pub nights: u32,
    #[serde(rename = "Gross Income")]
    pub gross: f64,
    #[serde(rename = "Net Income")]
    pub net: f64,
    #[serde(rename = "Commissions (Booking, AirBnB)")]
    pub commissions: f64,
    #[serde(rename = "Property Management")]
    pub management: f64,
    #[serde(rename = "Internet")]
    pub internet: f64,
    #[serde(rename = "Electricity")]
    pub electricity: f64,
    #[serde(rename = "Water")]
    pub water: f64,
    #[serde(rename = "Condominio")]
    pub condominio: f64,
    #[serde(rename = "Extra")]
    pub extra: f64,
}

impl From<&NormalizedRow> for ExportRow {
    fn from(row: &NormalizedRow) -> Self {
        Self {
            property: row.property.tab_name(),
            month: row.month.map(|m| m.name().to_string()).unwrap_or_default(),
            year: row.year.map(|y| y.to_string()).unwrap_or_default(),
            nights: row.nights,
            gross: row.gross,
            net: row.net,
            commissions: row.expenses.commissions,
            management: row.expenses.management,
            internet: row.expenses.internet,
            electricity: row.expenses.electricity,
            water: row.expenses.water,
            condominio: row.expenses.condominio,
            extra: row.expenses.extra,
        }
    }
}

/// One bucket of a monthly, yearly or seasonal table. Bucket types nest
/// their totals, which the CSV writer cannot flatten, so they go through
/// this record instead.
#[derive(Debug, Clone, Serialize)]
pub struct BucketRow {
    pub period: String,
    pub gross: f64,
    pub net: f64,
    pub nights: u64,
    pub occupancy_rate: f64,
}

impl BucketRow {
    fn from_bucket<B: Bucket>(period: String, bucket: &B) -> Self {
        let totals = bucket.totals();
        Self {
            period,
            gross: totals.gross,
            net: totals.net,
            nights: totals.nights,
            occupancy_rate: bucket.occupancy_rate(),
        }
    }
}

impl From<&MonthlyBucket> for BucketRow {
    fn from(bucket: &MonthlyBucket) -> Self {
        Self::from_bucket(bucket.period.clone(), bucket)
    }
}

impl From<&YearlyBucket> for BucketRow {
    fn from(bucket: &YearlyBucket) -> Self {
        Self::from_bucket(bucket.year.to_string(), bucket)
    }
}

impl From<&SeasonBucket> for BucketRow {
    fn from(bucket: &SeasonBucket) -> Self {
        Self::from_bucket(bucket.season.to_string(), bucket)
    }
}

/// Writes any flat serializable records as CSV with a header row.
pub fn write_csv<T: Serialize, W: Write>(writer: W, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rows_csv<W: Write>(writer: W, rows: &[NormalizedRow]) -> Result<()> {
    let records: Vec<ExportRow> = rows.iter().map(ExportRow::from).collect();
    write_csv(writer, &records)
}

pub fn write_buckets_csv<'a, B, W>(writer: W, buckets: &'a [B]) -> Result<()>
where
    B: 'a,
    BucketRow: From<&'a B>,
    W: Write,
{
    let records: Vec<BucketRow> = buckets.iter().map(BucketRow::from).collect();
    write_csv(writer, &records)
}

pub fn write_csv_file<T: Serialize, P: AsRef<Path>>(path: P, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    write_csv(file, records)
}

pub fn rows_to_csv_string(rows: &[NormalizedRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_rows_csv(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
