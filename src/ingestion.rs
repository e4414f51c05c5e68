use crate::error::{RentalMetricsError, Result};
use crate::schema::{
    ExpenseBreakdown, ExpenseCategory, Month, NormalizedRow, Property, PropertyDataset,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MONTH_HEADER: &str = "Month";
pub const YEAR_HEADER: &str = "Year";
pub const NIGHTS_HEADER: &str = "Nights";
pub const GROSS_HEADER: &str = "Gross Income";

/// One sheet row keyed by its (trimmed) column header.
pub type RawRow = HashMap<String, String>;

/// A sheet range as returned by the spreadsheet API: the first row holds the
/// column headers, the remaining rows hold data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Splits a raw value grid into header row and data rows.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut values = values.into_iter();
        let headers = values.next().unwrap_or_default();
        Self {
            headers,
            rows: values.collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Header-keyed view of every data row. Missing trailing cells read as
    /// empty strings; a repeated header keeps its right-most cell.
    pub fn records(&self) -> Vec<RawRow> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let cell = row.get(idx).cloned().unwrap_or_default();
                        (header.trim().to_string(), cell)
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub property: Property,
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

/// Parses a currency-formatted cell such as `"€1,234.50"`.
///
/// Every character other than ASCII digits, `.` and `-` is removed, then the
/// longest leading decimal literal is parsed. Anything unparsable is `0.0`.
pub fn parse_value(cell: &str) -> f64 {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric_prefix(&cleaned)
        .and_then(|literal| literal.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        None
    } else {
        Some(&s[..end])
    }
}

/// Parses the leading integer of a cell (`"12 nights"` is 12). Unparsable
/// cells are 0.
pub fn parse_nights(cell: &str) -> i64 {
    let s = cell.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

fn finite_value(raw: &RawRow, header: &str, row: usize) -> Result<f64> {
    let value = parse_value(cell(raw, header));
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RentalMetricsError::RowRejected {
            row,
            reason: format!("'{}' is not a finite number", header),
        })
    }
}

fn cell<'a>(raw: &'a RawRow, header: &str) -> &'a str {
    raw.get(header).map(String::as_str).unwrap_or("")
}

/// Builds the normalized record for one sheet row. Missing columns read as
/// empty cells and therefore as zero. A negative nights count becomes 0 so
/// the row's income and expenses still count.
pub fn extract_row(property: Property, row: usize, raw: &RawRow) -> Result<NormalizedRow> {
    let gross = finite_value(raw, GROSS_HEADER, row)?;

    let mut expenses = ExpenseBreakdown::default();
    for category in ExpenseCategory::ALL {
        expenses.set(category, finite_value(raw, category.header(), row)?);
    }

    let nights_raw = parse_nights(cell(raw, NIGHTS_HEADER));
    if nights_raw < 0 {
        warn!(
            "Row {} of {}: negative nights count {} read as 0",
            row,
            property.tab_name(),
            nights_raw
        );
    }
    let nights = u32::try_from(nights_raw.max(0)).map_err(|_| RentalMetricsError::RowRejected {
        row,
        reason: format!("nights count {} is out of range", nights_raw),
    })?;

    let month = Month::from_name(cell(raw, MONTH_HEADER));
    let year = cell(raw, YEAR_HEADER).trim().parse::<i32>().ok();

    Ok(NormalizedRow::new(
        property, month, year, nights, gross, expenses,
    ))
}

/// Normalizes header-keyed rows, keeping input order. Rows that fail
/// extraction are logged and left out.
pub fn normalize_records(property: Property, records: &[RawRow]) -> (Vec<NormalizedRow>, IngestReport) {
    let mut rows = Vec::with_capacity(records.len());
    let mut dropped_rows = 0usize;

    for (idx, raw) in records.iter().enumerate() {
        match extract_row(property, idx + 1, raw) {
            Ok(r) => rows.push(r),
            Err(e) => {
                warn!("Dropping row from {}: {}", property.tab_name(), e);
                dropped_rows += 1;
            }
        }
    }

    let report = IngestReport {
        property,
        total_rows: records.len(),
        kept_rows: rows.len(),
        dropped_rows,
    };
    info!(
        "Ingested {}: {} rows kept, {} dropped",
        property.tab_name(),
        report.kept_rows,
        report.dropped_rows
    );

    (rows, report)
}

pub fn normalize_table(property: Property, grid: &SheetGrid) -> (Vec<NormalizedRow>, IngestReport) {
    normalize_records(property, &grid.records())
}

/// Ingests every fetched table into a fresh dataset. Empty tables are
/// skipped and get no report.
pub fn build_dataset<I>(tables: I) -> (PropertyDataset, Vec<IngestReport>)
where
    I: IntoIterator<Item = (Property, SheetGrid)>,
{
    let mut dataset = PropertyDataset::new();
    let mut reports = Vec::new();

    for (property, grid) in tables {
        if grid.is_empty() {
            debug!("Skipping empty table for {}", property.tab_name());
            continue;
        }
        let (rows, report) = normalize_table(property, &grid);
        dataset.insert(property, rows);
        reports.push(report);
    }

    (dataset, reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn booking_grid() -> SheetGrid {
        SheetGrid::from_values(vec![
            strings(&[
                " Month ",
                "Year",
                "Nights",
                "Gross Income",
                "Commissions (Booking, AirBnB)",
                "Property Management",
                "Water",
            ]),
            strings(&["January", "2024", "12", "€1,200.00", "-€180", "-€120", "-20"]),
            strings(&["February", "2024", "9"]),
        ])
    }

    #[test]
    fn test_parse_value_strips_currency_artifacts() {
        assert!((parse_value("€1,234.50") - 1234.50).abs() < 1e-9);
        assert!((parse_value("-€200") + 200.0).abs() < 1e-9);
        assert!((parse_value(" 42 ") - 42.0).abs() < 1e-9);
        assert_eq!(parse_value(""), 0.0);
        assert_eq!(parse_value("N/A"), 0.0);
        assert_eq!(parse_value("-"), 0.0);
    }

    #[test]
    fn test_parse_value_takes_leading_literal() {
        assert!((parse_value("1.2.3") - 1.2).abs() < 1e-9);
        assert!((parse_value("12-5") - 12.0).abs() < 1e-9);
        assert!((parse_value(".5") - 0.5).abs() < 1e-9);
        assert_eq!(parse_value("--5"), 0.0);
    }

    #[test]
    fn test_parse_nights() {
        assert_eq!(parse_nights("12"), 12);
        assert_eq!(parse_nights("  7 nights"), 7);
        assert_eq!(parse_nights("3.9"), 3);
        assert_eq!(parse_nights("-2"), -2);
        assert_eq!(parse_nights(""), 0);
        assert_eq!(parse_nights("n/a"), 0);
    }

    #[test]
    fn test_grid_records_trim_headers_and_pad_cells() {
        let records = booking_grid().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Month").map(String::as_str), Some("January"));
        assert_eq!(records[1].get("Gross Income").map(String::as_str), Some(""));
    }

    #[test]
    fn test_normalize_table() {
        let (rows, report) = normalize_table(Property::Lovely, &booking_grid());
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.kept_rows, 2);
        assert_eq!(report.dropped_rows, 0);

        let jan = &rows[0];
        assert_eq!(jan.month, Some(Month::January));
        assert_eq!(jan.year, Some(2024));
        assert_eq!(jan.nights, 12);
        assert!((jan.gross - 1200.0).abs() < 1e-9);
        assert!((jan.expenses.commissions + 180.0).abs() < 1e-9);
        assert_eq!(jan.expenses.internet, 0.0);
        assert!((jan.net - 880.0).abs() < 1e-9);

        let feb = &rows[1];
        assert_eq!(feb.month, Some(Month::February));
        assert_eq!(feb.gross, 0.0);
        assert_eq!(feb.net, 0.0);
    }

    #[test]
    fn test_missing_columns_read_as_zero() {
        let grid = SheetGrid::from_values(vec![
            strings(&["Mese", "Anno", "Notti"]),
            strings(&["Gennaio", "2024", "5"]),
        ]);
        let (rows, report) = normalize_table(Property::Relaxing, &grid);
        assert_eq!(report.kept_rows, 1);
        assert_eq!(rows[0].month, None);
        assert_eq!(rows[0].year, None);
        assert_eq!(rows[0].nights, 0);
        assert_eq!(rows[0].gross, 0.0);
    }

    #[test]
    fn test_bad_rows_are_dropped_not_fatal() {
        let huge = "9".repeat(400);
        let grid = SheetGrid::from_values(vec![
            strings(&["Month", "Year", "Nights", "Gross Income"]),
            strings(&["March", "2023", "4", "400"]),
            strings(&["April", "2023", "99999999999", "100"]),
            strings(&["May", "2023", "2", &huge]),
            strings(&["June", "2023", "6", "600"]),
        ]);
        let (rows, report) = normalize_table(Property::Lovely, &grid);
        assert_eq!(report.dropped_rows, 2);
        assert_eq!(
            rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            vec![Some(Month::March), Some(Month::June)]
        );
    }

    #[test]
    fn test_negative_nights_keep_the_row() {
        let grid = SheetGrid::from_values(vec![
            strings(&["Month", "Year", "Nights", "Gross Income", "Water"]),
            strings(&["April", "2023", "-1", "€500.00", "-20"]),
        ]);
        let (rows, report) = normalize_table(Property::Lovely, &grid);
        assert_eq!(report.dropped_rows, 0);
        assert_eq!(rows[0].nights, 0);
        assert_eq!(rows[0].gross, 500.0);
        assert_eq!(rows[0].net, 480.0);
    }

    #[test]
    fn test_build_dataset_skips_empty_tables() {
        let (dataset, reports) = build_dataset(vec![
            (Property::Lovely, booking_grid()),
            (Property::Relaxing, SheetGrid::default()),
        ]);
        assert_eq!(reports.len(), 1);
        assert_eq!(dataset.rows(Property::Lovely).len(), 2);
        assert!(dataset.rows(Property::Relaxing).is_empty());
    }
}
