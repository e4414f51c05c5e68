use crate::ingestion::SheetGrid;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a `spreadsheets.values.get` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cells come back as formatted strings, but unformatted renders may
    /// carry numbers or booleans; everything is read as text.
    pub fn into_grid(self) -> SheetGrid {
        let values = self
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        SheetGrid::from_values(values)
    }
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// How requests to the spreadsheet API are authorized.
#[derive(Clone)]
pub enum SheetsAuth {
    ApiKey(String),
    BearerToken(String),
}

impl std::fmt::Debug for SheetsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsAuth::ApiKey(_) => f.write_str("ApiKey(***)"),
            SheetsAuth::BearerToken(_) => f.write_str("BearerToken(***)"),
        }
    }
}
