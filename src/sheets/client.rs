use crate::config::{DashboardConfig, TabSource};
use crate::error::{RentalMetricsError, Result};
use crate::ingestion::{build_dataset, IngestReport, SheetGrid};
use crate::schema::PropertyDataset;
use crate::sheets::types::{SheetsAuth, ValueRange};
use log::{debug, info};
use reqwest::Client;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Read-only client for the values endpoint of the spreadsheet API.
#[derive(Clone, Debug)]
pub struct SheetsClient {
    client: Client,
    auth: SheetsAuth,
    base_url: String,
}

impl SheetsClient {
    pub fn new(auth: SheetsAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(SheetsAuth::ApiKey(api_key.into()))
    }

    /// Uses the OAuth access token of the signed-in user.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(SheetsAuth::BearerToken(token.into()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn values_url(&self, spreadsheet_id: &str, tab: &TabSource) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            spreadsheet_id,
            tab.a1_range()
        )
    }

    pub async fn fetch_values(&self, spreadsheet_id: &str, tab: &TabSource) -> Result<ValueRange> {
        let url = self.values_url(spreadsheet_id, tab);
        debug!("Fetching {} for {}", tab.a1_range(), tab.property);

        let request = self.client.get(&url).query(&[("majorDimension", "ROWS")]);
        let request = match &self.auth {
            SheetsAuth::ApiKey(key) => request.query(&[("key", key.as_str())]),
            SheetsAuth::BearerToken(token) => request.bearer_auth(token),
        };

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await?;
            return Err(RentalMetricsError::FetchFailed(format!(
                "{} (status {}): {}",
                tab.tab, status, error_text
            )));
        }

        Ok(res.json().await?)
    }

    pub async fn fetch_grid(&self, spreadsheet_id: &str, tab: &TabSource) -> Result<SheetGrid> {
        Ok(self.fetch_values(spreadsheet_id, tab).await?.into_grid())
    }

    /// Fetches every configured tab in order and ingests them into one
    /// dataset. Any failed request aborts the whole load.
    pub async fn fetch_dataset(
        &self,
        config: &DashboardConfig,
    ) -> Result<(PropertyDataset, Vec<IngestReport>)> {
        config.validate()?;

        let mut tables = Vec::with_capacity(config.tabs.len());
        for tab in &config.tabs {
            let grid = self.fetch_grid(&config.spreadsheet_id, tab).await?;
            tables.push((tab.property, grid));
        }

        let (dataset, reports) = build_dataset(tables);
        info!(
            "Loaded {} rows across {} tables from spreadsheet {}",
            dataset.len(),
            reports.len(),
            config.spreadsheet_id
        );
        Ok((dataset, reports))
    }
}
