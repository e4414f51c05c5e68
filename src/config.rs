use crate::access::AccessList;
use crate::error::{RentalMetricsError, Result};
use crate::schema::Property;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const SHEET_ID_ENV: &str = "GOOGLE_SHEET_ID";
pub const ACCESS_LIST_PATH_ENV: &str = "ALLOWED_EMAILS_FILE";
pub const DEFAULT_RANGE: &str = "A1:Z50";

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

fn default_tabs() -> Vec<TabSource> {
    Property::ALL.into_iter().map(TabSource::new).collect()
}

/// One spreadsheet tab holding the booking history of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSource {
    pub property: Property,
    pub tab: String,
    #[serde(default = "default_range")]
    pub range: String,
}

impl TabSource {
    pub fn new(property: Property) -> Self {
        Self {
            property,
            tab: property.tab_name().to_string(),
            range: default_range(),
        }
    }

    /// A1 notation including the tab, e.g. `Lovely!A1:Z50`.
    pub fn a1_range(&self) -> String {
        format!("{}!{}", self.tab, self.range)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub spreadsheet_id: String,

    #[serde(default = "default_tabs")]
    pub tabs: Vec<TabSource>,

    #[serde(default)]
    pub access_list_path: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            tabs: default_tabs(),
            access_list_path: None,
        }
    }

    pub fn with_access_list_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.access_list_path = Some(path.into());
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Builds the default two-tab configuration from [`SHEET_ID_ENV`] and the
    /// optional [`ACCESS_LIST_PATH_ENV`].
    pub fn from_env() -> Result<Self> {
        let spreadsheet_id = std::env::var(SHEET_ID_ENV).map_err(|_| {
            RentalMetricsError::InvalidConfig(format!("{} is not set", SHEET_ID_ENV))
        })?;
        let mut config = Self::new(spreadsheet_id);
        config.access_list_path = std::env::var_os(ACCESS_LIST_PATH_ENV).map(PathBuf::from);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(RentalMetricsError::InvalidConfig(
                "spreadsheet_id must not be empty".to_string(),
            ));
        }

        if self.tabs.is_empty() {
            return Err(RentalMetricsError::InvalidConfig(
                "at least one sheet tab must be configured".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for tab in &self.tabs {
            if !seen.insert(tab.property) {
                return Err(RentalMetricsError::InvalidConfig(format!(
                    "property {} is mapped to more than one tab",
                    tab.property
                )));
            }
            if tab.tab.trim().is_empty() || tab.range.trim().is_empty() {
                return Err(RentalMetricsError::InvalidConfig(format!(
                    "tab and range for {} must not be empty",
                    tab.property
                )));
            }
        }

        Ok(())
    }

    /// Loads the allow-list from the configured file, falling back to the
    /// `ALLOWED_EMAILS` environment variable.
    pub fn load_access_list(&self) -> Result<AccessList> {
        match &self.access_list_path {
            Some(path) => AccessList::from_json_file(path),
            None => AccessList::from_env(),
        }
    }
}
