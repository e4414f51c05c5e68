//! Allow-list of identities permitted to sign in to the dashboard.
//!
//! The list lives outside the code, either as a JSON file
//! (`{"allowed_emails": ["a@example.com"]}`) or as a comma-separated
//! environment variable, so granting or revoking access needs no rebuild.

use crate::error::{RentalMetricsError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const ALLOWED_EMAILS_ENV: &str = "ALLOWED_EMAILS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessList {
    #[serde(default, deserialize_with = "deserialize_emails")]
    allowed_emails: BTreeSet<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn deserialize_emails<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(raw
        .iter()
        .map(|e| normalize_email(e))
        .filter(|e| !e.is_empty())
        .collect())
}

impl AccessList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_emails: emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let list = Self::from_json_str(&raw)?;
        info!(
            "Loaded {} allowed identities from {}",
            list.len(),
            path.display()
        );
        Ok(list)
    }

    /// Parses a comma-separated list such as `"a@x.com, b@y.com"`.
    pub fn from_delimited(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Reads [`ALLOWED_EMAILS_ENV`].
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(ALLOWED_EMAILS_ENV).map_err(|_| {
            RentalMetricsError::InvalidConfig(format!("{} is not set", ALLOWED_EMAILS_ENV))
        })?;
        Ok(Self::from_delimited(&raw))
    }

    pub fn len(&self) -> usize {
        self.allowed_emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_emails.is_empty()
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed_emails.contains(&normalize_email(email))
    }

    /// Sign-in decision for the identity reported by the OAuth provider.
    /// An identity without an e-mail address is refused.
    pub fn authorize(&self, email: Option<&str>) -> bool {
        let allowed = email.is_some_and(|e| self.is_allowed(e));
        debug!("Sign-in for {:?}: allowed = {}", email, allowed);
        allowed
    }

    pub fn grant(&mut self, email: &str) -> bool {
        let email = normalize_email(email);
        !email.is_empty() && self.allowed_emails.insert(email)
    }

    pub fn revoke(&mut self, email: &str) -> bool {
        self.allowed_emails.remove(&normalize_email(email))
    }
}
