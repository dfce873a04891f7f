use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::err::Denial;

pub(crate) const DEFAULT_LEVEL: &str = "TRY";

const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// Lenient view over one raw license record. A field of the wrong JSON type
/// reads as absent; the raw map stays available as the user-tier parameter
/// source for the cascade.
#[derive(Debug, Clone, Default)]
pub struct LicenseRecord {
    params: Map<String, Value>,
}

impl LicenseRecord {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|record| Self {
            params: record.clone(),
        })
    }

    pub fn level(&self) -> String {
        self.params
            .get("level")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LEVEL)
            .to_string()
    }

    /// Only a literal JSON `true` counts as active.
    pub fn is_active(&self) -> bool {
        self.params.get("active").and_then(Value::as_bool) == Some(true)
    }

    pub fn expires(&self) -> Option<&str> {
        self.params
            .get("expires")
            .and_then(Value::as_str)
            .filter(|expires| !expires.is_empty())
    }

    pub(crate) fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Active/expiry evaluation. An active license grants regardless of any
    /// expiry value; otherwise the expiry date decides, strictly: a license
    /// is valid through its expiry day.
    pub(crate) fn evaluate(&self, today: NaiveDate) -> Result<String, Denial> {
        if self.is_active() {
            return Ok(self.level());
        }

        let expires = self.expires().ok_or(Denial::LicenseInactive)?;
        let expires_on = NaiveDate::parse_from_str(expires, EXPIRY_FORMAT)
            .map_err(|_| Denial::MalformedExpiry(expires.to_string()))?;

        if today > expires_on {
            return Err(Denial::LicenseExpired(expires_on));
        }

        Ok(self.level())
    }

    pub(crate) fn days_left(&self, today: NaiveDate) -> Option<i64> {
        let expires_on = NaiveDate::parse_from_str(self.expires()?, EXPIRY_FORMAT).ok()?;
        Some((expires_on - today).num_days())
    }
}
