use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_DISPLAY_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("Invalid date/time {value:?}, expected a value like {example:?}")]
    Unparseable { value: String, example: String },

    #[error("Date/time format {format:?} doesn't round-trip")]
    LossyFormat { format: String },
}

/// Conversion between the backend's storage representation of datetime columns and the
/// human-readable form shown in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormat {
    pub storage: String,
    pub display: String,
}

impl Default for DateTimeFormat {
    fn default() -> Self {
        Self {
            storage: DEFAULT_STORAGE_FORMAT.to_string(),
            display: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

impl DateTimeFormat {
    pub fn new(storage: &str, display: &str) -> Self {
        Self {
            storage: storage.to_string(),
            display: display.to_string(),
        }
    }

    /// Check that a storage value survives storage -> display -> storage
    pub fn validate(&self) -> Result<(), DateTimeError> {
        let sample = NaiveDateTime::parse_from_str("2001-02-03 16:05:06", "%Y-%m-%d %H:%M:%S")
            .map_err(|_| DateTimeError::LossyFormat {
                format: self.storage.clone(),
            })?;

        for format in [&self.storage, &self.display] {
            let rendered = sample.format(format).to_string();
            match NaiveDateTime::parse_from_str(&rendered, format) {
                Ok(parsed) if parsed == sample => {}
                _ => {
                    return Err(DateTimeError::LossyFormat {
                        format: format.clone(),
                    })
                }
            }
        }

        Ok(())
    }

    /// Storage -> display. Null/empty values and values not in storage format are left alone.
    pub fn format(&self, value: &Value) -> Value {
        let Some(raw) = value.as_str().filter(|s| !s.is_empty()) else {
            return value.clone();
        };

        match NaiveDateTime::parse_from_str(raw, &self.storage) {
            Ok(parsed) => Value::String(parsed.format(&self.display).to_string()),
            Err(e) => {
                warn!("Leaving unrecognised date/time {raw:?} as is: {e}");
                value.clone()
            }
        }
    }

    /// Display -> storage. A value already in storage format is passed through untouched.
    pub fn unformat(&self, value: &Value) -> Result<Value, DateTimeError> {
        let Some(raw) = value.as_str().filter(|s| !s.trim().is_empty()) else {
            return Ok(match value {
                Value::String(_) => Value::Null,
                other => other.clone(),
            });
        };
        let raw = raw.trim();

        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, &self.display) {
            return Ok(Value::String(parsed.format(&self.storage).to_string()));
        }

        if NaiveDateTime::parse_from_str(raw, &self.storage).is_ok() {
            return Ok(Value::String(raw.to_string()));
        }

        Err(DateTimeError::Unparseable {
            value: raw.to_string(),
            example: self.example(),
        })
    }

    fn example(&self) -> String {
        NaiveDateTime::parse_from_str("2024-01-31 13:45:00", "%Y-%m-%d %H:%M:%S")
            .map(|d| d.format(&self.display).to_string())
            .unwrap_or_default()
    }
}
