use std::{fs::File, io::Read, path::Path};

use chrono::TimeDelta;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{LibraryError, Result},
    loan::DEFAULT_LOAN_PERIOD_DAYS,
};

/// Suffix appended to an identifier when a book is duplicated
pub const DEFAULT_COPY_SUFFIX: &str = "_copy";

/// Tunables for a library instance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Days between borrowing and the due date
    pub loan_period_days: i64,
    /// Appended to the source id to name a duplicated book
    pub copy_suffix: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl LibraryConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Config` if the JSON is malformed, carries an
    /// unknown key, or fails [`LibraryConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LibraryError::Config(format!("Failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Config` if:
    /// - The file does not exist
    /// - The file cannot be opened
    /// - The file cannot be read
    /// - The contents are rejected by [`LibraryConfig::from_json_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("CONFIG: loading configuration from {}", path.display());

        if !path.exists() {
            return Err(LibraryError::Config(format!("File does not exist: {}", path.display())));
        }

        let mut file = File::open(path)
            .map_err(|e| LibraryError::Config(format!("Failed to open file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| LibraryError::Config(format!("Failed to read file: {e}")))?;

        Self::from_json_str(&contents)
    }

    /// Check the values make sense
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Config` if the loan period is not a positive
    /// number of days that fits a `TimeDelta`, or the copy suffix is empty.
    pub fn validate(&self) -> Result<()> {
        self.loan_period()?;
        if self.copy_suffix.is_empty() {
            return Err(LibraryError::Config("copy_suffix cannot be empty".to_string()));
        }
        Ok(())
    }

    /// The loan period as a duration
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Config` if `loan_period_days` is below one
    /// or too large to represent.
    pub fn loan_period(&self) -> Result<TimeDelta> {
        let days = self.loan_period_days;
        if days < 1 {
            return Err(LibraryError::Config(format!(
                "loan_period_days must be at least 1, got {days}"
            )));
        }
        TimeDelta::try_days(days)
            .ok_or_else(|| LibraryError::Config(format!("loan_period_days is too large: {days}")))
    }
}
