use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADER_SELECTOR: &str = "header";
pub const DEFAULT_BANNER_SELECTOR: &str = ".login-banner-wrapper";
pub const DEFAULT_PROPERTY: &str = "--header-height";
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selector of the element whose height is published
    pub header_selector: String,

    /// Selector of the banner stacked under the header. `None` publishes the header height only
    pub banner_selector: Option<String>,

    /// Custom property written on the document root
    pub property: String,

    /// Quiet period after the last resize before recomputing
    pub debounce_ms: u64,

    /// Recompute immediately when the header or banner mutates
    pub observe_mutations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_selector: DEFAULT_HEADER_SELECTOR.to_string(),
            banner_selector: Some(DEFAULT_BANNER_SELECTOR.to_string()),
            property: DEFAULT_PROPERTY.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            observe_mutations: true,
        }
    }
}

impl Settings {
    /// Parses settings from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`SettingsError::Json`] for malformed input.
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn with_header_selector(mut self, selector: impl Into<String>) -> Self {
        self.header_selector = selector.into();
        self
    }

    pub fn with_banner_selector(mut self, selector: Option<impl Into<String>>) -> Self {
        self.banner_selector = selector.map(Into::into);
        self
    }

    pub fn without_banner(mut self) -> Self {
        self.banner_selector = None;
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_observe_mutations(mut self, observe: bool) -> Self {
        self.observe_mutations = observe;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
