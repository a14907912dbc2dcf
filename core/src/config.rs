//! Client configuration.
//!
//! Defaults match a bare `Rfetch::new`: no origin (relative URLs are
//! rejected) and duplicate-key query serialization.

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::types::Delimiter;

pub const ORIGIN_VAR: &str = "RFETCH_ORIGIN";
pub const DELIMITER_VAR: &str = "RFETCH_DELIMITER";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base that `/`-prefixed request paths resolve against.
    pub origin: Option<Url>,
    pub delimiter: Delimiter,
}

impl ClientConfig {
    /// Read `RFETCH_ORIGIN` and `RFETCH_DELIMITER`; unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(origin) = lookup(ORIGIN_VAR) {
            config.origin = Some(Url::parse(&origin)?);
        }
        if let Some(delimiter) = lookup(DELIMITER_VAR) {
            config.delimiter = delimiter.parse()?;
        }
        Ok(config)
    }

    pub fn origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }
}
