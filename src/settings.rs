// config lets you read a separate config file
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Filter directives for the log output, e.g. `info` or `infoapi=trace`.
    pub log_filter: String,
    /// Whether the binary registers the infos shipped with this crate.
    pub register_builtins: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: String::from("info"),
            register_builtins: true,
        }
    }
}

impl Settings {
    pub const DEFAULT_FILE: &'static str = "infoapi.toml";

    pub fn load() -> Result<Self> {
        Self::from_file(Self::DEFAULT_FILE)
    }

    /// Reads `path` if it exists, then `INFOAPI_*` environment variables on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("INFOAPI"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
