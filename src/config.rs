use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{logging::Verbosity, sanitizers::PatternKind};

pub const CONFIG_FILE: &str = "simple_search.toml";
pub const ENV_PREFIX: &str = "SIMPLE_SEARCH_";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "defaults::default_pattern")]
    pub default_pattern: PatternKind,

    #[serde(default)]
    pub escape_wildcards: bool,

    #[serde(default = "defaults::verbosity")]
    pub verbosity: Verbosity,

    // no file logging unless asked for
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_pattern: defaults::default_pattern(),
            escape_wildcards: false,
            verbosity: defaults::verbosity(),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads `simple_search.toml` from the working directory, then
    /// `SIMPLE_SEARCH_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    // merge semantic: bottom overrides top
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

// #[serde(default = "path")] only takes functions, not values
mod defaults {
    use crate::{logging::Verbosity, sanitizers::PatternKind};

    pub const fn default_pattern() -> PatternKind {
        PatternKind::Containing
    }

    pub const fn verbosity() -> Verbosity {
        Verbosity::Normal
    }
}
