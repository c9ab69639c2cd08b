use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

/// Driver settings read from a YAML file; every key is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print each expression tree before lowering
    pub dump_tree: bool,
    /// Emit the IR as YAML instead of text
    pub yaml: bool,
    /// Colored diagnostics and listings
    pub color: bool,
    /// Tracing filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dump_tree: false,
            yaml: false,
            color: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let file = File::open(path)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Log level after `-v` flags: each one raises it a step
    pub fn level(&self, verbose: u8) -> String {
        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        let base = LEVELS
            .iter()
            .position(|level| level.eq_ignore_ascii_case(&self.log_level))
            .unwrap_or(1);
        let idx = (base + verbose as usize).min(LEVELS.len() - 1);
        LEVELS[idx].to_string()
    }
}
