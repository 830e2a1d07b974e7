use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coverage::CoverageStyle;

pub const CONFIG_FILE: &str = "jacoco2csv.toml";
pub const DEFAULT_INPUT: &str = "jacoco.xml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Report read when no path is given on the command line
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Write CSV here instead of stdout
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub style: CoverageStyle,
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: default_input(),
            output: None,
            style: CoverageStyle::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            anyhow::bail!("'input' must not be empty");
        }
        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                anyhow::bail!("'output' must not be empty");
            }
        }
        Ok(())
    }
}
