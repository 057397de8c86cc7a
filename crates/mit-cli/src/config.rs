use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

/// Settings read from `--config`. Command-line flags take precedence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Export directory used when `--source` is not given.
    pub source: Option<PathBuf>,
    /// Alternate RN template table.
    pub templates: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
