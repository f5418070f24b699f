use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

use crate::chart::ChartType;
use crate::parse::ParseOptions;

/// Runtime knobs for a [`crate::Workspace`]. Every field has a default, so an empty YAML
/// document is a valid settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Delay before a scheduled normalization runs. New input arriving inside the window
    /// cancels the pending run.
    pub debounce_ms: u64,
    pub parse: ParseSettings,
    pub chart: ChartDefaults,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseSettings {
    /// Fixed field delimiter. Detected from the first line when unset.
    pub delimiter: Option<char>,
}

/// Values merged into every freshly inferred chart configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartDefaults {
    pub title: String,
    pub chart_type: ChartType,
    pub smooth: bool,
    pub stack: bool,
    pub area: bool,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            title: "Data Visualization".to_string(),
            chart_type: ChartType::Line,
            smooth: true,
            stack: false,
            area: false,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            serde_yaml::from_str(text).context("Failed to parse settings YAML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&text)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            // validate() guarantees an ASCII delimiter
            delimiter: self.parse.delimiter.map(|c| c as u8),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(d) = self.parse.delimiter {
            if !d.is_ascii() {
                anyhow::bail!("delimiter {:?} must be a single ASCII character", d);
            }
        }
        Ok(())
    }
}
