// src/chart/types.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ConfigFieldError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ConfigFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            other => Err(ConfigFieldError::InvalidValue {
                field: "chartType",
                value: other.to_string(),
                expected: "one of `line`, `bar`",
            }),
        }
    }
}

/// What the chart renderer is asked to draw. Keys refer to column accessor keys and are not
/// guaranteed to exist on the current rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub x_axis: String,
    pub series: Vec<String>,
    pub title: String,
    pub chart_type: ChartType,
    pub smooth: bool,
    pub stack: bool,
    pub area: bool,
}

/// A single-field override coming from the config panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigField {
    Title(String),
    XAxis(String),
    Series(Vec<String>),
    ChartType(ChartType),
    Smooth(bool),
    Stack(bool),
    Area(bool),
}

impl ConfigField {
    /// Interpret a `key=value` style override. Keys are the camelCase names the config is
    /// serialized with; `series` takes a comma separated list.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigFieldError> {
        let field = match key.trim() {
            "title" => ConfigField::Title(value.to_string()),
            "xAxis" => ConfigField::XAxis(value.trim().to_string()),
            "series" => ConfigField::Series(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            "chartType" => ConfigField::ChartType(value.parse()?),
            "smooth" => ConfigField::Smooth(parse_toggle("smooth", value)?),
            "stack" => ConfigField::Stack(parse_toggle("stack", value)?),
            "area" => ConfigField::Area(parse_toggle("area", value)?),
            other => return Err(ConfigFieldError::UnknownField(other.to_string())),
        };
        Ok(field)
    }

    /// Merge into `config`, leaving every other field alone.
    pub fn apply_to(self, config: &mut ChartConfig) {
        match self {
            ConfigField::Title(v) => config.title = v,
            ConfigField::XAxis(v) => config.x_axis = v,
            ConfigField::Series(v) => config.series = v,
            ConfigField::ChartType(v) => config.chart_type = v,
            ConfigField::Smooth(v) => config.smooth = v,
            ConfigField::Stack(v) => config.stack = v,
            ConfigField::Area(v) => config.area = v,
        }
    }
}

fn parse_toggle(field: &'static str, value: &str) -> Result<bool, ConfigFieldError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConfigFieldError::InvalidValue {
            field,
            value: other.to_string(),
            expected: "`true` or `false`",
        }),
    }
}
