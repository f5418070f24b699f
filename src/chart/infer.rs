// src/chart/infer.rs
use tracing::debug;

use super::types::{ChartConfig, ConfigField};
use crate::config::ChartDefaults;
use crate::table::header::SYNTHETIC_PREFIX;
use crate::table::{is_valid_header, Column, Snapshot, ROW_ID_KEY};

/// Upper bound on inferred series.
pub const MAX_SERIES: usize = 5;

/// Accessor keys that mark a column as the natural category axis.
const TEMPORAL_HINTS: [&str; 4] = ["day", "date", "month", "year"];

/// Derive a default chart from the first row of `snapshot`.
///
/// The axis is the first temporal column, else the first column whose first value is not a
/// number, else the first column. Series are the numeric, properly named columns after
/// removing the axis, capped at [`MAX_SERIES`].
pub fn infer_chart_config(snapshot: &Snapshot, defaults: &ChartDefaults) -> Option<ChartConfig> {
    let first = snapshot.rows.first()?;
    let candidates: Vec<&Column> = snapshot
        .columns
        .iter()
        .filter(|c| c.accessor_key != ROW_ID_KEY)
        .collect();

    let is_numeric = |col: &Column| first.get(&col.accessor_key).is_some_and(|v| v.is_number());

    let x_axis = candidates
        .iter()
        .find(|c| TEMPORAL_HINTS.contains(&c.accessor_key.to_lowercase().as_str()))
        .or_else(|| candidates.iter().find(|c| !is_numeric(**c)))
        .or_else(|| candidates.first())?
        .accessor_key
        .clone();

    let series: Vec<String> = candidates
        .iter()
        .filter(|c| c.accessor_key != x_axis)
        .filter(|c| is_numeric(**c))
        .filter(|c| is_valid_header(&c.header) && !c.accessor_key.starts_with(SYNTHETIC_PREFIX))
        .take(MAX_SERIES)
        .map(|c| c.accessor_key.clone())
        .collect();

    debug!(x_axis = %x_axis, series = ?series, "inferred chart configuration");
    Some(ChartConfig {
        x_axis,
        series,
        title: defaults.title.clone(),
        chart_type: defaults.chart_type,
        smooth: defaults.smooth,
        stack: defaults.stack,
        area: defaults.area,
    })
}

/// The live chart configuration. Replaced wholesale on every new snapshot, otherwise only
/// changed one field at a time.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    defaults: ChartDefaults,
    current: Option<ChartConfig>,
}

impl ChartState {
    pub fn new(defaults: ChartDefaults) -> Self {
        Self {
            defaults,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&ChartConfig> {
        self.current.as_ref()
    }

    /// Re-run inference for a freshly published snapshot, discarding user overrides.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) -> Option<&ChartConfig> {
        self.current = if snapshot.is_empty() {
            None
        } else {
            infer_chart_config(snapshot, &self.defaults)
        };
        self.current.as_ref()
    }

    /// Merge one override. Returns false when there is no configuration to merge into.
    pub fn apply(&mut self, field: ConfigField) -> bool {
        match self.current.as_mut() {
            Some(config) => {
                field.apply_to(config);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
