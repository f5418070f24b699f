// src/chart/render.rs
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::types::{ChartConfig, ChartType};
use crate::table::header::SYNTHETIC_PREFIX;
use crate::table::{is_valid_header, CellValue, Row};

/// Stack group name shared by every series when stacking is on.
const STACK_GROUP: &str = "total";

/// Renderer-ready chart: category labels along the x axis plus one numeric series per
/// plotted column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub categories: Vec<CellValue>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub name: String,
    pub kind: ChartType,
    pub smooth: bool,
    pub area: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// One point per row; `None` where the cell is not a number.
    pub data: Vec<Option<f64>>,
}

/// Check `config` against the rows actually present and build what the renderer draws.
///
/// `None` means "show the placeholder": there are no rows, or the axis column does not exist.
/// Series naming a missing or synthesized column are dropped rather than failing the chart.
pub fn build_chart_data(rows: &[Arc<Row>], config: &ChartConfig) -> Option<ChartData> {
    let first = rows.first()?;
    if first.get(&config.x_axis).is_none() {
        debug!(x_axis = %config.x_axis, "axis column not present; nothing to render");
        return None;
    }

    let categories = rows
        .iter()
        .map(|r| r.get(&config.x_axis).cloned().unwrap_or_else(CellValue::empty))
        .collect();

    let series = config
        .series
        .iter()
        .filter(|key| is_valid_header(key) && !key.starts_with(SYNTHETIC_PREFIX))
        .filter(|key| {
            let present = first.get(key).is_some();
            if !present {
                debug!(series = %key, "series column not present; skipped");
            }
            present
        })
        .map(|key| SeriesData {
            name: key.clone(),
            kind: config.chart_type,
            smooth: config.smooth,
            area: config.area,
            stack: config.stack.then(|| STACK_GROUP.to_string()),
            data: rows
                .iter()
                .map(|r| r.get(key).and_then(CellValue::as_number))
                .collect(),
        })
        .collect();

    Some(ChartData {
        title: config.title.clone(),
        categories,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::infer_chart_config;
    use crate::config::ChartDefaults;
    use crate::parse::RawInput;
    use crate::table::{normalize, Snapshot};
    use anyhow::{Context, Result};

    fn sales() -> Result<Snapshot> {
        Ok(normalize(&RawInput::from_strings([
            vec!["Month", "Revenue", "Cost"],
            vec!["Jan", "$1,000", "400"],
            vec!["Feb", "1200", "n/a"],
        ]))?)
    }

    #[test]
    fn builds_series_from_inferred_config() -> Result<()> {
        let snap = sales()?;
        let cfg = infer_chart_config(&snap, &ChartDefaults::default()).context("config")?;
        let data = build_chart_data(&snap.rows, &cfg).context("chart data")?;

        assert_eq!(data.title, "Data Visualization");
        assert_eq!(data.categories, vec![CellValue::from("Jan"), CellValue::from("Feb")]);
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.series[0].name, "revenue");
        assert_eq!(data.series[0].data, vec![Some(1000.0), Some(1200.0)]);
        assert_eq!(data.series[1].data, vec![Some(400.0), None]);
        assert_eq!(data.series[0].stack, None);
        Ok(())
    }

    #[test]
    fn stale_keys_render_nothing_or_are_dropped() -> Result<()> {
        let snap = sales()?;
        let mut cfg = infer_chart_config(&snap, &ChartDefaults::default()).context("config")?;

        cfg.series = vec!["revenue".into(), "gone".into(), "column_2".into()];
        let data = build_chart_data(&snap.rows, &cfg).context("chart data")?;
        let names: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["revenue"]);

        cfg.x_axis = "gone".into();
        assert!(build_chart_data(&snap.rows, &cfg).is_none());
        Ok(())
    }

    #[test]
    fn empty_rows_render_placeholder() -> Result<()> {
        let snap = sales()?;
        let cfg = infer_chart_config(&snap, &ChartDefaults::default()).context("config")?;
        assert!(build_chart_data(&[], &cfg).is_none());
        Ok(())
    }

    #[test]
    fn toggles_flow_into_every_series() -> Result<()> {
        let snap = sales()?;
        let mut cfg = infer_chart_config(&snap, &ChartDefaults::default()).context("config")?;
        cfg.stack = true;
        cfg.area = true;
        cfg.chart_type = ChartType::Bar;

        let data = build_chart_data(&snap.rows, &cfg).context("chart data")?;
        for s in &data.series {
            assert_eq!(s.stack.as_deref(), Some("total"));
            assert!(s.area);
            assert_eq!(s.kind, ChartType::Bar);
        }
        Ok(())
    }
}
