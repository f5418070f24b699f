pub mod infer;
pub mod render;
pub mod types;

pub use infer::{infer_chart_config, ChartState, MAX_SERIES};
pub use render::{build_chart_data, ChartData, SeriesData};
pub use types::{ChartConfig, ChartType, ConfigField};
