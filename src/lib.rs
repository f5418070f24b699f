//! Delimited-text to table normalization and chart configuration inference.
//!
//! Raw bytes go through [`parse`] into a [`RawInput`], the [`table`] module turns that into a
//! [`Snapshot`] of typed cells, and [`chart`] derives a default [`ChartConfig`] from it. The
//! [`Workspace`] owns the live state and is the only place it is mutated.

pub mod chart;
pub mod config;
pub mod error;
pub mod parse;
pub mod table;
pub mod workspace;

pub use chart::{ChartConfig, ChartData, ChartType, ConfigField};
pub use config::Settings;
pub use error::{ConfigFieldError, TableError};
pub use parse::RawInput;
pub use table::{CellValue, Column, Row, Snapshot};
pub use workspace::{TableView, Workspace};
