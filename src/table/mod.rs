pub mod coerce;
pub mod header;
pub mod normalize;
pub mod types;

pub use coerce::coerce;
pub use header::{is_valid_header, normalize_headers};
pub use normalize::normalize;
pub use types::{CellValue, Column, Row, Snapshot, ROW_ID_KEY};
