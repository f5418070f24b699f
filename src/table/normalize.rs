// src/table/normalize.rs
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::coerce::{coerce, coerce_opt};
use super::header::normalize_headers;
use super::types::{Column, Row, Snapshot};
use crate::error::TableError;
use crate::parse::RawInput;

/// Build a snapshot from raw parser output. Row 0 is the header row.
///
/// Short rows are padded with empty cells and over-wide rows are cut to the header width;
/// neither is an error. Only missing data and a header row with no cells are.
#[instrument(level = "info", skip(raw), fields(rows = raw.rows.len()))]
pub fn normalize(raw: &RawInput) -> Result<Snapshot, TableError> {
    let (header_row, data_rows) = match raw.rows.split_first() {
        Some((h, d)) if !d.is_empty() => (h, d),
        _ => return Err(TableError::EmptyInput),
    };
    if header_row.is_empty() {
        return Err(TableError::MalformedRow {
            index: 0,
            reason: "header row has no cells".into(),
        });
    }

    let columns = normalize_headers(header_row);

    let too_wide = data_rows.iter().filter(|r| r.len() > columns.len()).count();
    if too_wide > 0 {
        warn!(
            too_wide,
            headers = columns.len(),
            "some rows have more cells than headers; extra cells dropped"
        );
    }

    let rows = data_rows
        .iter()
        .map(|cells| Arc::new(build_row(&columns, cells)))
        .collect::<Vec<_>>();

    debug!(columns = columns.len(), rows = rows.len(), "normalized table");
    Ok(Snapshot { columns, rows })
}

fn build_row(columns: &[Column], cells: &[Option<String>]) -> Row {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let raw = cells.get(idx).and_then(|c| c.as_deref());
            (col.accessor_key.clone(), coerce_opt(raw))
        })
        .collect::<BTreeMap<_, _>>();

    Row {
        id: Uuid::new_v4().to_string(),
        cells,
    }
}

impl Snapshot {
    /// The snapshot with one cell re-coerced from `raw`.
    ///
    /// Returns `None` when no row has `row_id` or no column has `key`. Every other row is
    /// shared with `self`; the edited row is a new allocation with the same id.
    pub fn with_cell(&self, row_id: &str, key: &str, raw: &str) -> Option<Snapshot> {
        let Some(pos) = self.rows.iter().position(|r| r.id == row_id) else {
            debug!(row_id, "update for unknown row ignored");
            return None;
        };
        if self.column(key).is_none() {
            debug!(row_id, key, "update for unknown column ignored");
            return None;
        }

        let mut edited = Row::clone(&self.rows[pos]);
        edited.cells.insert(key.to_string(), coerce(raw));

        let mut rows = self.rows.clone();
        rows[pos] = Arc::new(edited);
        Some(Snapshot {
            columns: self.columns.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use anyhow::Result;
    use std::collections::HashSet;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,tabviz::table=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn sales_table() -> Result<Snapshot> {
        Ok(normalize(&RawInput::from_strings([
            vec!["Name", "Sales ($)", "Sales ($)"],
            vec!["Widget", "$1,200", "$1,300"],
            vec!["Gadget", "950", "n/a"],
        ]))?)
    }

    #[test]
    fn duplicate_currency_headers() -> Result<()> {
        init_test_logging();
        let snap = sales_table()?;

        assert_eq!(
            snap.columns,
            vec![
                Column {
                    header: "Name".into(),
                    accessor_key: "name".into(),
                },
                Column {
                    header: "Sales ($)".into(),
                    accessor_key: "sales____".into(),
                },
                Column {
                    header: "Sales ($)".into(),
                    accessor_key: "sales_____1".into(),
                },
            ]
        );

        let row = &snap.rows[0];
        assert!(!row.id.is_empty());
        assert_eq!(row.get("name"), Some(&CellValue::from("Widget")));
        assert_eq!(row.get("sales____"), Some(&CellValue::Number(1200.0)));
        assert_eq!(row.get("sales_____1"), Some(&CellValue::Number(1300.0)));
        assert_eq!(snap.rows[1].get("sales_____1"), Some(&CellValue::from("n/a")));
        Ok(())
    }

    #[test]
    fn blank_header_and_numeric_year() -> Result<()> {
        let snap = normalize(&RawInput::from_strings([vec!["", "Year"], vec!["", "2021"]]))?;
        assert_eq!(snap.columns[0].accessor_key, "column_1");
        assert_eq!(snap.rows[0].get("column_1"), Some(&CellValue::empty()));
        assert_eq!(snap.rows[0].get("year"), Some(&CellValue::Number(2021.0)));
        Ok(())
    }

    #[test]
    fn every_row_has_exactly_the_column_keys() -> Result<()> {
        init_test_logging();
        let raw = RawInput::new(vec![
            vec![Some("a".into()), Some("b".into()), Some("c".into())],
            vec![Some("1".into())],
            vec![Some("1".into()), None, Some("3".into())],
            vec![
                Some("1".into()),
                Some("2".into()),
                Some("3".into()),
                Some("4".into()),
            ],
            vec![],
        ]);
        let snap = normalize(&raw)?;
        assert_eq!(snap.rows.len(), 4);

        let expected: HashSet<&str> = snap.columns.iter().map(|c| c.accessor_key.as_str()).collect();
        for row in &snap.rows {
            let got: HashSet<&str> = row.cells.keys().map(String::as_str).collect();
            assert_eq!(got, expected);
        }
        assert_eq!(snap.rows[0].get("b"), Some(&CellValue::empty()));
        assert_eq!(snap.rows[1].get("b"), Some(&CellValue::empty()));
        assert_eq!(snap.rows[2].get("c"), Some(&CellValue::Number(3.0)));
        Ok(())
    }

    #[test]
    fn row_ids_are_unique() -> Result<()> {
        let mut rows = vec![vec!["n".to_string()]];
        rows.extend((0..500).map(|i| vec![i.to_string()]));
        let snap = normalize(&RawInput::from_strings(rows))?;
        let ids: HashSet<&str> = snap.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 500);
        Ok(())
    }

    #[test]
    fn too_few_rows_is_empty_input() {
        let none = normalize(&RawInput::default());
        assert!(matches!(none, Err(TableError::EmptyInput)));

        let header_only = normalize(&RawInput::from_strings([vec!["a", "b"]]));
        assert!(matches!(header_only, Err(TableError::EmptyInput)));
    }

    #[test]
    fn header_without_cells_is_malformed() {
        let raw = RawInput::new(vec![vec![], vec![Some("1".into())]]);
        match normalize(&raw) {
            Err(TableError::MalformedRow { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn with_cell_replaces_only_the_target_field() -> Result<()> {
        let snap = sales_table()?;
        let target = snap.rows[1].id.clone();

        let next = snap
            .with_cell(&target, "sales____", "$2,000")
            .expect("row exists");

        assert_eq!(next.rows.len(), snap.rows.len());
        assert!(Arc::ptr_eq(&next.rows[0], &snap.rows[0]));
        assert!(!Arc::ptr_eq(&next.rows[1], &snap.rows[1]));

        let edited = next.row(&target).expect("edited row present");
        assert!(Arc::ptr_eq(edited, &next.rows[1]));
        assert_eq!(edited.id, target);
        assert_eq!(edited.get("sales____"), Some(&CellValue::Number(2000.0)));
        assert_eq!(edited.get("name"), snap.rows[1].get("name"));
        assert_eq!(edited.get("sales_____1"), snap.rows[1].get("sales_____1"));

        // the source snapshot is untouched
        assert_eq!(snap.rows[1].get("sales____"), Some(&CellValue::Number(950.0)));
        Ok(())
    }

    #[test]
    fn with_cell_unknown_row_or_column_is_none() -> Result<()> {
        let snap = sales_table()?;
        assert!(snap.with_cell("missing-id", "name", "x").is_none());
        let id = snap.rows[0].id.clone();
        assert!(snap.with_cell(&id, "nope", "x").is_none());
        Ok(())
    }
}
