use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::StockSenseError;
use crate::model::FieldValue;
use crate::source::{required_positions, RowTable, TabularRow};

/// Read the first worksheet of a spreadsheet. Row 0 is the header.
pub fn read_workbook(path: &Path) -> Result<RowTable<TabularRow>, StockSenseError> {
    std::fs::metadata(path).map_err(|e| StockSenseError::SourceNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let format_error = |reason: String| StockSenseError::SourceFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| format_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| format_error("workbook has no worksheets".into()))?
        .map_err(|e| format_error(e.to_string()))?;

    let table = table_from_range(&range);
    tracing::debug!(path = %path.display(), rows = table.len(), "read workbook inventory");
    Ok(table)
}

fn table_from_range(range: &Range<Data>) -> RowTable<TabularRow> {
    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(header_name).collect(),
        None => return RowTable::new(Vec::new(), Vec::new()),
    };
    let positions = required_positions(&columns);

    let rows = rows_iter
        .filter(|row| !row.iter().all(|cell| matches!(field_value(cell), FieldValue::Missing)))
        .map(|row| {
            let cells: HashMap<String, FieldValue> = positions
                .iter()
                .map(|(column, index)| {
                    let value = row.get(*index).map(field_value).unwrap_or(FieldValue::Missing);
                    (column.to_string(), value)
                })
                .collect();
            TabularRow::new(cells)
        })
        .collect();

    RowTable::new(columns, rows)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => format!("{other}"),
    }
}

/// Map a spreadsheet cell onto the loosely typed field value.
fn field_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Missing,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                FieldValue::Missing
            } else {
                FieldValue::Text(trimmed.to_string())
            }
        }
        Data::Int(i) => FieldValue::Integer(*i),
        Data::Float(f) => match f64_to_decimal(*f) {
            Some(d) => FieldValue::Number(d),
            None => FieldValue::Text(f.to_string()),
        },
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => FieldValue::Date(value),
            None => FieldValue::Text(format!("{cell}")),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(value) => FieldValue::Date(value),
            None => FieldValue::Text(s.trim().to_string()),
        },
        other => FieldValue::Text(format!("{other}")),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(crate::model::midnight)
        })
}

// Spreadsheet floats carry binary noise; going through the shortest decimal
// representation keeps 1.23 as 1.23.
fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    format!("{f}")
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InventoryRow;
    use crate::source::InventoryTable;
    use rust_decimal_macros::dec;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn header() -> Vec<Data> {
        ["name", "stock", "expiry_date", "daily_sales"]
            .iter()
            .map(|h| Data::String(h.to_string()))
            .collect()
    }

    #[test]
    fn f64_conversion_keeps_short_form() {
        assert_eq!(f64_to_decimal(0.0035), Some(dec!(0.0035)));
        assert_eq!(f64_to_decimal(68.0), Some(dec!(68)));
        assert_eq!(f64_to_decimal(1.23), Some(dec!(1.23)));
        assert_eq!(f64_to_decimal(f64::NAN), None);
    }

    #[test]
    fn typed_cells_map_to_field_values() {
        let range = sheet(&[
            header().as_slice(),
            &[
                Data::String(" Aspirin ".into()),
                Data::Float(150.0),
                Data::DateTimeIso("2024-03-01T00:00:00".into()),
                Data::Float(2.5),
            ],
        ]);
        let table = table_from_range(&range);
        let row = &table.rows()[0];
        assert_eq!(row.name(), FieldValue::Text("Aspirin".into()));
        assert_eq!(row.stock(), FieldValue::Number(dec!(150)));
        assert_eq!(
            row.expiry_date(),
            FieldValue::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(row.daily_sales(), FieldValue::Number(dec!(2.5)));
    }

    #[test]
    fn integer_and_text_cells() {
        let range = sheet(&[
            header().as_slice(),
            &[
                Data::String("Zinc".into()),
                Data::Int(12),
                Data::String("2024-05-05".into()),
                Data::String("3".into()),
            ],
        ]);
        let table = table_from_range(&range);
        let row = &table.rows()[0];
        assert_eq!(row.stock(), FieldValue::Integer(12));
        assert_eq!(row.expiry_date(), FieldValue::Text("2024-05-05".into()));
        assert_eq!(row.daily_sales(), FieldValue::Text("3".into()));
    }

    #[test]
    fn empty_rows_skipped_and_short_rows_missing() {
        let range = sheet(&[
            header().as_slice(),
            &[Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            &[Data::String("Iron".into()), Data::Int(3)],
        ]);
        let table = table_from_range(&range);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].daily_sales(), FieldValue::Missing);
    }

    #[test]
    fn empty_sheet_has_no_columns() {
        let table = table_from_range(&Range::<Data>::empty());
        assert!(table.columns().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn corrupt_workbook_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let err = read_workbook(&path).unwrap_err();
        assert!(matches!(err, StockSenseError::SourceFormat { .. }));
    }
}
