use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::StockSenseError;
use crate::model::FieldValue;
use crate::source::{required_positions, RowTable, TabularRow};

/// Read a CSV inventory file with a header row.
pub fn read_csv(path: &Path) -> Result<RowTable<TabularRow>, StockSenseError> {
    let file = File::open(path).map_err(|e| StockSenseError::SourceNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_csv_from(file, path)
}

/// Read CSV data from any reader; `source` is only used in error messages.
///
/// Header names are kept verbatim. Cells are trimmed and blank cells become
/// [`FieldValue::Missing`]. Rows with no content at all are skipped.
pub fn read_csv_from<R: Read>(
    reader: R,
    source: &Path,
) -> Result<RowTable<TabularRow>, StockSenseError> {
    let format_error = |e: csv::Error| StockSenseError::SourceFormat {
        path: source.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(format_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let positions = required_positions(&columns);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(format_error)?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let cells: HashMap<String, FieldValue> = positions
            .iter()
            .map(|(column, index)| (column.to_string(), text_cell(record.get(*index))))
            .collect();
        rows.push(TabularRow::new(cells));
    }

    tracing::debug!(path = %source.display(), rows = rows.len(), "read csv inventory");
    Ok(RowTable::new(columns, rows))
}

fn text_cell(value: Option<&str>) -> FieldValue {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => FieldValue::Text(v.to_string()),
        _ => FieldValue::Missing,
    }
}
