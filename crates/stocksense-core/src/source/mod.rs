pub mod delimited;
pub mod workbook;

use crate::error::StockSenseError;
use crate::model::{FieldValue, InventoryItem, InventoryRow, REQUIRED_COLUMNS};
use std::collections::HashMap;
use std::path::Path;

/// A parsed inventory table: declared columns plus rows.
pub trait InventoryTable {
    type Row: InventoryRow;

    /// Column names exactly as the source declared them.
    fn columns(&self) -> &[String];

    fn rows(&self) -> &[Self::Row];
}

/// In-memory table over any row type.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable<R> {
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R: InventoryRow> RowTable<R> {
    pub fn new(columns: Vec<String>, rows: Vec<R>) -> Self {
        RowTable { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowTable<InventoryItem> {
    /// Table of typed items declaring exactly the required columns.
    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        RowTable::new(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            items,
        )
    }
}

impl<R: InventoryRow> InventoryTable for RowTable<R> {
    type Row = R;

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn rows(&self) -> &[R] {
        &self.rows
    }
}

/// A row read from a file, keyed by column name.
///
/// Only the required columns are retained; a column the file does not have
/// reads as [`FieldValue::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularRow {
    cells: HashMap<String, FieldValue>,
}

impl TabularRow {
    pub fn new(cells: HashMap<String, FieldValue>) -> Self {
        TabularRow { cells }
    }

    fn cell(&self, column: &str) -> FieldValue {
        self.cells.get(column).cloned().unwrap_or(FieldValue::Missing)
    }
}

impl InventoryRow for TabularRow {
    fn name(&self) -> FieldValue {
        self.cell("name")
    }

    fn stock(&self) -> FieldValue {
        self.cell("stock")
    }

    fn expiry_date(&self) -> FieldValue {
        self.cell("expiry_date")
    }

    fn daily_sales(&self) -> FieldValue {
        self.cell("daily_sales")
    }
}

/// Positions of the required columns within a header row.
pub(crate) fn required_positions(columns: &[String]) -> Vec<(&'static str, usize)> {
    REQUIRED_COLUMNS
        .iter()
        .filter_map(|required| {
            columns
                .iter()
                .position(|c| c == required)
                .map(|index| (*required, index))
        })
        .collect()
}

/// Load an inventory file, choosing the reader from the file extension.
///
/// `.xlsx`, `.xlsm`, `.xls` and `.ods` go through the workbook reader;
/// anything else is read as CSV.
pub fn load_table(path: &Path) -> Result<RowTable<TabularRow>, StockSenseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => workbook::read_workbook(path),
        _ => delimited::read_csv(path),
    }
}
