use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidRecord;
use crate::parsing::values;

/// Columns every inventory source must declare.
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "stock", "expiry_date", "daily_sales"];

const SECONDS_PER_DAY: i64 = 86_400;

/// A raw cell as delivered by a tabular source, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Text(String),
    Integer(i64),
    Number(Decimal),
    Date(NaiveDateTime),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "<missing>"),
            FieldValue::Text(s) => write!(f, "'{s}'"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Number(d) => write!(f, "{d}"),
            FieldValue::Date(dt) => write!(f, "{dt}"),
        }
    }
}

/// Row accessor implemented by every tabular adapter.
///
/// The engine only reads rows through this trait, so any table library can
/// feed it as long as it maps its cells onto [`FieldValue`].
pub trait InventoryRow {
    fn name(&self) -> FieldValue;
    fn stock(&self) -> FieldValue;
    fn expiry_date(&self) -> FieldValue;
    fn daily_sales(&self) -> FieldValue;
}

/// Typed inventory line for programmatic callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub stock: i64,
    pub expiry_date: NaiveDate,
    pub daily_sales: Decimal,
}

impl InventoryItem {
    pub fn new(
        name: impl Into<String>,
        stock: i64,
        expiry_date: NaiveDate,
        daily_sales: Decimal,
    ) -> Self {
        InventoryItem {
            name: name.into(),
            stock,
            expiry_date,
            daily_sales,
        }
    }
}

impl InventoryRow for InventoryItem {
    fn name(&self) -> FieldValue {
        FieldValue::Text(self.name.clone())
    }

    fn stock(&self) -> FieldValue {
        FieldValue::Integer(self.stock)
    }

    fn expiry_date(&self) -> FieldValue {
        FieldValue::Date(midnight(self.expiry_date))
    }

    fn daily_sales(&self) -> FieldValue {
        FieldValue::Number(self.daily_sales)
    }
}

/// One validated inventory line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineRecord {
    name: String,
    stock: u64,
    expiry_date: NaiveDateTime,
    daily_sales: Decimal,
}

impl MedicineRecord {
    /// Build a record from already-typed values.
    pub fn new(
        name: impl Into<String>,
        stock: i64,
        expiry_date: NaiveDateTime,
        daily_sales: Decimal,
    ) -> Result<Self, InvalidRecord> {
        Self::from_fields(
            FieldValue::Text(name.into()),
            FieldValue::Integer(stock),
            FieldValue::Date(expiry_date),
            FieldValue::Number(daily_sales),
        )
    }

    /// Validate a row, failing on the first bad field.
    ///
    /// Fields are checked in the order name, stock, daily_sales, expiry_date.
    pub fn from_row<R: InventoryRow + ?Sized>(row: &R) -> Result<Self, InvalidRecord> {
        Self::from_fields(row.name(), row.stock(), row.expiry_date(), row.daily_sales())
    }

    fn from_fields(
        name: FieldValue,
        stock: FieldValue,
        expiry_date: FieldValue,
        daily_sales: FieldValue,
    ) -> Result<Self, InvalidRecord> {
        let name = values::parse_name(&name)?;
        let stock = values::parse_stock(&stock)?;
        let daily_sales = values::parse_daily_sales(&daily_sales)?;
        let expiry_date = values::parse_expiry_date(&expiry_date)?;
        Ok(MedicineRecord {
            name,
            stock,
            expiry_date,
            daily_sales,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn expiry_date(&self) -> NaiveDateTime {
        self.expiry_date
    }

    pub fn daily_sales(&self) -> Decimal {
        self.daily_sales
    }

    /// Whole days from `reference` to the expiry instant, floored.
    ///
    /// This floors the exact duration rather than subtracting calendar days,
    /// so with a reference of 10:00 an item expiring tomorrow at midnight has
    /// 0 days left and one expiring today at midnight has -1.
    pub fn days_until_expiry(&self, reference: NaiveDateTime) -> i64 {
        let remaining = self.expiry_date - reference;
        let mut seconds = remaining.num_seconds();
        // num_seconds truncates toward zero; step down for a negative fraction.
        if remaining < chrono::Duration::seconds(seconds) {
            seconds -= 1;
        }
        seconds.div_euclid(SECONDS_PER_DAY)
    }

    /// Linear projection of units sold before expiry. Never negative.
    pub fn predicted_sales_before_expiry(&self, reference: NaiveDateTime) -> Decimal {
        let days = Decimal::from(self.days_until_expiry(reference).max(0));
        self.daily_sales.checked_mul(days).unwrap_or(Decimal::MAX)
    }
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
