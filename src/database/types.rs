//! SQL Server value mapping.
//!
//! Every cell becomes a [`SqlValue`]. Temporal values serialize as ISO-8601
//! text so that what was written can be compared textually with what is read.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tiberius::{ColumnData, Row};

/// A SQL value that can be serialized to JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Convert to a display string. Temporal values use ISO-8601.
    pub fn to_display_string(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::String(v) => v.clone(),
            SqlValue::Bytes(v) => format!("0x{}", hex::encode(v)),
            SqlValue::Date(v) => v.format("%Y-%m-%d").to_string(),
            SqlValue::Time(v) => v.format("%H:%M:%S%.f").to_string(),
            SqlValue::DateTime(v) => v.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            SqlValue::DateTimeOffset(v) => v.to_rfc3339(),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Bool(v) => serializer.serialize_bool(*v),
            SqlValue::Int(v) => serializer.serialize_i64(*v),
            // NaN and infinities have no JSON form
            SqlValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            SqlValue::Float(v) => serializer.serialize_str(&v.to_string()),
            other => serializer.serialize_str(&other.to_display_string()),
        }
    }
}

/// Type mapper for converting SQL Server cells to [`SqlValue`].
pub struct TypeMapper;

impl TypeMapper {
    /// Extract every cell of a row, in column order.
    pub fn extract_row(row: &Row) -> Vec<SqlValue> {
        row.cells()
            .enumerate()
            .map(|(idx, (_, data))| Self::extract_cell(row, idx, data))
            .collect()
    }

    fn extract_cell(row: &Row, idx: usize, data: &ColumnData<'_>) -> SqlValue {
        match data {
            ColumnData::Bit(Some(v)) => SqlValue::Bool(*v),
            ColumnData::U8(Some(v)) => SqlValue::Int(i64::from(*v)),
            ColumnData::I16(Some(v)) => SqlValue::Int(i64::from(*v)),
            ColumnData::I32(Some(v)) => SqlValue::Int(i64::from(*v)),
            ColumnData::I64(Some(v)) => SqlValue::Int(*v),
            ColumnData::F32(Some(v)) => SqlValue::Float(f64::from(*v)),
            ColumnData::F64(Some(v)) => SqlValue::Float(*v),
            // rust_decimal stops at scale 28; wider NUMERICs keep their text form
            ColumnData::Numeric(Some(n)) => {
                Decimal::try_from_i128_with_scale(n.value(), u32::from(n.scale()))
                    .map(SqlValue::Decimal)
                    .unwrap_or_else(|_| SqlValue::String(n.to_string()))
            }
            ColumnData::String(Some(s)) => SqlValue::String(s.to_string()),
            ColumnData::Guid(Some(g)) => SqlValue::String(g.to_string()),
            ColumnData::Binary(Some(b)) => SqlValue::Bytes(b.to_vec()),
            ColumnData::Xml(Some(xml)) => SqlValue::String(xml.to_string()),
            ColumnData::DateTime(Some(_))
            | ColumnData::SmallDateTime(Some(_))
            | ColumnData::DateTime2(Some(_)) => row
                .try_get::<NaiveDateTime, _>(idx)
                .ok()
                .flatten()
                .map(SqlValue::DateTime)
                .unwrap_or(SqlValue::Null),
            ColumnData::DateTimeOffset(Some(_)) => row
                .try_get::<DateTime<FixedOffset>, _>(idx)
                .ok()
                .flatten()
                .map(SqlValue::DateTimeOffset)
                .unwrap_or(SqlValue::Null),
            ColumnData::Date(Some(_)) => row
                .try_get::<NaiveDate, _>(idx)
                .ok()
                .flatten()
                .map(SqlValue::Date)
                .unwrap_or(SqlValue::Null),
            ColumnData::Time(Some(_)) => row
                .try_get::<NaiveTime, _>(idx)
                .ok()
                .flatten()
                .map(SqlValue::Time)
                .unwrap_or(SqlValue::Null),
            // All None variants and unsupported types
            _ => SqlValue::Null,
        }
    }

    /// Get the SQL type name for a column.
    pub fn sql_type_name(col: &tiberius::Column) -> &'static str {
        use tiberius::ColumnType;

        match col.column_type() {
            ColumnType::Null => "NULL",
            ColumnType::Int1 => "TINYINT",
            ColumnType::Int2 => "SMALLINT",
            ColumnType::Int4 => "INT",
            ColumnType::Int8 => "BIGINT",
            ColumnType::Float4 => "REAL",
            ColumnType::Float8 => "FLOAT",
            ColumnType::Money => "MONEY",
            ColumnType::Money4 => "SMALLMONEY",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Datetime4 => "SMALLDATETIME",
            ColumnType::Bit | ColumnType::Bitn => "BIT",
            ColumnType::Guid => "UNIQUEIDENTIFIER",
            ColumnType::Decimaln => "DECIMAL",
            ColumnType::Numericn => "NUMERIC",
            ColumnType::Intn => "INT",
            ColumnType::Floatn => "FLOAT",
            ColumnType::Datetimen => "DATETIME",
            ColumnType::Daten => "DATE",
            ColumnType::Timen => "TIME",
            ColumnType::Datetime2 => "DATETIME2",
            ColumnType::DatetimeOffsetn => "DATETIMEOFFSET",
            ColumnType::BigVarBin => "VARBINARY",
            ColumnType::BigVarChar => "VARCHAR",
            ColumnType::BigBinary => "BINARY",
            ColumnType::BigChar => "CHAR",
            ColumnType::NVarchar => "NVARCHAR",
            ColumnType::NChar => "NCHAR",
            ColumnType::Xml => "XML",
            ColumnType::Text => "TEXT",
            ColumnType::Image => "IMAGE",
            ColumnType::NText => "NTEXT",
            ColumnType::SSVariant => "SQL_VARIANT",
            _ => "UNKNOWN",
        }
    }
}

/// Normalize an ISO-8601 date/time string for textual comparison.
///
/// Accepts a space or `T` separator and strips trailing fractional zeros, so
/// `2024-01-15 10:30:00.000` and `2024-01-15T10:30:00` compare equal.
pub fn normalize_iso8601(value: &str) -> String {
    let unified = value.trim().replacen(' ', "T", 1);
    match unified.split_once('.') {
        Some((whole, fraction)) => {
            let digits_end = fraction
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(fraction.len());
            let (digits, suffix) = fraction.split_at(digits_end);
            let digits = digits.trim_end_matches('0');
            if digits.is_empty() {
                format!("{}{}", whole, suffix)
            } else {
                format!("{}.{}{}", whole, digits, suffix)
            }
        }
        None => unified,
    }
}

/// Hex encoding helper (minimal implementation to avoid extra dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02X}", b)).collect()
    }
}
