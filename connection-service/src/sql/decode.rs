//! Per-dialect value decoding.
//!
//! MySQL and PostgreSQL results are read over the text protocol, so their
//! cells arrive as text and are classified by the column's reported type.
//! SQLite cells carry their runtime storage class. SQL Server cells are
//! decoded by TDS column type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::models::{Row, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tiberius::ColumnType;

/// How a text-encoded cell is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Bool,
    Int,
    Float,
    Text,
}

/// Classifies a MySQL type name (as reported by sqlx).
pub fn mysql_kind(type_name: &str) -> TextKind {
    let base = type_name.split_whitespace().next().unwrap_or(type_name);
    match base {
        "BOOLEAN" => TextKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => TextKind::Int,
        "FLOAT" | "DOUBLE" => TextKind::Float,
        _ => TextKind::Text,
    }
}

/// Classifies a PostgreSQL type by OID.
pub fn postgres_kind(oid: Option<u32>) -> TextKind {
    match oid {
        Some(16) => TextKind::Bool,
        Some(20 | 21 | 23 | 26) => TextKind::Int,
        Some(700 | 701) => TextKind::Float,
        _ => TextKind::Text,
    }
}

/// Interprets a text cell. Text that does not parse as its kind stays text.
pub fn parse_text(kind: TextKind, text: String) -> Value {
    match kind {
        TextKind::Bool => match text.as_str() {
            "t" | "true" | "1" => Value::Bool(true),
            "f" | "false" | "0" => Value::Bool(false),
            _ => Value::Text(text),
        },
        TextKind::Int => text.parse().map(Value::Int).unwrap_or(Value::Text(text)),
        TextKind::Float => text.parse().map(Value::Float).unwrap_or(Value::Text(text)),
        TextKind::Text => Value::Text(text),
    }
}

pub fn mysql_value(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
    let kind = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        mysql_kind(raw.type_info().name())
    };
    let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
    Ok(parse_text(kind, String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn postgres_value(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
    let kind = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        postgres_kind(raw.type_info().oid().map(|oid| oid.0))
    };
    let text: String = row.try_get_unchecked(idx)?;
    Ok(parse_text(kind, text))
}

/// Decodes by runtime storage class: integer, real, text, then blob.
pub fn sqlite_value(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(Value::Int(v));
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(Value::Float(v));
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Ok(Value::Text(v));
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        return Ok(Value::Bytes(v));
    }
    row.try_get_unchecked::<String, _>(idx).map(Value::Text)
}

/// Converts sqlx rows with `decode`, turning byte cells into text.
pub fn sqlx_rows<R, F>(rows: &[R], decode: F) -> Result<Vec<Row>, sqlx::Error>
where
    R: sqlx::Row,
    F: Fn(&R, usize) -> Result<Value, sqlx::Error>,
{
    rows.iter()
        .map(|row| {
            row.columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| {
                    decode(row, idx).map(|v| (col.name().to_string(), v.bytes_to_text()))
                })
                .collect::<Result<Row, _>>()
        })
        .collect()
}

/// Column names of a sqlx row.
pub fn sqlx_columns<R: sqlx::Row>(row: &R) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub fn mssql_value(row: &tiberius::Row, idx: usize) -> tiberius::Result<Value> {
    let column_type = row
        .columns()
        .get(idx)
        .map(|c| c.column_type())
        .unwrap_or(ColumnType::Null);

    let value = match column_type {
        ColumnType::Null => None,
        ColumnType::Bit | ColumnType::Bitn => row.try_get::<bool, _>(idx)?.map(Value::Bool),
        ColumnType::Int1 => row.try_get::<u8, _>(idx)?.map(|v| Value::Int(v.into())),
        ColumnType::Int2 => row.try_get::<i16, _>(idx)?.map(|v| Value::Int(v.into())),
        ColumnType::Int4 => row.try_get::<i32, _>(idx)?.map(|v| Value::Int(v.into())),
        ColumnType::Int8 => row.try_get::<i64, _>(idx)?.map(Value::Int),
        ColumnType::Intn => mssql_intn(row, idx)?.map(Value::Int),
        ColumnType::Float4 => row.try_get::<f32, _>(idx)?.map(|v| Value::Float(v.into())),
        ColumnType::Float8 | ColumnType::Money | ColumnType::Money4 => {
            row.try_get::<f64, _>(idx)?.map(Value::Float)
        }
        ColumnType::Floatn => match row.try_get::<f64, _>(idx) {
            Ok(v) => v.map(Value::Float),
            Err(_) => row.try_get::<f32, _>(idx)?.map(|v| Value::Float(v.into())),
        },
        ColumnType::Decimaln | ColumnType::Numericn => row
            .try_get::<tiberius::numeric::Numeric, _>(idx)?
            .map(|n| Value::Float(f64::from(n))),
        ColumnType::Datetime
        | ColumnType::Datetime2
        | ColumnType::Datetimen
        | ColumnType::Datetime4 => row
            .try_get::<NaiveDateTime, _>(idx)?
            .map(|dt| Value::Text(dt.to_string())),
        ColumnType::DatetimeOffsetn => row
            .try_get::<DateTime<Utc>, _>(idx)?
            .map(|dt| Value::Text(dt.to_rfc3339())),
        ColumnType::Daten => row
            .try_get::<NaiveDate, _>(idx)?
            .map(|d| Value::Text(d.to_string())),
        ColumnType::Timen => row
            .try_get::<NaiveTime, _>(idx)?
            .map(|t| Value::Text(t.to_string())),
        ColumnType::Guid => row
            .try_get::<tiberius::Uuid, _>(idx)?
            .map(|u| Value::Text(u.to_string())),
        ColumnType::BigVarBin | ColumnType::BigBinary | ColumnType::Image => row
            .try_get::<&[u8], _>(idx)?
            .map(|b| Value::Bytes(b.to_vec())),
        ColumnType::Xml => row
            .try_get::<&tiberius::xml::XmlData, _>(idx)?
            .map(|xml| Value::Text(xml.to_owned().into_string())),
        _ => row
            .try_get::<&str, _>(idx)?
            .map(|s| Value::Text(s.to_string())),
    };

    Ok(value.unwrap_or(Value::Null).bytes_to_text())
}

// INTN carries 1, 2, 4 or 8 byte integers depending on the column width.
fn mssql_intn(row: &tiberius::Row, idx: usize) -> tiberius::Result<Option<i64>> {
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<i32, _>(idx) {
        return Ok(v.map(i64::from));
    }
    if let Ok(v) = row.try_get::<i16, _>(idx) {
        return Ok(v.map(i64::from));
    }
    Ok(row.try_get::<u8, _>(idx)?.map(i64::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_kinds() {
        assert_eq!(mysql_kind("BIGINT UNSIGNED"), TextKind::Int);
        assert_eq!(mysql_kind("INT"), TextKind::Int);
        assert_eq!(mysql_kind("DOUBLE"), TextKind::Float);
        assert_eq!(mysql_kind("BOOLEAN"), TextKind::Bool);
        assert_eq!(mysql_kind("DECIMAL"), TextKind::Text);
        assert_eq!(mysql_kind("DATETIME"), TextKind::Text);
        assert_eq!(mysql_kind("VARCHAR"), TextKind::Text);
    }

    #[test]
    fn test_postgres_kinds() {
        assert_eq!(postgres_kind(Some(16)), TextKind::Bool);
        assert_eq!(postgres_kind(Some(23)), TextKind::Int);
        assert_eq!(postgres_kind(Some(701)), TextKind::Float);
        assert_eq!(postgres_kind(Some(1700)), TextKind::Text);
        assert_eq!(postgres_kind(None), TextKind::Text);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text(TextKind::Bool, "t".into()), Value::Bool(true));
        assert_eq!(parse_text(TextKind::Bool, "0".into()), Value::Bool(false));
        assert_eq!(parse_text(TextKind::Int, "-42".into()), Value::Int(-42));
        assert_eq!(parse_text(TextKind::Float, "1.25".into()), Value::Float(1.25));
        assert_eq!(parse_text(TextKind::Text, "12".into()), Value::Text("12".into()));
    }

    #[test]
    fn test_unsigned_overflow_stays_text() {
        assert_eq!(
            parse_text(TextKind::Int, "18446744073709551615".into()),
            Value::Text("18446744073709551615".into())
        );
    }
}
