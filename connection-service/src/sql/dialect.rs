//! Dialect-specific metadata statements and result mapping.

use common::errors::{AppError, AppResult};
use common::models::{ColumnInfo, DbType, Row, Value};
use common::response::Page;
use common::utils::SqlIdent;

/// Statement listing databases, or `None` when the dialect has a fixed answer.
pub fn list_databases_sql(dialect: &DbType) -> AppResult<Option<&'static str>> {
    match dialect {
        DbType::MySQL => Ok(Some("SHOW DATABASES")),
        DbType::Postgres => Ok(Some(
            "SELECT datname FROM pg_database WHERE datistemplate = false ORDER BY datname",
        )),
        DbType::SqlServer => Ok(Some("SELECT name FROM sys.databases ORDER BY name")),
        DbType::SQLite => Ok(None),
        other => Err(AppError::UnsupportedDialect(other.to_string())),
    }
}

/// Database list for dialects that do not query for it.
pub const SQLITE_DATABASES: [&str; 1] = ["main"];

/// Statements listing the tables of `database`.
///
/// The first element, when present, is a best-effort statement whose error
/// is ignored (MySQL switches its session database first).
pub fn list_tables_sql(dialect: &DbType, database: &str) -> AppResult<(Option<String>, String)> {
    match dialect {
        DbType::MySQL => {
            let db = SqlIdent::quote(dialect, database)?;
            Ok((Some(format!("USE {db}")), format!("SHOW TABLES FROM {db}")))
        }
        DbType::Postgres => Ok((
            None,
            "SELECT tablename as name FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename"
                .to_string(),
        )),
        DbType::SqlServer => Ok((
            None,
            "SELECT table_name as name FROM information_schema.tables WHERE table_type = 'BASE TABLE' ORDER BY table_name"
                .to_string(),
        )),
        DbType::SQLite => Ok((
            None,
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
                .to_string(),
        )),
        other => Err(AppError::UnsupportedDialect(other.to_string())),
    }
}

/// Statement describing the columns of `table`.
pub fn table_schema_sql(dialect: &DbType, table: &str) -> AppResult<String> {
    match dialect {
        DbType::MySQL => Ok(format!("DESCRIBE {}", SqlIdent::quote(dialect, table)?)),
        DbType::Postgres | DbType::SqlServer => Ok(format!(
            "SELECT column_name, data_type, is_nullable, column_default FROM information_schema.columns WHERE table_name = {} ORDER BY ordinal_position",
            SqlIdent::literal(table)?
        )),
        DbType::SQLite => Ok(format!(
            "PRAGMA table_info({})",
            SqlIdent::quote(dialect, table)?
        )),
        other => Err(AppError::UnsupportedDialect(other.to_string())),
    }
}

/// Statement reading one page of `table`.
pub fn table_data_sql(dialect: &DbType, table: &str, page: Page) -> AppResult<String> {
    Ok(format!(
        "SELECT * FROM {} LIMIT {} OFFSET {}",
        SqlIdent::quote(dialect, table)?,
        page.page_size,
        page.offset()
    ))
}

fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Text(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::Null => None,
    }
}

fn text_is(row: &Row, column: &str, expected: &str) -> bool {
    matches!(row.get(column), Some(Value::Text(s)) if s == expected)
}

fn int_is(row: &Row, column: &str, expected: i64) -> bool {
    matches!(row.get(column), Some(Value::Int(i)) if *i == expected)
}

/// Maps one row of the table-schema statement to a column description.
pub fn column_from_row(dialect: &DbType, row: &Row) -> ColumnInfo {
    match dialect {
        DbType::MySQL => ColumnInfo {
            name: text(row, "Field").unwrap_or_default(),
            data_type: text(row, "Type").unwrap_or_default(),
            nullable: text_is(row, "Null", "YES"),
            default_value: text(row, "Default"),
            is_primary_key: text_is(row, "Key", "PRI"),
            ..Default::default()
        },
        DbType::SQLite => ColumnInfo {
            name: text(row, "name").unwrap_or_default(),
            data_type: text(row, "type").unwrap_or_default(),
            nullable: int_is(row, "notnull", 0),
            default_value: text(row, "dflt_value"),
            is_primary_key: int_is(row, "pk", 1),
            ..Default::default()
        },
        _ => ColumnInfo {
            name: text(row, "column_name").unwrap_or_default(),
            data_type: text(row, "data_type").unwrap_or_default(),
            nullable: text_is(row, "is_nullable", "YES"),
            default_value: text(row, "column_default"),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_list_databases_statements() {
        assert_eq!(
            list_databases_sql(&DbType::MySQL).unwrap(),
            Some("SHOW DATABASES")
        );
        assert_eq!(list_databases_sql(&DbType::SQLite).unwrap(), None);
        assert!(list_databases_sql(&DbType::MongoDB).is_err());
    }

    #[test]
    fn test_mysql_list_tables_quotes_database() {
        let (prelude, sql) = list_tables_sql(&DbType::MySQL, "shop").unwrap();
        assert_eq!(prelude.as_deref(), Some("USE `shop`"));
        assert_eq!(sql, "SHOW TABLES FROM `shop`");

        let (_, sql) = list_tables_sql(&DbType::MySQL, "a`b").unwrap();
        assert_eq!(sql, "SHOW TABLES FROM `a``b`");
    }

    #[test]
    fn test_table_schema_statements() {
        assert_eq!(
            table_schema_sql(&DbType::MySQL, "users").unwrap(),
            "DESCRIBE `users`"
        );
        assert_eq!(
            table_schema_sql(&DbType::SQLite, "t").unwrap(),
            "PRAGMA table_info(\"t\")"
        );
        let pg = table_schema_sql(&DbType::Postgres, "it's").unwrap();
        assert!(pg.contains("table_name = 'it''s'"));
    }

    #[test]
    fn test_table_data_paging() {
        let page = Page {
            page: 2,
            page_size: 10,
        };
        assert_eq!(
            table_data_sql(&DbType::SQLite, "t", page).unwrap(),
            "SELECT * FROM \"t\" LIMIT 10 OFFSET 10"
        );
    }

    #[test]
    fn test_mysql_column_mapping() {
        let col = column_from_row(
            &DbType::MySQL,
            &row(&[
                ("Field", Value::Text("id".into())),
                ("Type", Value::Text("int".into())),
                ("Null", Value::Text("NO".into())),
                ("Key", Value::Text("PRI".into())),
                ("Default", Value::Null),
            ]),
        );
        assert_eq!(col.name, "id");
        assert!(!col.nullable);
        assert!(col.is_primary_key);
        assert!(col.default_value.is_none());
        assert!(!col.is_foreign_key);
    }

    #[test]
    fn test_sqlite_column_mapping() {
        let col = column_from_row(
            &DbType::SQLite,
            &row(&[
                ("cid", Value::Int(0)),
                ("name", Value::Text("a".into())),
                ("type", Value::Text("INT".into())),
                ("notnull", Value::Int(0)),
                ("dflt_value", Value::Text("'x'".into())),
                ("pk", Value::Int(1)),
            ]),
        );
        assert!(col.nullable);
        assert!(col.is_primary_key);
        assert_eq!(col.default_value.as_deref(), Some("'x'"));
    }

    #[test]
    fn test_information_schema_column_mapping() {
        let col = column_from_row(
            &DbType::Postgres,
            &row(&[
                ("column_name", Value::Text("email".into())),
                ("data_type", Value::Text("text".into())),
                ("is_nullable", Value::Text("YES".into())),
                ("column_default", Value::Null),
            ]),
        );
        assert_eq!(col.data_type, "text");
        assert!(col.nullable);
        assert!(!col.is_primary_key);
    }
}
