//! Identifier and literal quoting for generated metadata statements.
//!
//! Database and table names reach the SQL text by interpolation, so every
//! name goes through one of these routines first. The quoting neutralizes
//! delimiter characters but the statements are still built by string
//! concatenation.

use crate::errors::{AppError, AppResult};
use crate::models::DbType;

/// Quotes identifiers and string literals per dialect.
pub struct SqlIdent;

impl SqlIdent {
    /// Quotes `name` as an identifier for `dialect`.
    ///
    /// MySQL uses backticks, SQL Server brackets, PostgreSQL and SQLite double
    /// quotes. Embedded delimiters are doubled.
    pub fn quote(dialect: &DbType, name: &str) -> AppResult<String> {
        Self::check(name)?;
        Ok(match dialect {
            DbType::MySQL => Self::wrap(name, '`', '`'),
            DbType::SqlServer => Self::wrap(name, '[', ']'),
            _ => Self::wrap(name, '"', '"'),
        })
    }

    /// Quotes `value` as a single-quoted string literal.
    pub fn literal(value: &str) -> AppResult<String> {
        Self::check(value)?;
        Ok(Self::wrap(value, '\'', '\''))
    }

    fn check(name: &str) -> AppResult<()> {
        if name.is_empty() {
            return Err(AppError::Validation("identifier must not be empty".into()));
        }
        if name.contains('\0') {
            return Err(AppError::Validation(
                "identifier must not contain NUL characters".into(),
            ));
        }
        Ok(())
    }

    fn wrap(name: &str, open: char, close: char) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }
}
