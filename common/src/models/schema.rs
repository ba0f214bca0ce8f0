//! Schema introspection models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of a listed relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    Table,
    View,
}

/// Basic information about a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Owning schema, when the dialect reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Relation kind.
    #[serde(rename = "type")]
    pub table_type: TableType,
    /// Approximate row count, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
}

impl TableInfo {
    /// A plain table with only its name known.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            table_type: TableType::Table,
            row_count: None,
        }
    }
}

/// Column metadata.
///
/// `type` is the dialect's own type string; it is not mapped onto a shared
/// taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
