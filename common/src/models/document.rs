//! Document-store request models.
//!
//! Only the request shape exists; no document backend is implemented.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A schemaless document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Request body for a document find.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DocumentFindRequest {
    /// ID of the connection to use.
    #[serde(default)]
    pub connection_id: String,
    /// Database name.
    #[serde(default)]
    pub database: String,
    /// Collection name.
    #[serde(default)]
    pub collection: String,
    /// Query filter.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filter: Document,
}
