//! API response bodies.
//!
//! The REST surface returns bare JSON payloads; the types here cover the
//! small envelopes that are not part of the data model.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Outcome of an action endpoint (delete, disconnect, test).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    /// Whether the action succeeded.
    pub success: bool,

    /// Failure reason (only for the connection test).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    /// A successful action.
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed action carrying its reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Health check payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Paging query string for table data.
///
/// Values that fail to parse fall back to zero, so `page=abc` behaves like
/// `page=0`; missing values use the defaults (page 1, 100 rows).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Rows per page.
    pub page_size: Option<String>,
}

/// Resolved paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
}

impl Page {
    /// Row offset of the first row on this page, clamped to the `i64` range.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        let parse = |raw: Option<String>, default: i64| match raw {
            Some(v) => v.trim().parse().unwrap_or(0),
            None => default,
        };
        Self {
            page: parse(params.page, DEFAULT_PAGE),
            page_size: parse(params.page_size, DEFAULT_PAGE_SIZE),
        }
    }
}
