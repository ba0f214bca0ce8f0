//! Unique ID generator.

use uuid::Uuid;

/// Generates opaque identifiers.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a connection ID (UUID v4, hyphenated).
    pub fn connection_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Generates a request ID.
    pub fn request_id() -> String {
        Uuid::new_v4().to_string()
    }
}
