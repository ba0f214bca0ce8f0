//! Utility functions and helpers.

pub mod id_generator;
pub mod sql_ident;

pub use id_generator::IdGenerator;
pub use sql_ident::SqlIdent;
