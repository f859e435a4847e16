//! Dynamic configuration
//!
//! The typed store, its per-key setter table and the local document reader.

pub mod document;
pub(crate) mod setters;
pub mod store;

pub use document::{parse_document, read_document};
pub use setters::{extract_sql_error_codes, parse_bool, validate_rasp_id};
pub use store::{ConfigStore, LoadReport};
