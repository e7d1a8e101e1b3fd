//! SOQL query results

pub mod result;

pub use result::{QueryResult, Record, field_text};
