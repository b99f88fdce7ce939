//! Record codec module
//!
//! Converts tabular data into the API's upload envelope and back.
//!
//! # Overview
//!
//! Tabular input comes in three shapes (one row, columns of values, or a list
//! of rows). Every shape is normalized to a list of rows, chunked to the API's
//! batch limit, and wrapped as `{"records": [{"fields": ...}], "typecast": ...}`.

mod encoder;
mod types;

pub use encoder::{decode_existing, encode, inject_record_id, normalize, record_ids};
pub use types::{TabularInput, UploadData, UploadEnvelope, UploadRecord};

#[cfg(test)]
mod tests;
