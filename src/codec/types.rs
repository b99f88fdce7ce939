//! Codec types
//!
//! Defines the tabular input shapes and the on-wire upload envelope.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tabular data accepted for upload
#[derive(Debug, Clone, PartialEq)]
pub enum TabularInput {
    /// One row: `{column: value, ...}`
    SingleRow(Row),
    /// Columns of equal length, aligned by position: `{column: [v1, v2, ...], ...}`
    ColumnarRows(BTreeMap<String, Vec<JsonValue>>),
    /// Ordered rows: `[{column: value}, ...]`
    RowSequence(Vec<Row>),
}

impl TabularInput {
    /// Number of rows this input normalizes to, if the shape is consistent
    pub fn row_count(&self) -> Option<usize> {
        match self {
            TabularInput::SingleRow(_) => Some(1),
            TabularInput::RowSequence(rows) => Some(rows.len()),
            TabularInput::ColumnarRows(columns) => {
                let mut lengths = columns.values().map(Vec::len);
                let first = lengths.next().unwrap_or(0);
                lengths.all(|len| len == first).then_some(first)
            }
        }
    }
}

impl From<Row> for TabularInput {
    fn from(row: Row) -> Self {
        TabularInput::SingleRow(row)
    }
}

impl From<Vec<Row>> for TabularInput {
    fn from(rows: Vec<Row>) -> Self {
        TabularInput::RowSequence(rows)
    }
}

impl From<BTreeMap<String, Vec<JsonValue>>> for TabularInput {
    fn from(columns: BTreeMap<String, Vec<JsonValue>>) -> Self {
        TabularInput::ColumnarRows(columns)
    }
}

impl TryFrom<JsonValue> for TabularInput {
    type Error = Error;

    /// Classify a JSON value by shape.
    ///
    /// An object whose values are all arrays is columnar; an object without any
    /// array values is a single row. Objects mixing the two are rejected, since
    /// a multi-value cell cannot be told apart from a column.
    fn try_from(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => {
                if !map.values().any(JsonValue::is_array) {
                    return Ok(TabularInput::SingleRow(map));
                }
                let mut columns = BTreeMap::new();
                for (column, values) in map {
                    let JsonValue::Array(values) = values else {
                        return Err(Error::invalid_upload(format!(
                            "column '{column}' is a scalar among list columns; \
                             use ColumnarRows or SingleRow explicitly"
                        )));
                    };
                    columns.insert(column, values);
                }
                Ok(TabularInput::ColumnarRows(columns))
            }
            JsonValue::Array(items) => {
                let rows = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        JsonValue::Object(row) => Ok(row),
                        other => Err(Error::invalid_upload(format!(
                            "row {i} is not an object: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TabularInput::RowSequence(rows))
            }
            other => Err(Error::invalid_upload(format!(
                "expected an object or a list of objects, got {other}"
            ))),
        }
    }
}

/// One record inside an upload envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Record ID, present when updating or replacing an existing record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field values keyed by column name
    #[serde(default)]
    pub fields: Row,
    /// Any other record-level keys, passed through untouched
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl UploadRecord {
    /// Create a record with no ID
    pub fn new(fields: Row) -> Self {
        Self {
            id: None,
            fields,
            extra: JsonObject::new(),
        }
    }
}

/// The `{records, typecast}` body of create/update/replace requests
///
/// Keys this type does not model (e.g. `performUpsert`) are kept in `extra`
/// and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEnvelope {
    pub records: Vec<UploadRecord>,
    /// Absent in caller-supplied envelopes that omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typecast: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl UploadEnvelope {
    /// Build an envelope from rows
    pub fn from_rows(rows: impl IntoIterator<Item = Row>, typecast: bool) -> Self {
        Self {
            records: rows.into_iter().map(UploadRecord::new).collect(),
            typecast: Some(typecast),
            extra: JsonObject::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return this envelope with `record_id` set on the record at `index`
    pub fn with_record_id(mut self, record_id: &str, index: usize) -> Result<Self> {
        super::inject_record_id(&mut self, record_id, index)?;
        Ok(self)
    }

    /// Serialize to the JSON request body
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Data accepted by push/update/replace
#[derive(Debug, Clone, PartialEq)]
pub enum UploadData {
    /// A pre-serialized envelope
    Serialized(String),
    /// An already-built envelope
    Envelope(UploadEnvelope),
    /// Tabular data to encode
    Tabular(TabularInput),
}

impl From<TabularInput> for UploadData {
    fn from(input: TabularInput) -> Self {
        UploadData::Tabular(input)
    }
}

impl From<UploadEnvelope> for UploadData {
    fn from(envelope: UploadEnvelope) -> Self {
        UploadData::Envelope(envelope)
    }
}

impl From<Row> for UploadData {
    fn from(row: Row) -> Self {
        UploadData::Tabular(TabularInput::SingleRow(row))
    }
}

impl From<Vec<Row>> for UploadData {
    fn from(rows: Vec<Row>) -> Self {
        UploadData::Tabular(TabularInput::RowSequence(rows))
    }
}

impl From<String> for UploadData {
    fn from(raw: String) -> Self {
        UploadData::Serialized(raw)
    }
}

impl From<&str> for UploadData {
    fn from(raw: &str) -> Self {
        UploadData::Serialized(raw.to_string())
    }
}
