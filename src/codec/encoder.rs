//! Encoding tabular data into upload envelopes
//!
//! Each function here is pure apart from `inject_record_id`, which mutates
//! the envelope it is handed.

use super::types::{TabularInput, UploadData, UploadEnvelope};
use crate::error::{Error, Result};
use crate::http::TransportResponse;
use crate::ids::{self, IdKind};
use crate::types::{JsonValue, Row, BATCH_LIMIT};
use tracing::debug;

/// Normalize any tabular shape to an ordered list of rows
pub fn normalize(input: &TabularInput) -> Result<Vec<Row>> {
    match input {
        TabularInput::SingleRow(row) => Ok(vec![row.clone()]),
        TabularInput::RowSequence(rows) => Ok(rows.clone()),
        TabularInput::ColumnarRows(columns) => {
            let Some(count) = input.row_count() else {
                let lengths = columns
                    .iter()
                    .map(|(column, values)| format!("{column}={}", values.len()))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::invalid_upload(format!(
                    "columns have inconsistent lengths ({lengths})"
                )));
            };

            let rows = (0..count)
                .map(|i| {
                    columns
                        .iter()
                        .map(|(column, values)| (column.clone(), values[i].clone()))
                        .collect::<Row>()
                })
                .collect();
            Ok(rows)
        }
    }
}

/// Encode tabular data into envelopes of at most [`BATCH_LIMIT`] records
pub fn encode(input: &TabularInput, typecast: bool) -> Result<Vec<UploadEnvelope>> {
    let rows = normalize(input)?;
    let envelopes: Vec<UploadEnvelope> = rows
        .chunks(BATCH_LIMIT)
        .map(|chunk| UploadEnvelope::from_rows(chunk.iter().cloned(), typecast))
        .collect();

    debug!(
        "Encoded {} row(s) into {} envelope(s)",
        rows.len(),
        envelopes.len()
    );
    Ok(envelopes)
}

/// Decode data for update/replace into exactly one envelope
///
/// `typecast` only applies to tabular data; serialized and prebuilt
/// envelopes keep their own flag.
pub fn decode_existing(raw: &UploadData, typecast: bool) -> Result<UploadEnvelope> {
    match raw {
        UploadData::Serialized(text) => serde_json::from_str(text).map_err(|e| {
            Error::unsupported_format(format!("not a serialized record envelope: {e}"))
        }),
        UploadData::Envelope(envelope) => Ok(envelope.clone()),
        UploadData::Tabular(input) => {
            let mut envelopes = encode(input, typecast)?;
            match envelopes.len() {
                1 => Ok(envelopes.remove(0)),
                0 => Err(Error::unsupported_format("no records to upload")),
                n => Err(Error::unsupported_format(format!(
                    "data spans {n} batches; at most {BATCH_LIMIT} records can be sent at once"
                ))),
            }
        }
    }
}

/// Set the ID of the record at `index` so the request addresses an existing record
///
/// The envelope is left untouched when validation fails.
pub fn inject_record_id(envelope: &mut UploadEnvelope, record_id: &str, index: usize) -> Result<()> {
    ids::validate(record_id, IdKind::RecordId)?;

    let len = envelope.records.len();
    let record = envelope
        .records
        .get_mut(index)
        .ok_or(Error::IndexOutOfRange { index, len })?;
    record.id = Some(record_id.to_string());
    Ok(())
}

/// Collect record IDs from create/update/delete responses, in response order
pub fn record_ids(responses: &[TransportResponse]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for response in responses {
        let body: JsonValue = response.json()?;
        let records = body
            .get("records")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::decode("response has no 'records' array"))?;

        for record in records {
            let id = record
                .get("id")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| Error::decode(format!("record without an 'id': {record}")))?;
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}
