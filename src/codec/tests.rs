//! Tests for the codec module

use super::*;
use crate::error::Error;
use crate::http::TransportResponse;
use crate::types::{Row, BATCH_LIMIT};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;

const RECORD_ID: &str = "recABCDEFGHIJKLMN";

fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn numbered_rows(n: usize) -> Vec<Row> {
    (0..n).map(|i| row(json!({"n": i}))).collect()
}

// ============================================================================
// Encoding Tests
// ============================================================================

#[test]
fn test_encode_single_row() {
    let input = TabularInput::SingleRow(row(json!({"A": 1, "B": 2})));

    let envelopes = encode(&input, true).unwrap();

    assert_eq!(envelopes.len(), 1);
    assert_eq!(
        envelopes[0].to_json().unwrap(),
        json!({"records": [{"fields": {"A": 1, "B": 2}}], "typecast": true})
    );
}

#[test]
fn test_encode_respects_typecast_flag() {
    let input = TabularInput::RowSequence(vec![row(json!({"A": 1, "B": 2}))]);

    let envelopes = encode(&input, false).unwrap();

    assert_eq!(
        envelopes[0].to_json().unwrap(),
        json!({"records": [{"fields": {"A": 1, "B": 2}}], "typecast": false})
    );
}

#[test]
fn test_encode_chunks_to_batch_limit() {
    let input = TabularInput::RowSequence(numbered_rows(25));

    let envelopes = encode(&input, true).unwrap();

    let sizes: Vec<usize> = envelopes.iter().map(UploadEnvelope::len).collect();
    assert_eq!(sizes, vec![10, 10, 5]);

    let order: Vec<i64> = envelopes
        .iter()
        .flat_map(|e| e.records.iter())
        .map(|r| r.fields["n"].as_i64().unwrap())
        .collect();
    assert_eq!(order, (0..25).collect::<Vec<i64>>());
}

#[test]
fn test_encode_exact_multiple_of_batch_limit() {
    let input = TabularInput::RowSequence(numbered_rows(BATCH_LIMIT * 2));
    let envelopes = encode(&input, true).unwrap();
    assert_eq!(envelopes.len(), 2);
    assert!(envelopes.iter().all(|e| e.len() == BATCH_LIMIT));
}

#[test]
fn test_encode_empty_input_yields_no_envelopes() {
    let input = TabularInput::RowSequence(Vec::new());
    assert!(encode(&input, true).unwrap().is_empty());
}

#[test]
fn test_encode_columnar_zips_by_position() {
    let mut columns = BTreeMap::new();
    columns.insert("name".to_string(), vec![json!("Alice"), json!("Bob")]);
    columns.insert("age".to_string(), vec![json!(30), json!(41)]);
    let input = TabularInput::ColumnarRows(columns);

    let rows = normalize(&input).unwrap();

    assert_eq!(
        rows,
        vec![
            row(json!({"name": "Alice", "age": 30})),
            row(json!({"name": "Bob", "age": 41})),
        ]
    );
}

#[test]
fn test_encode_columnar_rejects_mismatched_lengths() {
    let mut columns = BTreeMap::new();
    columns.insert("name".to_string(), vec![json!("Alice"), json!("Bob")]);
    columns.insert("age".to_string(), vec![json!(30)]);
    let input = TabularInput::ColumnarRows(columns);

    let err = encode(&input, true).unwrap_err();
    assert!(matches!(err, Error::InvalidUploadFormat { .. }));
}

// ============================================================================
// Shape Classification Tests
// ============================================================================

#[test]
fn test_tabular_from_json_shapes() {
    let single = TabularInput::try_from(json!({"A": 1, "B": "x"})).unwrap();
    assert!(matches!(single, TabularInput::SingleRow(_)));

    let columnar = TabularInput::try_from(json!({"A": [1, 2], "B": [3, 4]})).unwrap();
    assert_eq!(columnar.row_count(), Some(2));

    let rows = TabularInput::try_from(json!([{"A": 1}, {"A": 2}, {"A": 3}])).unwrap();
    assert_eq!(rows.row_count(), Some(3));
}

#[test]
fn test_tabular_from_json_rejects_mixed_and_scalars() {
    let mixed = TabularInput::try_from(json!({"A": [1, 2], "B": 3})).unwrap_err();
    assert!(matches!(mixed, Error::InvalidUploadFormat { .. }));

    let scalar = TabularInput::try_from(json!(42)).unwrap_err();
    assert!(matches!(scalar, Error::InvalidUploadFormat { .. }));

    let bad_row = TabularInput::try_from(json!([{"A": 1}, "oops"])).unwrap_err();
    assert!(matches!(bad_row, Error::InvalidUploadFormat { .. }));
}

// ============================================================================
// decode_existing Tests
// ============================================================================

#[test]
fn test_decode_existing_serialized() {
    let raw = UploadData::from(r#"{"records": [{"fields": {"A": 1}}], "typecast": false}"#);

    let envelope = decode_existing(&raw, true).unwrap();

    assert_eq!(envelope.len(), 1);
    assert_eq!(envelope.typecast, Some(false));
    assert_eq!(envelope.records[0].fields["A"], json!(1));
}

#[test]
fn test_decode_existing_keeps_unmodelled_keys() {
    let document = json!({
        "records": [{"fields": {"Name": "Ada"}, "createdTime": "2024-01-01T00:00:00.000Z"}],
        "performUpsert": {"fieldsToMergeOn": ["Name"]}
    });
    let raw = UploadData::from(document.to_string());

    let envelope = decode_existing(&raw, true).unwrap();

    assert_eq!(envelope.typecast, None);
    assert_eq!(envelope.to_json().unwrap(), document);

    let with_id = envelope.with_record_id(RECORD_ID, 0).unwrap();
    let body = with_id.to_json().unwrap();
    assert_eq!(body["performUpsert"], document["performUpsert"]);
    assert_eq!(body["records"][0]["id"], RECORD_ID);
    assert_eq!(body["records"][0]["createdTime"], "2024-01-01T00:00:00.000Z");
}

#[test]
fn test_decode_existing_rejects_garbage() {
    let err = decode_existing(&UploadData::from("not json"), true).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDataFormat { .. }));

    let err = decode_existing(&UploadData::from(r#"{"fields": {"A": 1}}"#), true).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDataFormat { .. }));
}

#[test]
fn test_decode_existing_single_row() {
    let raw = UploadData::from(row(json!({"Status": "Done"})));
    let envelope = decode_existing(&raw, true).unwrap();
    assert_eq!(
        envelope,
        UploadEnvelope::from_rows(vec![row(json!({"Status": "Done"}))], true)
    );
}

#[test]
fn test_decode_existing_rejects_multiple_batches() {
    let raw = UploadData::from(numbered_rows(11));
    let err = decode_existing(&raw, true).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDataFormat { .. }));
}

// ============================================================================
// Record ID Injection Tests
// ============================================================================

#[test]
fn test_inject_record_id() {
    let mut envelope = UploadEnvelope::from_rows(vec![row(json!({"A": 1}))], true);

    inject_record_id(&mut envelope, RECORD_ID, 0).unwrap();

    assert_eq!(envelope.records[0].id.as_deref(), Some(RECORD_ID));
    assert_eq!(envelope.records[0].fields, row(json!({"A": 1})));
    assert_eq!(
        envelope.to_json().unwrap(),
        json!({"records": [{"id": RECORD_ID, "fields": {"A": 1}}], "typecast": true})
    );
}

#[test]
fn test_inject_record_id_invalid_leaves_envelope_unchanged() {
    let mut envelope = UploadEnvelope::from_rows(vec![row(json!({"A": 1}))], true);
    let before = envelope.clone();

    let err = inject_record_id(&mut envelope, "recTooShort", 0).unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier { .. }));
    assert_eq!(envelope, before);
}

#[test]
fn test_inject_record_id_out_of_range() {
    let mut envelope = UploadEnvelope::from_rows(vec![row(json!({"A": 1}))], true);

    let err = inject_record_id(&mut envelope, RECORD_ID, 1).unwrap_err();

    assert!(matches!(err, Error::IndexOutOfRange { index: 1, len: 1 }));
    assert!(envelope.records[0].id.is_none());
}

#[test]
fn test_with_record_id_targets_index() {
    let envelope = UploadEnvelope::from_rows(numbered_rows(3), true)
        .with_record_id(RECORD_ID, 2)
        .unwrap();

    assert!(envelope.records[0].id.is_none());
    assert_eq!(envelope.records[2].id.as_deref(), Some(RECORD_ID));
}

// ============================================================================
// Response Tests
// ============================================================================

#[test]
fn test_record_ids_across_responses() {
    let responses = vec![
        TransportResponse::new(
            200,
            json!({"records": [{"id": "rec1"}, {"id": "rec2"}]}).to_string(),
        ),
        TransportResponse::new(200, json!({"records": [{"id": "rec3", "deleted": true}]}).to_string()),
    ];

    assert_eq!(record_ids(&responses).unwrap(), vec!["rec1", "rec2", "rec3"]);
}

#[test]
fn test_record_ids_missing_records() {
    let responses = vec![TransportResponse::new(422, json!({"error": "INVALID"}).to_string())];
    let err = record_ids(&responses).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}
