use graphlink::config::{PrimaryKeyMode, SinkConfig};
use graphlink::errors::GraphLinkError;
use graphlink::memory_store::{BoundParam, MemoryStore};
use graphlink::query_build::generate_query;
use graphlink::record::{
    DynamicMap, FieldType, FieldValue, RecordSchema, RecordValue, SinkRecord, StructData,
};

fn vertex_record(fields: &[(&str, FieldType)], values: &[(&str, FieldValue)]) -> SinkRecord {
    let mut schema = RecordSchema::new("value").with_field("p_type", FieldType::Text);
    for (name, field_type) in fields {
        schema = schema.with_field(*name, *field_type);
    }
    let mut data = StructData::new(schema)
        .set("p_type", FieldValue::Text("person".to_string()))
        .expect("set");
    for (name, value) in values {
        data = data.set(name, value.clone()).expect("set");
    }
    SinkRecord {
        topic: "events".to_string(),
        key: None,
        value: RecordValue::Structured(data),
    }
}

fn run(record: &SinkRecord, config: &SinkConfig) -> Result<MemoryStore, GraphLinkError> {
    let store = MemoryStore::new();
    let upsert = generate_query(record, config)?;
    upsert.run(&store, config)?;
    Ok(store)
}

#[test]
fn test_float64_values_narrow_to_i32() {
    let record = vertex_record(
        &[("score", FieldType::Float64)],
        &[("score", FieldValue::Float64(3.9))],
    );
    let store = run(&record, &SinkConfig::default()).expect("write");
    let executed = store.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].params, vec![(1, BoundParam::I32(3))]);
}

#[test]
fn test_missing_values_bind_null() {
    let record = vertex_record(&[("name", FieldType::Text)], &[]);
    let store = run(&record, &SinkConfig::default()).expect("write");
    assert_eq!(store.executed()[0].params, vec![(1, BoundParam::Null)]);
}

#[test]
fn test_logical_types_bind_before_primitives() {
    let record = vertex_record(
        &[
            ("price", FieldType::Decimal { scale: 2 }),
            ("born", FieldType::Date),
            ("at", FieldType::Timestamp),
        ],
        &[
            ("price", FieldValue::Decimal("12.34".to_string())),
            ("born", FieldValue::Date(86_400_000)),
            ("at", FieldValue::Timestamp(1_700_000_000_000)),
        ],
    );
    let store = run(&record, &SinkConfig::default()).expect("write");
    assert_eq!(
        store.executed()[0].params,
        vec![
            (1, BoundParam::Decimal("12.34".to_string())),
            (2, BoundParam::Date(86_400_000)),
            (3, BoundParam::Timestamp(1_700_000_000_000)),
        ]
    );
}

#[test]
fn test_integer_widths_all_travel_as_i32() {
    let record = vertex_record(
        &[
            ("a", FieldType::Int8),
            ("b", FieldType::Int16),
            ("c", FieldType::Int64),
        ],
        &[
            ("a", FieldValue::Int8(-3)),
            ("b", FieldValue::Int16(600)),
            ("c", FieldValue::Int64(1_234_567)),
        ],
    );
    let store = run(&record, &SinkConfig::default()).expect("write");
    assert_eq!(
        store.executed()[0].params,
        vec![
            (1, BoundParam::I32(-3)),
            (2, BoundParam::I32(600)),
            (3, BoundParam::I32(1_234_567)),
        ]
    );
}

#[test]
fn test_key_fields_bind_before_nonkey_fields() {
    let record = vertex_record(
        &[("name", FieldType::Text), ("age", FieldType::Int32)],
        &[
            ("name", FieldValue::Text("Ada".to_string())),
            ("age", FieldValue::Int32(36)),
        ],
    );
    let config = SinkConfig {
        pk_mode: PrimaryKeyMode::RecordValue,
        pk_fields: vec!["age".to_string()],
        ..SinkConfig::default()
    };
    let store = run(&record, &config).expect("write");
    assert_eq!(
        store.executed()[0].params,
        vec![
            (1, BoundParam::I32(36)),
            (2, BoundParam::Text("Ada".to_string())),
        ]
    );
}

#[test]
fn test_dynamic_record_binds_id_first_as_string() {
    let mut map = DynamicMap::new();
    map.insert("v_bar_type".to_string(), serde_json::json!("bar"));
    map.insert("v_id".to_string(), serde_json::json!(3));
    map.insert("name".to_string(), serde_json::json!("Bar_0"));
    map.insert("flag".to_string(), serde_json::json!(true));
    let record = SinkRecord {
        topic: "events".to_string(),
        key: None,
        value: RecordValue::Dynamic(map),
    };
    let store = run(&record, &SinkConfig::default()).expect("write");
    assert_eq!(
        store.executed()[0].params,
        vec![
            (1, BoundParam::Text("3".to_string())),
            (2, BoundParam::Text("Bar_0".to_string())),
            (3, BoundParam::Bool(true)),
        ]
    );
}

#[test]
fn test_dynamic_numbers_narrow_to_i32() {
    let mut map = DynamicMap::new();
    map.insert("v_bar_type".to_string(), serde_json::json!("bar"));
    map.insert("count".to_string(), serde_json::json!(42));
    map.insert("ratio".to_string(), serde_json::json!(2.7));
    let record = SinkRecord {
        topic: "events".to_string(),
        key: None,
        value: RecordValue::Dynamic(map),
    };
    let store = run(&record, &SinkConfig::default()).expect("write");
    assert_eq!(
        store.executed()[0].params,
        vec![(1, BoundParam::I32(42)), (2, BoundParam::I32(2))]
    );
}

#[test]
fn test_bytes_fields_are_unsupported() {
    let record = vertex_record(
        &[("payload", FieldType::Bytes)],
        &[("payload", FieldValue::Bytes(vec![1, 2, 3]))],
    );
    let err = run(&record, &SinkConfig::default()).expect_err("must fail");
    assert!(matches!(err, GraphLinkError::UnsupportedType(_)));
    assert_eq!(err.to_string(), "unsupported source data type: BYTES");
}
