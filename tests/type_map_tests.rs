use graphlink::column::ColumnDescriptor;
use graphlink::record::FieldType;
use graphlink::store::{type_codes as tc, ReadKind};
use graphlink::type_map::map_column;

fn descriptor(type_code: i32) -> ColumnDescriptor {
    ColumnDescriptor {
        type_code,
        signed: true,
        ..ColumnDescriptor::default()
    }
}

fn numeric(precision: i32, scale: i32) -> ColumnDescriptor {
    ColumnDescriptor {
        type_code: tc::NUMERIC,
        precision,
        scale,
        signed: true,
        ..ColumnDescriptor::default()
    }
}

#[test]
fn test_string_like_codes_map_to_text() {
    for code in [
        tc::LONGNVARCHAR,
        tc::NCHAR,
        tc::NVARCHAR,
        tc::LONGVARCHAR,
        tc::CHAR,
        tc::VARCHAR,
        tc::DATALINK,
        tc::CLOB,
        tc::SQLXML,
        tc::NCLOB,
    ] {
        let mapping = map_column(&descriptor(code)).expect("mapped");
        assert_eq!(mapping.field_type, FieldType::Text, "code {code}");
        assert_eq!(mapping.reader, Some(ReadKind::Text), "code {code}");
    }
}

#[test]
fn test_binary_codes_map_to_bytes_without_reader() {
    for code in [tc::LONGVARBINARY, tc::VARBINARY, tc::BINARY, tc::BLOB] {
        let mapping = map_column(&descriptor(code)).expect("mapped");
        assert_eq!(mapping.field_type, FieldType::Bytes, "code {code}");
        assert_eq!(mapping.reader, None, "code {code}");
    }
}

#[test]
fn test_integer_codes_respect_signedness() {
    let signed = map_column(&descriptor(tc::TINYINT)).expect("mapped");
    assert_eq!(signed.field_type, FieldType::Int8);

    let mut unsigned = descriptor(tc::TINYINT);
    unsigned.signed = false;
    assert_eq!(
        map_column(&unsigned).expect("mapped").field_type,
        FieldType::Int16
    );

    let mut unsigned = descriptor(tc::SMALLINT);
    unsigned.signed = false;
    assert_eq!(
        map_column(&unsigned).expect("mapped").field_type,
        FieldType::Int32
    );

    let mut unsigned = descriptor(tc::INTEGER);
    unsigned.signed = false;
    let mapping = map_column(&unsigned).expect("mapped");
    assert_eq!(mapping.field_type, FieldType::Int64);
    assert_eq!(mapping.reader, Some(ReadKind::I64));
}

#[test]
fn test_float_and_boolean_codes() {
    assert_eq!(
        map_column(&descriptor(tc::FLOAT)).expect("mapped").field_type,
        FieldType::Float64
    );
    assert_eq!(
        map_column(&descriptor(tc::DOUBLE)).expect("mapped").field_type,
        FieldType::Float64
    );
    assert_eq!(
        map_column(&descriptor(tc::REAL)).expect("mapped").reader,
        Some(ReadKind::F32)
    );
    assert_eq!(
        map_column(&descriptor(tc::BOOLEAN)).expect("mapped").field_type,
        FieldType::Boolean
    );
    assert_eq!(
        map_column(&descriptor(tc::BIT)).expect("mapped").field_type,
        FieldType::Int8
    );
}

#[test]
fn test_temporal_codes() {
    let date = map_column(&descriptor(tc::DATE)).expect("mapped");
    assert_eq!(date.field_type, FieldType::Date);
    assert_eq!(date.reader, Some(ReadKind::DateMillis));
    let time = map_column(&descriptor(tc::TIME)).expect("mapped");
    assert_eq!(time.field_type, FieldType::Time);
    let ts = map_column(&descriptor(tc::TIMESTAMP)).expect("mapped");
    assert_eq!(ts.reader, Some(ReadKind::TimestampMillis));
}

#[test]
fn test_numeric_precision_breakpoints() {
    assert_eq!(
        map_column(&numeric(18, 0)).expect("mapped").field_type,
        FieldType::Int64
    );
    assert_eq!(
        map_column(&numeric(10, 0)).expect("mapped").field_type,
        FieldType::Int64
    );
    assert_eq!(
        map_column(&numeric(9, 0)).expect("mapped").field_type,
        FieldType::Int32
    );
    assert_eq!(
        map_column(&numeric(5, 0)).expect("mapped").field_type,
        FieldType::Int32
    );
    assert_eq!(
        map_column(&numeric(4, 0)).expect("mapped").field_type,
        FieldType::Int16
    );
    assert_eq!(
        map_column(&numeric(3, 0)).expect("mapped").field_type,
        FieldType::Int16
    );
    assert_eq!(
        map_column(&numeric(2, 0)).expect("mapped").field_type,
        FieldType::Int8
    );
}

#[test]
fn test_numeric_with_positive_scale_is_float64() {
    let mapping = map_column(&numeric(10, 2)).expect("mapped");
    assert_eq!(mapping.field_type, FieldType::Float64);
    assert_eq!(mapping.reader, Some(ReadKind::F64));
}

#[test]
fn test_numeric_wide_or_negative_scale_is_decimal() {
    assert_eq!(
        map_column(&numeric(19, 0)).expect("mapped").field_type,
        FieldType::Decimal { scale: 0 }
    );
    assert_eq!(
        map_column(&numeric(10, -5)).expect("mapped").field_type,
        FieldType::Decimal { scale: -5 }
    );
}

#[test]
fn test_decimal_sentinel_scale_is_normalized() {
    let mut def = descriptor(tc::DECIMAL);
    def.scale = -127;
    assert_eq!(
        map_column(&def).expect("mapped").field_type,
        FieldType::Decimal { scale: 127 }
    );
    def.scale = 4;
    assert_eq!(
        map_column(&def).expect("mapped").field_type,
        FieldType::Decimal { scale: 4 }
    );
}

#[test]
fn test_null_and_unknown_codes_are_unsupported() {
    assert!(map_column(&descriptor(tc::NULL)).is_none());
    assert!(map_column(&descriptor(tc::OTHER)).is_none());
    assert!(map_column(&descriptor(tc::ROWID)).is_none());
    assert!(map_column(&descriptor(9999)).is_none());
}
