use graphlink::config::SourceConfig;
use graphlink::memory_store::{BoundParam, MemoryColumn, MemoryColumns, MemoryStore};
use graphlink::record::FieldValue;
use graphlink::source::SourceTask;
use graphlink::store::type_codes as tc;

fn people_columns() -> MemoryColumns {
    MemoryColumns::new(vec![
        MemoryColumn::new("p_id", tc::VARCHAR).in_table("person"),
        MemoryColumn::new("age", tc::INTEGER).in_table("person"),
        MemoryColumn::new("updated", tc::VARCHAR).in_table("person"),
    ])
}

fn people_row(id: &str, age: i32, updated: &str) -> Vec<Option<FieldValue>> {
    vec![
        Some(FieldValue::Text(id.to_string())),
        Some(FieldValue::Int32(age)),
        Some(FieldValue::Text(updated.to_string())),
    ]
}

fn people_config() -> SourceConfig {
    SourceConfig {
        topic: "events".to_string(),
        query: "run people(pattern)".to_string(),
        query_pattern: "?".to_string(),
        query_args: vec!["7".to_string()],
        ..SourceConfig::default()
    }
}

#[test]
fn test_poll_emits_one_record_per_row() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![
            people_row("p1", 31, "2024-Jan-02 03:04:05"),
            people_row("p2", 52, "2024-Jan-03 03:04:05"),
        ],
    );
    let mut task = SourceTask::new(&store, people_config(), None).expect("task");
    let records = task.poll().expect("poll");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].topic, "events");
    assert_eq!(records[0].partition, ("query".to_string(), "people".to_string()));
    assert_eq!(
        records[0].get("p_id"),
        Some(&FieldValue::Text("p1".to_string()))
    );
    assert_eq!(records[1].get("age"), Some(&FieldValue::Int32(52)));
}

#[test]
fn test_every_record_carries_the_table_constant() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![people_row("p1", 31, "2024-Jan-02 03:04:05")],
    );
    let mut task = SourceTask::new(&store, people_config(), None).expect("task");
    let records = task.poll().expect("poll");
    assert_eq!(
        records[0].get("p_type"),
        Some(&FieldValue::Text("person".to_string()))
    );
}

#[test]
fn test_template_expansion_repeats_pattern_per_argument() {
    let store = MemoryStore::new();
    let mut config = people_config();
    config.query_args = vec!["7".to_string(), "9".to_string()];
    let mut task = SourceTask::new(&store, config, None).expect("task");
    task.poll().expect("poll");
    let executed = store.executed();
    assert_eq!(executed[0].sql, "run people(?,?)");
    assert_eq!(
        executed[0].params,
        vec![(1, BoundParam::I32(7)), (2, BoundParam::I32(9))]
    );
}

#[test]
fn test_non_numeric_argument_is_a_parse_error() {
    let store = MemoryStore::new();
    let mut config = people_config();
    config.query_args = vec!["seven".to_string()];
    let mut task = SourceTask::new(&store, config, None).expect("task");
    let err = task.poll().expect_err("must fail");
    assert!(err.to_string().contains("seven"));
}

#[test]
fn test_watermark_binds_escaped_after_arguments() {
    let store = MemoryStore::new();
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let persisted = Some("2024-Jan-02 03:04:05".to_string());
    let mut task = SourceTask::new(&store, config, persisted).expect("task");
    task.poll().expect("poll");
    let executed = store.executed();
    assert_eq!(
        executed[0].params,
        vec![
            (1, BoundParam::I32(7)),
            (2, BoundParam::Text("2024-Jan-02%2003%3A04%3A05".to_string())),
        ]
    );
}

#[test]
fn test_watermark_advances_to_newest_row() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![
            people_row("p1", 31, "2024-Jan-02 03:04:05"),
            people_row("p2", 52, "2024-Feb-01 00:00:00"),
            people_row("p3", 44, "2024-Jan-15 08:00:00"),
        ],
    );
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let persisted = Some("2024-Jan-01 00:00:00".to_string());
    let mut task = SourceTask::new(&store, config, persisted).expect("task");
    task.poll().expect("poll");
    assert_eq!(task.watermark(), "2024-Feb-01 00:00:00");
}

#[test]
fn test_unparsable_timestamps_do_not_move_the_watermark() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![people_row("p1", 31, "not a timestamp")],
    );
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let persisted = Some("2024-Jan-02 03:04:05".to_string());
    let mut task = SourceTask::new(&store, config, persisted).expect("task");
    let records = task.poll().expect("poll");
    assert_eq!(records.len(), 1);
    assert_eq!(task.watermark(), "2024-Jan-02 03:04:05");
}

#[test]
fn test_fresh_task_starts_the_watermark_at_current_time() {
    let store = MemoryStore::new();
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let mut task = SourceTask::new(&store, config, None).expect("task");
    let mark = task.watermark().to_string();
    assert!(chrono::NaiveDateTime::parse_from_str(&mark, "%Y-%b-%d %H:%M:%S").is_ok());
    task.poll().expect("poll");
    let escaped = mark.replace(' ', "%20").replace(':', "%3A");
    assert_eq!(
        store.executed()[0].params,
        vec![(1, BoundParam::I32(7)), (2, BoundParam::Text(escaped))]
    );
}

#[test]
fn test_unparsable_stored_watermark_is_not_overwritten() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![people_row("p1", 31, "2024-Feb-01 00:00:00")],
    );
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let persisted = Some("not a timestamp".to_string());
    let mut task = SourceTask::new(&store, config, persisted).expect("task");
    let records = task.poll().expect("poll");
    assert_eq!(records.len(), 1);
    assert_eq!(task.watermark(), "not a timestamp");
}

#[test]
fn test_stale_rows_do_not_move_the_watermark_backwards() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![people_row("p1", 31, "2023-Dec-31 23:59:59")],
    );
    let mut config = people_config();
    config.timestamp_enabled = true;
    config.timestamp_attr = Some("updated".to_string());
    let persisted = Some("2024-Jan-02 03:04:05".to_string());
    let mut task = SourceTask::new(&store, config, persisted).expect("task");
    task.poll().expect("poll");
    assert_eq!(task.watermark(), "2024-Jan-02 03:04:05");
}

#[test]
fn test_empty_result_metadata_yields_no_records() {
    let store = MemoryStore::new();
    let mut task = SourceTask::new(&store, people_config(), None).expect("task");
    let records = task.poll().expect("poll");
    assert!(records.is_empty());
}

#[test]
fn test_offset_key_and_format_come_from_config() {
    let store = MemoryStore::with_result(
        people_columns(),
        vec![people_row("p1", 31, "2024-Jan-02 03:04:05")],
    );
    let mut config = people_config();
    config.offset_name_key = "last_poll".to_string();
    let mut task = SourceTask::new(&store, config, None).expect("task");
    let records = task.poll().expect("poll");
    let (key, value) = &records[0].offset;
    assert_eq!(key, "last_poll");
    // Default format, e.g. "2026-Aug-30 12:00:00".
    assert_eq!(value.len(), 20);
    assert!(chrono::NaiveDateTime::parse_from_str(value, "%Y-%b-%d %H:%M:%S").is_ok());
}

#[test]
fn test_missing_query_fails_validation() {
    let store = MemoryStore::new();
    let config = SourceConfig::default();
    let err = SourceTask::new(&store, config, None).expect_err("must fail");
    assert_eq!(err.to_string(), "configuration error: Query not set.");
}
