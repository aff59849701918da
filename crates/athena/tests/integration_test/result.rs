//! Tests for ResultTable: CSV decoding, display, and serialization.

use skiff_athena::*;

#[test]
fn test_result_parsing() {
    let csv = b"\"id\",\"name\",\"score\"\n\"123\",\"Alice\",\"9.5\"\n\"456\",\"Bob\",\n\"789\",,\"7.2\"\n";
    let result = ResultTable::from_csv(csv).unwrap();

    // Test accessors
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.column_count(), 3);
    assert!(!result.is_empty());

    // Test column_index
    assert_eq!(result.column_index("id"), Some(0));
    assert_eq!(result.column_index("score"), Some(2));
    assert_eq!(result.column_index("missing"), None);

    // Test get_value
    assert_eq!(result.get_value(0, "id"), Some("123"));
    assert_eq!(result.get_value(0, "name"), Some("Alice"));

    // Test NULL handling
    assert_eq!(result.get_value(1, "score"), None);
    assert_eq!(result.get_value(2, "name"), None);
}

#[test]
fn test_multiline_and_escaped_quotes() {
    let csv = b"\"msg\",\"n\"\n\"line one\nline two\",\"1\"\n\"say \"\"hi\"\"\",\"2\"\n";
    let result = ResultTable::from_csv(csv).unwrap();

    assert_eq!(result.row_count(), 2);
    assert_eq!(result.get_value(0, "msg"), Some("line one\nline two"));
    assert_eq!(result.get_value(1, "msg"), Some("say \"hi\""));
}

#[test]
fn test_result_display() {
    let result = ResultTable::from_csv(b"id,value\n1,alpha\n2,\n").unwrap();
    let output = result.to_string();

    assert!(output.contains("id"));
    assert!(output.contains("value"));
    assert!(output.contains("alpha"));
    assert!(output.contains("NULL"));
    assert!(output.contains("2 rows"));
}

#[test]
fn test_serde_roundtrip() {
    let result = ResultTable::from_csv(b"a,b\n1,\n").unwrap();
    let json = serde_json::to_string(&result).expect("serialize");
    assert_eq!(json, r#"{"columns":["a","b"],"rows":[["1",null]]}"#);

    let back: ResultTable = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, result);
}
