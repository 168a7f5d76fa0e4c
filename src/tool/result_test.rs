// ABOUTME: Tests for ToolResult - constructors, data payloads, defaults.
// ABOUTME: Verifies result structure works correctly.

use super::*;

#[test]
fn test_text_result() {
    let result = ToolResult::text("Hello, world!");
    assert_eq!(result.output, "Hello, world!");
    assert!(result.success);
    assert!(result.data.is_none());
}

#[test]
fn test_error_result() {
    let result = ToolResult::error("Something went wrong");
    assert_eq!(result.output, "Something went wrong");
    assert!(!result.success);
}

#[test]
fn test_with_data() {
    let result =
        ToolResult::text("output").with_data(serde_json::json!({"filepath": "a.txt", "size": 3}));

    assert_eq!(result.data_str("filepath"), Some("a.txt"));
    assert_eq!(result.data.as_ref().unwrap()["size"], 3);
    assert_eq!(result.data_str("size"), None);
    assert_eq!(result.data_str("missing"), None);
}

#[test]
fn test_default() {
    let result = ToolResult::default();
    assert_eq!(result.output, "");
    assert!(result.success);
}

#[test]
fn test_serialize_skips_empty_data() {
    let json = serde_json::to_value(ToolResult::error("nope")).unwrap();
    assert_eq!(json, serde_json::json!({"success": false, "output": "nope"}));
}
