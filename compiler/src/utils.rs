/// Quotes and escapes `text` the way JSON strings are written, for use in
/// diagnostics.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

#[test]
fn quote_escapes() {
    assert_eq!(quote("Header"), "\"Header\"");
    assert_eq!(quote("a\"b"), "\"a\\\"b\"");
}
