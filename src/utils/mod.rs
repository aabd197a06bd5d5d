//! Shared helpers

/// Maximum combined length accepted by [`combine_text`], in bytes
pub const MAX_COMBINED_TEXT: usize = 256;

/// Append `additional` to `parameter` under the legacy fixed capacity.
///
/// Oversized payloads return the sentinel error string verbatim; existing
/// callers pattern-match on that exact text, so it must not change.
pub fn combine_text(parameter: &str, additional: &str) -> String {
    if parameter.len() + additional.len() + 1 > MAX_COMBINED_TEXT {
        return "Error: Maximum size of the char array is 256 chars.".to_string();
    }
    let mut combined = String::with_capacity(parameter.len() + additional.len());
    combined.push_str(parameter);
    combined.push_str(additional);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_text() {
        assert_eq!(combine_text("hello", " world!"), "hello world!");
    }

    #[test]
    fn test_combine_text_empty() {
        assert_eq!(combine_text("", ""), "");
    }

    #[test]
    fn test_combine_text_oversized_returns_sentinel() {
        let long = "x".repeat(250);
        assert_eq!(
            combine_text(&long, " world!"),
            "Error: Maximum size of the char array is 256 chars."
        );
    }

    #[test]
    fn test_combine_text_at_capacity() {
        // 255 bytes total leaves room for the legacy terminator byte
        let a = "x".repeat(200);
        let b = "y".repeat(55);
        let combined = combine_text(&a, &b);
        assert_eq!(combined.len(), 255);
        assert!(combined.starts_with('x') && combined.ends_with('y'));
    }
}
