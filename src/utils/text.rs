pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Lossy, single-line preview of a response body for log metadata.
pub fn body_preview(body: &[u8], max_bytes: usize) -> String {
    let text = String::from_utf8_lossy(body);
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let preview = truncate_utf8_prefix(flat.trim(), max_bytes);
    if preview.len() < flat.trim().len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::{body_preview, truncate_utf8_prefix};

    #[test]
    fn truncate_utf8_prefix_handles_ascii() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
    }

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("aéb", 2), "a");
        assert_eq!(truncate_utf8_prefix("aéb", 3), "aé");
    }

    #[test]
    fn body_preview_flattens_and_marks_truncation() {
        assert_eq!(body_preview(b"<html>\n<body>", 64), "<html> <body>");
        assert_eq!(body_preview(b"not json at all", 3), "not...");
        assert_eq!(body_preview(&[0xff, b'o', b'k'], 16), "\u{fffd}ok");
    }
}
