/// Format a byte count as a human-readable string (B, KB, MB)
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a Unix timestamp as a `YYYY-MM-DD HH:MM` string
pub fn format_timestamp(timestamp: i64) -> String {
    use time::OffsetDateTime;
    use time::macros::format_description;

    if timestamp == 0 {
        return "unknown".to_string();
    }

    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|dt| {
            let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
            dt.format(&format).ok()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Cut a string to at most `max` characters, marking the cut with an ellipsis.
/// Newlines are flattened so the result fits on one line.
pub fn truncate_end(text: &str, max: usize) -> String {
    let flat: String = text.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
    if flat.chars().count() <= max {
        return flat;
    }
    let keep = max.saturating_sub(1);
    let mut out: String = flat.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp(1700000000); // Nov 14, 2023
        assert!(formatted.starts_with("2023-11-14"));

        assert_eq!(format_timestamp(0), "unknown");
    }

    #[test]
    fn test_truncate_end() {
        assert_eq!(truncate_end("short", 10), "short");
        assert_eq!(truncate_end("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_end("line one\nline two", 40), "line one line two");
    }
}
