//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use estimator_core::money::format_usd;

/// Truncate a string to max length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}

/// Wrap text to a given width, preserving newlines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Short ID from a UUID (first 8 characters).
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format a datetime for display.
pub fn format_datetime(dt: &DateTime<Utc>, pretty: bool) -> String {
    if pretty {
        dt.format("%Y-%m-%d %H:%M UTC").to_string()
    } else {
        dt.to_rfc3339()
    }
}

/// Money for display: `$12,500.00` in pretty mode, `12500.00` otherwise.
pub fn money(value: f64, pretty: bool) -> String {
    if pretty {
        format_usd(value)
    } else {
        format!("{:.2}", value)
    }
}

/// Replace newlines so a value fits on one plain-output line.
pub fn single_line(s: &str) -> String {
    s.replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Demolition", 20), "Demolition");
        assert_eq!(truncate("Rough Plumbing and Venting", 10), "Rough P...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let lines = wrap("Remove existing tile\n\nInstall new backer board", 12);
        assert_eq!(
            lines,
            vec!["Remove", "existing", "tile", "", "Install new", "backer board"]
        );
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("7a2e3c0b-1234-5678-9abc-def012345678").expect("valid uuid");
        assert_eq!(short_id(&id), "7a2e3c0b");
    }

    #[test]
    fn test_money_modes() {
        assert_eq!(money(12500.0, true), "$12,500.00");
        assert_eq!(money(12500.0, false), "12500.00");
        assert_eq!(money(-3.5, false), "-3.50");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\r\nb"), "a b");
    }
}
