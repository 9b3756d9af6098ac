use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Display format for timestamps shown in lists and detail panes.
const TIMESTAMP_FORMAT: &str = "%b %d, %Y %H:%M";

/// Format a phone number for display
/// Handles various input formats and normalizes US numbers to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ),
        11 if digits.starts_with('1') => format!(
            "({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a backend timestamp for display.
///
/// Accepts RFC 3339, naive ISO date-times (assumed UTC) and epoch
/// milliseconds. Anything else is returned unchanged.
pub fn format_timestamp(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return naive.and_utc().format(TIMESTAMP_FORMAT).to_string();
        }
    }
    if let Ok(millis) = value.trim().parse::<i64>() {
        if let Some(dt) = Utc.timestamp_millis_opt(millis).single() {
            return dt.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    value.to_string()
}

/// "pending_approval" -> "Pending Approval", "job_title" -> "Job Title"
pub fn humanize_label(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Two-letter initials for an avatar badge.
pub fn initials(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => "—".to_string(),
        [only] => only.chars().take(2).collect::<String>().to_uppercase(),
        [first, second, ..] => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("15551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("+44 20 7946 0958"), "+44 20 7946 0958");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Zürich Analytics", 6), "Zür...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-03-05T14:30:00Z"), "Mar 05, 2024 14:30");
        assert_eq!(format_timestamp("2024-03-05T14:30:00.123456"), "Mar 05, 2024 14:30");
        assert_eq!(format_timestamp("2 hours ago"), "2 hours ago");
    }

    #[test]
    fn test_humanize_label() {
        assert_eq!(humanize_label("job_title"), "Job Title");
        assert_eq!(humanize_label("pending_approval"), "Pending Approval");
        assert_eq!(humanize_label("company_linkedin_activity"), "Company Linkedin Activity");
        assert_eq!(humanize_label("active"), "Active");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("John Smith"), "JS");
        assert_eq!(initials("cher"), "CH");
        assert_eq!(initials("   "), "—");
        assert_eq!(initials("ana maria lopez"), "AM");
    }
}
