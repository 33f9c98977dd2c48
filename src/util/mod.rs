//
//  stash-client
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Utility functions
//!
//! Stash reports every timestamp in milliseconds since the Unix epoch;
//! the formatting helpers here take that unit directly.

use chrono::{DateTime, Local, Utc};

/// Formats a millisecond timestamp as local date and time.
pub fn format_time_ms(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        None => "Unknown".to_string(),
    }
}

/// Formats a millisecond timestamp relative to now ("3 days ago").
pub fn format_relative_time_ms(timestamp_ms: i64) -> String {
    relative_to(timestamp_ms, Utc::now().timestamp_millis())
}

fn relative_to(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = (now_ms - timestamp_ms) / 1000;
    if diff < 0 {
        return "in the future".to_string();
    }

    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });
    match diff {
        0..=59 => "just now".to_string(),
        60..=3_599 => plural(diff / 60, "minute"),
        3_600..=86_399 => plural(diff / 3_600, "hour"),
        86_400..=604_799 => plural(diff / 86_400, "day"),
        604_800..=2_591_999 => plural(diff / 604_800, "week"),
        2_592_000..=31_535_999 => plural(diff / 2_592_000, "month"),
        _ => plural(diff / 31_536_000, "year"),
    }
}

/// Shortens `s` to at most `max_len` characters, ending with `...` when
/// cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("hello", 2), "he");
    }

    #[test]
    fn test_relative_time() {
        let now = 1_700_000_000_000;
        assert_eq!(relative_to(now - 5_000, now), "just now");
        assert_eq!(relative_to(now - 60_000, now), "1 minute ago");
        assert_eq!(relative_to(now - 7_200_000, now), "2 hours ago");
        assert_eq!(relative_to(now - 3 * 86_400_000, now), "3 days ago");
        assert_eq!(relative_to(now + 60_000, now), "in the future");
    }

    #[test]
    fn test_format_time_invalid() {
        assert_eq!(format_time_ms(i64::MAX), "Unknown");
    }
}
