//! Small helpers shared by the bot modules.

use std::{path::PathBuf, time::Duration};

/// Joins a directory and an entry name into a path string.
///
/// # Examples
///
/// ```ignore
/// let path = get_path("/var/lib/spawnscope", "session");
/// assert_eq!(path, "/var/lib/spawnscope/session");
/// ```
pub fn get_path(dir_path: &str, subdir_path: &str) -> String {
    let path: PathBuf = [dir_path, subdir_path].iter().collect();
    path.to_string_lossy().into_owned()
}

/// Formats a signed number of seconds as `1h2m3s`, `4m5s` or `6s`.
pub fn format_seconds(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

pub fn format_duration(duration: Duration) -> String {
    format_seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}

/// Escapes text for use inside HTML messages.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_path() {
        #[cfg(unix)]
        assert_eq!(get_path("/home/user", "config"), "/home/user/config");
        #[cfg(unix)]
        assert_eq!(get_path(".", "roomconfig"), "./roomconfig");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0s");
        assert_eq!(format_seconds(59), "59s");
        assert_eq!(format_seconds(60), "1m0s");
        assert_eq!(format_seconds(754), "12m34s");
        assert_eq!(format_seconds(3723), "1h2m3s");
        assert_eq!(format_seconds(90061), "25h1m1s");
        assert_eq!(format_seconds(-75), "-1m15s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(3_723_900)), "1h2m3s");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
