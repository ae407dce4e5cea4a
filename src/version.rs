// src/version.rs
use chrono::DateTime;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unix timestamp injected by the release build, if any.
const BUILD_TIME: Option<&str> = option_env!("SCRUTZONE_BUILD_TIME");

pub fn compile_date() -> String {
    BUILD_TIME
        .and_then(parse_build_time)
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_build_time(raw: &str) -> Option<String> {
    let secs = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc2822())
}

pub fn banner() -> String {
    format!("ScrutZone {} (compiled at {})", VERSION, compile_date())
}

/// Appended to every notification body.
pub fn footer() -> String {
    format!(
        "\r\n\r\n----------------------------------------\r\nscrutzone version: {}\r\ncompiled at: {}\r\n",
        VERSION,
        compile_date()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_time() {
        let epoch = parse_build_time("0").unwrap();
        assert!(epoch.starts_with("Thu,"));
        assert!(epoch.contains("Jan 1970 00:00:00"));
        assert_eq!(parse_build_time("yesterday"), None);
    }

    #[test]
    fn test_footer_mentions_version() {
        assert!(footer().contains(VERSION));
        assert!(banner().starts_with("ScrutZone "));
    }
}
