//! User-agent parsing into coarse device information.

use serde::{Deserialize, Serialize};

/// Fallback value for any unparsed component.
pub const UNKNOWN: &str = "Unknown";

/// Coarse device/browser/OS classification of a user-agent string.
///
/// Parsing is deliberately a handful of substring checks; the result feeds
/// session summaries and suspicion heuristics, nothing that needs a full
/// user-agent grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `Mobile`, `Tablet`, `Desktop`, or `Unknown`.
    pub device_type: String,
    /// `Chrome`, `Firefox`, `Safari`, `Edge`, or `Unknown`.
    pub browser: String,
    /// `Windows`, `macOS`, `Linux`, `Android`, `iOS`, or `Unknown`.
    pub os: String,
}

impl DeviceInfo {
    /// Everything-unknown classification.
    pub fn unknown() -> Self {
        Self {
            device_type: UNKNOWN.to_string(),
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        }
    }

    /// Classify a user-agent string.
    pub fn parse(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent else {
            return Self::unknown();
        };
        if ua.trim().is_empty() {
            return Self::unknown();
        }

        Self {
            device_type: parse_device_type(ua).to_string(),
            browser: parse_browser(ua).to_string(),
            os: parse_os(ua).to_string(),
        }
    }
}

fn parse_device_type(ua: &str) -> &'static str {
    // Tablets advertise Mobile-ish tokens too, so check them first.
    if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else if ua.contains("Windows") || ua.contains("Macintosh") || ua.contains("X11") {
        "Desktop"
    } else {
        UNKNOWN
    }
}

fn parse_browser(ua: &str) -> &'static str {
    // Edge and Chrome both carry "Chrome"; Chrome and Edge both carry
    // "Safari". Order resolves the overlap.
    if ua.contains("Edg") {
        "Edge"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else {
        UNKNOWN
    }
}

fn parse_os(ua: &str) -> &'static str {
    // iOS devices claim "like Mac OS X" and Android claims "Linux".
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Linux") || ua.contains("X11") {
        "Linux"
    } else {
        UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                            (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                                 AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 \
                                 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) \
                               AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 \
                               Mobile/15E148 Safari/604.1";

    #[test]
    fn test_desktop_browsers() {
        let info = DeviceInfo::parse(Some(CHROME_WIN));
        assert_eq!(info.device_type, "Desktop");
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");

        let info = DeviceInfo::parse(Some(FIREFOX_LINUX));
        assert_eq!(info.device_type, "Desktop");
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Linux");
    }

    #[test]
    fn test_edge_is_not_chrome() {
        let info = DeviceInfo::parse(Some(EDGE_WIN));
        assert_eq!(info.browser, "Edge");
    }

    #[test]
    fn test_iphone_is_mobile_ios() {
        let info = DeviceInfo::parse(Some(SAFARI_IPHONE));
        assert_eq!(info.device_type, "Mobile");
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn test_ipad_is_tablet_not_macos() {
        let info = DeviceInfo::parse(Some(SAFARI_IPAD));
        assert_eq!(info.device_type, "Tablet");
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn test_android_is_mobile_not_linux() {
        let info = DeviceInfo::parse(Some(CHROME_ANDROID));
        assert_eq!(info.device_type, "Mobile");
        assert_eq!(info.os, "Android");
    }

    #[test]
    fn test_missing_and_garbage_agents_fall_back() {
        assert_eq!(DeviceInfo::parse(None), DeviceInfo::unknown());
        assert_eq!(DeviceInfo::parse(Some("")), DeviceInfo::unknown());
        assert_eq!(DeviceInfo::parse(Some("curl/8.4.0")), DeviceInfo::unknown());
    }
}
