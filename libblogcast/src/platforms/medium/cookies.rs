//! Stored browser session cookies
//!
//! Two file formats are accepted:
//!
//! - Netscape `cookies.txt`: seven tab-separated fields per line
//!   (`domain`, `include_subdomains`, `path`, `secure`, `expiry`, `name`, `value`);
//!   `#HttpOnly_` prefixed domains mark http-only cookies, other `#` lines are comments
//! - a JSON array of `{ "name", "value", "domain", "path", "secure", "httpOnly" }`
//!   objects, as exported by most browser extensions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    /// Whether this cookie belongs to `domain` or one of its subdomains
    pub fn matches_domain(&self, domain: &str) -> bool {
        let own = self.domain.trim_start_matches('.').to_lowercase();
        let wanted = domain.trim_start_matches('.').to_lowercase();
        own == wanted || own.ends_with(&format!(".{}", wanted))
    }
}

/// Parse cookie file contents in either supported format
pub fn parse_cookies(contents: &str) -> Result<Vec<SessionCookie>> {
    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(contents).map_err(|e| {
            PlatformError::Authentication(format!("Invalid JSON cookie file: {}", e)).into()
        });
    }

    let mut cookies = Vec::new();
    for (index, raw) in contents.lines().enumerate() {
        let (line, http_only) = match raw.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            return Err(PlatformError::Authentication(format!(
                "Malformed cookie on line {}: expected 7 tab-separated fields, found {}",
                index + 1,
                fields.len()
            ))
            .into());
        }

        cookies.push(SessionCookie {
            domain: fields[0].to_string(),
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            name: fields[5].to_string(),
            value: fields[6].trim_end_matches('\r').to_string(),
            http_only,
        });
    }

    Ok(cookies)
}

/// Load the cookies for `domain` from a cookie file
///
/// # Errors
///
/// The cookies stand in for credentials, so an unreadable file, a malformed
/// file, or a file without cookies for `domain` is an authentication error.
pub fn load_cookies(path: &Path, domain: &str) -> Result<Vec<SessionCookie>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PlatformError::Authentication(format!(
            "Failed to read cookie file {}: {}. Suggestion: export your {} session cookies to this file.",
            path.display(),
            e,
            domain
        ))
    })?;

    let cookies: Vec<SessionCookie> = parse_cookies(&contents)?
        .into_iter()
        .filter(|cookie| cookie.matches_domain(domain))
        .collect();

    if cookies.is_empty() {
        return Err(PlatformError::Authentication(format!(
            "Cookie file {} contains no cookies for {}",
            path.display(),
            domain
        ))
        .into());
    }

    tracing::debug!("Loaded {} cookie(s) for {}", cookies.len(), domain);
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NETSCAPE: &str = "# Netscape HTTP Cookie File\n\
.medium.com\tTRUE\t/\tTRUE\t1999999999\tsid\tabc123\n\
#HttpOnly_.medium.com\tTRUE\t/\tTRUE\t1999999999\tuid\tu-42\n\
\n\
.example.com\tTRUE\t/\tFALSE\t0\tother\tzzz\n";

    #[test]
    fn test_parse_netscape_format() {
        let cookies = parse_cookies(NETSCAPE).unwrap();
        assert_eq!(cookies.len(), 3);

        assert_eq!(cookies[0].name, "sid");
        assert_eq!(cookies[0].value, "abc123");
        assert!(cookies[0].secure);
        assert!(!cookies[0].http_only);

        assert_eq!(cookies[1].name, "uid");
        assert!(cookies[1].http_only);

        assert!(!cookies[2].secure);
    }

    #[test]
    fn test_parse_json_format() {
        let json = r#"[
            {"name": "sid", "value": "abc", "domain": ".medium.com", "secure": true, "httpOnly": true},
            {"name": "lang", "value": "en", "domain": "medium.com"}
        ]"#;
        let cookies = parse_cookies(json).unwrap();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].http_only);
        assert_eq!(cookies[1].path, "/");
        assert!(!cookies[1].secure);
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let err = parse_cookies(".medium.com\tTRUE\t/\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_domain_matching() {
        let cookie = SessionCookie {
            name: "sid".to_string(),
            value: "x".to_string(),
            domain: ".medium.com".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
        };
        assert!(cookie.matches_domain("medium.com"));
        assert!(!cookie.matches_domain("notmedium.com"));

        let sub = SessionCookie {
            domain: "blog.medium.com".to_string(),
            ..cookie.clone()
        };
        assert!(sub.matches_domain("medium.com"));

        let lookalike = SessionCookie {
            domain: "evilmedium.com".to_string(),
            ..cookie
        };
        assert!(!lookalike.matches_domain("medium.com"));
    }

    #[test]
    fn test_load_cookies_filters_domain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, NETSCAPE).unwrap();

        let cookies = load_cookies(&path, "medium.com").unwrap();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.domain.ends_with("medium.com")));
    }

    #[test]
    fn test_load_cookies_without_matching_domain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, ".example.com\tTRUE\t/\tFALSE\t0\tother\tzzz\n").unwrap();

        let err = load_cookies(&path, "medium.com").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("no cookies for medium.com"));
    }

    #[test]
    fn test_load_cookies_missing_file() {
        let err = load_cookies(Path::new("/nonexistent/cookies.txt"), "medium.com").unwrap_err();
        assert!(err.to_string().contains("Failed to read cookie file"));
    }
}
