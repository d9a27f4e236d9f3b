//! Path Patterns
//!
//! Ant-style request path patterns: `?` matches one character, `*` any run
//! of characters within a segment, and `**` any number of whole segments.

use regex::Regex;

use crate::error::ConfigurationError;

/// Path pattern compiled to an anchored regex.
#[derive(Clone, Debug)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, ConfigurationError> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern_to_regex(&pattern)).map_err(|e| {
            ConfigurationError::InvalidConfig {
                message: format!("invalid path pattern {}: {}", pattern, e),
            }
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check a request path (query string excluded) against the pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or_default();
        self.regex.is_match(&normalize(path))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Collapse empty segments so `/a//b/` compares as `/a/b`.
fn normalize(path: &str) -> String {
    segments(path).map(|segment| format!("/{}", segment)).collect()
}

fn pattern_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    for segment in segments(pattern) {
        if segment == "**" {
            out.push_str("(?:/[^/]+)*");
            continue;
        }
        out.push('/');
        for c in segment.chars() {
            match c {
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
    }
    out.push('$');
    out
}
