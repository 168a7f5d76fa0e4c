// ABOUTME: RedactionFilter - replaces recognizable secrets in text with
// ABOUTME: [REDACTED:NAME] placeholders before anything is traced or logged.

use std::sync::LazyLock;

use regex::Regex;

/// Values shorter than this are never treated as secrets when scanning
/// environment variables; short values cause false positives.
pub const MIN_SECRET_LEN: usize = 12;

/// Placeholder names are capped so a placeholder never grows unbounded.
const MAX_NAME_LEN: usize = 32;

/// Environment variable names containing any of these look secret.
const SECRET_NAME_HINTS: &[&str] = &["KEY", "TOKEN", "SECRET", "PASSWORD", "AUTH"];

struct SecretPattern {
    regex: Regex,
    replacement: &'static str,
}

static SECRET_PATTERNS: LazyLock<Vec<SecretPattern>> = LazyLock::new(|| {
    [
        (
            r"(?s)-----BEGIN [A-Z ]*PRIVATE KEY-----.*?-----END [A-Z ]*PRIVATE KEY-----",
            "[REDACTED:PRIVATE_KEY]",
        ),
        (r"\bsk-ant-[A-Za-z0-9_\-]{20,}", "[REDACTED:ANTHROPIC_KEY]"),
        (r"\bsk-(?:proj-)?[A-Za-z0-9_\-]{20,}", "[REDACTED:OPENAI_KEY]"),
        (r"\bgh[pousr]_[A-Za-z0-9]{20,}", "[REDACTED:GITHUB_TOKEN]"),
        (r"\bAKIA[0-9A-Z]{16}\b", "[REDACTED:AWS_ACCESS_KEY]"),
        (r"\bxox[baprs]-[A-Za-z0-9\-]{10,}", "[REDACTED:SLACK_TOKEN]"),
        (r"\bAIza[0-9A-Za-z_\-]{35}", "[REDACTED:GOOGLE_API_KEY]"),
        (
            r"(?i)\b(bearer|basic)\s+[A-Za-z0-9._~+/=\-]{8,}",
            "$1 [REDACTED:AUTH_HEADER]",
        ),
        (
            r#"(?i)\b(password|passwd|pwd)(\s*[=:]\s*)(?:"[^"]*"|'[^']*'|[^\s,;&]+)"#,
            "$1$2[REDACTED:PASSWORD]",
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| SecretPattern {
        regex: Regex::new(pattern).expect("built-in secret patterns are valid"),
        replacement,
    })
    .collect()
});

/// One known secret value and the name used in its placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KnownSecret {
    name: String,
    value: String,
}

/// Scrubs secrets from text.
///
/// Two passes: exact known values first (longest first, so a secret that
/// contains another is replaced whole), then built-in patterns for common
/// credential shapes. Known values are injected explicitly; the filter never
/// reads the process environment on its own.
#[derive(Debug, Clone, Default)]
pub struct RedactionFilter {
    secrets: Vec<KnownSecret>,
}

impl RedactionFilter {
    /// A filter with only the built-in patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known secret value. Empty values are ignored.
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_secret(name, value);
        self
    }

    /// Add a known secret value in place.
    pub fn add_secret(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() || self.secrets.iter().any(|s| s.value == value) {
            return;
        }
        self.secrets.push(KnownSecret {
            name: name.into(),
            value,
        });
        self.secrets
            .sort_by(|a, b| b.value.len().cmp(&a.value.len()));
    }

    /// Build a filter from `(name, value)` pairs, keeping only variables whose
    /// name looks secret and whose value is at least [`MIN_SECRET_LEN`] long.
    ///
    /// Pass `std::env::vars()` to scrub the current environment.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut filter = Self::new();
        for (name, value) in vars {
            let name = name.into();
            let value = value.into();
            if looks_secret(&name) && value.chars().count() >= MIN_SECRET_LEN {
                filter.add_secret(name, value);
            }
        }
        filter
    }

    /// Number of known secret values.
    pub fn known_secrets(&self) -> usize {
        self.secrets.len()
    }

    /// Return `text` with every recognizable secret replaced.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();

        for secret in &self.secrets {
            if out.contains(&secret.value) {
                out = out.replace(&secret.value, &placeholder(&secret.name));
            }
        }

        for pattern in SECRET_PATTERNS.iter() {
            if pattern.regex.is_match(&out) {
                out = pattern
                    .regex
                    .replace_all(&out, pattern.replacement)
                    .into_owned();
            }
        }

        out
    }
}

fn looks_secret(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SECRET_NAME_HINTS.iter().any(|hint| upper.contains(hint))
}

/// `[REDACTED:NAME]` with the name sanitized and capped.
fn placeholder(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = if cleaned.is_empty() {
        "SECRET".to_string()
    } else {
        cleaned
    };
    format!("[REDACTED:{}]", cleaned)
}
