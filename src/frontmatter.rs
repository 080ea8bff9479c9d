//! YAML front matter.
//!
//! Pages may start with a YAML block between `---` fences. Only the fields
//! the migration reads are kept; unknown keys are ignored.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Front-matter fields used by the page driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "scalar")]
    pub layout: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub permalink: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub description: Option<String>,
}

/// Accept any YAML scalar as a string; blank values and non-scalars become `None`.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    let text = match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    };
    Ok(text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
}

/// Split `source` into its YAML front matter (if any) and the body.
///
/// # Errors
///
/// Returns [`Error::FrontMatter`] when an opening fence is never closed.
pub fn split(source: &str) -> Result<(Option<&str>, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = strip_fence(source) else {
        return Ok((None, source));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }
    Err(Error::FrontMatter("front matter is not closed".to_string()))
}

/// Text after an opening `---` line, if the source starts with one.
fn strip_fence(source: &str) -> Option<&str> {
    let (first, rest) = source.split_once('\n').unwrap_or((source, ""));
    (first.trim_end() == "---").then_some(rest)
}

/// Parse the front matter of `source` and return it with the body.
///
/// # Errors
///
/// Returns [`Error::FrontMatter`] for unterminated fences or invalid YAML.
///
/// # Example
///
/// ```rust
/// use content_migrate::frontmatter;
///
/// let (front, body) = frontmatter::parse("---\ntitle: Hello\n---\nBody\n")?;
/// assert_eq!(front.title.as_deref(), Some("Hello"));
/// assert_eq!(body, "Body\n");
/// # Ok::<(), content_migrate::Error>(())
/// ```
pub fn parse(source: &str) -> Result<(FrontMatter, &str)> {
    let (yaml, body) = split(source)?;
    let Some(yaml) = yaml else {
        return Ok((FrontMatter::default(), body));
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| Error::FrontMatter(e.to_string()))?;
    let front = match value {
        serde_yaml::Value::Null => FrontMatter::default(),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| Error::FrontMatter(e.to_string()))?
        }
        _ => return Err(Error::FrontMatter("front matter is not a mapping".to_string())),
    };
    Ok((front, body))
}

/// Normalize a front-matter date to `YYYY-MM-DD`.
///
/// Accepts anything that starts with an ISO date (`2021-03-04`,
/// `2021-03-04 10:00:00 +0000`, RFC 3339).
#[must_use]
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = raw
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    if parsed.is_none() {
        warn!("ignoring invalid front-matter date {raw:?}");
    }
    parsed.map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_front_matter() {
        let (front, body) = parse("# Title\n").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn test_fields_and_scalars() {
        let source = "---\nlayout: post\ntitle: 2024\npermalink: /news/\ndate: 2021-03-04 10:00:00 +0000\nextra: [1, 2]\n---\n<p>x</p>";
        let (front, body) = parse(source).unwrap();
        assert_eq!(front.layout.as_deref(), Some("post"));
        assert_eq!(front.title.as_deref(), Some("2024"));
        assert_eq!(front.permalink.as_deref(), Some("/news/"));
        assert_eq!(front.date.as_deref(), Some("2021-03-04 10:00:00 +0000"));
        assert_eq!(body, "<p>x</p>");
    }

    #[test]
    fn test_empty_front_matter() {
        let (front, body) = parse("---\n---\nbody").unwrap();
        assert_eq!(front, FrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_unclosed_and_invalid_front_matter() {
        assert!(matches!(parse("---\ntitle: x\n"), Err(Error::FrontMatter(_))));
        assert!(matches!(parse("---\ntitle: [unclosed\n---\n"), Err(Error::FrontMatter(_))));
        assert!(matches!(parse("---\n- a\n- b\n---\n"), Err(Error::FrontMatter(_))));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2021-03-04"), Some("2021-03-04".to_string()));
        assert_eq!(normalize_date("2021-03-04T10:00:00Z"), Some("2021-03-04".to_string()));
        assert_eq!(normalize_date("March 2021"), None);
        assert_eq!(normalize_date("2021-13-40"), None);
    }
}
