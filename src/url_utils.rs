//! URL Utility Functions
//!
//! URL validation and host recognition for links and embeds. Embed sources in
//! legacy pages are often protocol-relative (`//www.youtube.com/...`), so those
//! are treated as `https`.

use url::Url;

/// Check if a string is a valid absolute URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) => {
            // Verify it has a host
            if url.host().is_some() {
                (true, Some(url))
            } else {
                (false, None)
            }
        }
        Err(_) => (false, None),
    }
}

/// Parse an embed source, accepting protocol-relative URLs.
#[must_use]
pub fn parse_embed_src(src: &str) -> Option<Url> {
    let src = src.trim();
    let candidate = if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    };

    let (is_abs, parsed) = is_absolute_url(&candidate);
    if is_abs {
        parsed
    } else {
        None
    }
}

/// Lowercase `host + path` of an embed source, without scheme, query or fragment.
///
/// This is the string the host patterns in `patterns.rs` match against.
/// Returns `None` for sources that are not absolute URLs.
#[must_use]
pub fn host_and_path(src: &str) -> Option<String> {
    let url = parse_embed_src(src)?;
    let host = url.host_str()?.to_lowercase();
    Some(format!("{host}{}", url.path()))
}

/// Check whether an embed source lives under any of the given `host[/path]` prefixes.
///
/// A prefix matches the host exactly or as a parent domain
/// (`forms.office.com` matches `eu.forms.office.com`), and its path part, when
/// present, must prefix the source path.
#[must_use]
pub fn matches_host_prefix(src: &str, prefixes: &[String]) -> bool {
    let Some(url) = parse_embed_src(src) else {
        return false;
    };
    let Some(host) = url.host_str().map(str::to_lowercase) else {
        return false;
    };
    let path = url.path();

    prefixes.iter().any(|prefix| {
        let prefix = prefix.trim().to_lowercase();
        let (prefix_host, prefix_path) = match prefix.split_once('/') {
            Some((h, p)) => (h.to_string(), format!("/{p}")),
            None => (prefix.clone(), String::new()),
        };
        let host_ok = host == prefix_host || host.ends_with(&format!(".{prefix_host}"));
        host_ok && path.starts_with(&prefix_path)
    })
}
