//! Cleanup of raw search-result lines into fetchable URLs.

const SCHEMES: &[&str] = &["https://", "http://"];
const TRACKING_PREFIX: &str = "utm_";
const TRACKING_KEYS: &[&str] = &["fbclid"];

/// Turns a result line such as `"3. Some title - https://x.com/a?utm_source=y"`
/// into `"https://x.com/a"`.
///
/// The URL starts at the first scheme in the line (falling back to the first
/// bare `"http"`) and ends at the next whitespace. Lines without any `"http"`
/// come back trimmed and otherwise untouched.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();

    let start = SCHEMES
        .iter()
        .filter_map(|scheme| trimmed.find(scheme))
        .min()
        .or_else(|| trimmed.find("http"));
    let Some(start) = start else {
        return trimmed.to_string();
    };

    let candidate = &trimmed[start..];
    let end = candidate
        .find(char::is_whitespace)
        .unwrap_or(candidate.len());
    strip_tracking_params(&candidate[..end])
}

/// Drops `utm_*` and `fbclid` query parameters wherever they appear, keeping
/// the order and spelling of every other parameter and the fragment.
pub fn strip_tracking_params(url: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let Some((path, query)) = base.split_once('?') else {
        return url.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_tracking_param(pair))
        .collect();

    let mut cleaned = path.to_string();
    if !kept.is_empty() {
        cleaned.push('?');
        cleaned.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        cleaned.push('#');
        cleaned.push_str(fragment);
    }
    cleaned
}

fn is_tracking_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or(pair);
    key.starts_with(TRACKING_PREFIX) || TRACKING_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_label_prefix() {
        assert_eq!(
            normalize_url("  1. Rust Blog - https://blog.rust-lang.org/  "),
            "https://blog.rust-lang.org/"
        );
        assert_eq!(normalize_url("•https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn removes_tracking_params_anywhere() {
        let cleaned = normalize_url("see: https://x.com/p?utm_x=1&fbclid=2");
        assert_eq!(cleaned, "https://x.com/p");
        assert!(!cleaned.contains("utm_"));
        assert!(!cleaned.contains("fbclid"));
        assert!(cleaned.starts_with("https://"));

        assert_eq!(
            normalize_url("https://x.com/p?id=7&utm_source=tw&page=2&fbclid=abc"),
            "https://x.com/p?id=7&page=2"
        );
        assert_eq!(
            normalize_url("https://x.com/p?utm_medium=a&id=7"),
            "https://x.com/p?id=7"
        );
    }

    #[test]
    fn keeps_fragment_and_other_params() {
        assert_eq!(
            normalize_url("https://x.com/docs?v=2&utm_campaign=z#install"),
            "https://x.com/docs?v=2#install"
        );
        assert_eq!(
            normalize_url("https://x.com/search?q=utm_source"),
            "https://x.com/search?q=utm_source"
        );
    }

    #[test]
    fn title_mentioning_http_does_not_hide_url() {
        assert_eq!(
            normalize_url("Learn http caching - http://cache.dev/guide"),
            "http://cache.dev/guide"
        );
    }

    #[test]
    fn no_scheme_returns_trimmed_input() {
        assert_eq!(normalize_url("  just a title  "), "just a title");
    }

    #[test]
    fn bare_http_fragment_is_used() {
        assert_eq!(normalize_url("label:httpbin.org/get"), "httpbin.org/get");
    }
}
