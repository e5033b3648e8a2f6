//! Link resolution against a base URI.

use regex::Regex;
use std::sync::OnceLock;

static ABSOLUTE: OnceLock<Option<Regex>> = OnceLock::new();

fn absolute_pattern() -> Option<&'static Regex> {
    ABSOLUTE
        .get_or_init(|| Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*:(?://)?|//)").ok())
        .as_ref()
}

/// Returns true if `href` carries a scheme (`mailto:`, `https://`) or is
/// protocol-relative (`//cdn.example.com`).
///
/// ```
/// use outpost_format::link::is_absolute;
///
/// assert!(is_absolute("https://example.com/a"));
/// assert!(is_absolute("urn:isbn:0451450523"));
/// assert!(is_absolute("//cdn.example.com/x.js"));
/// assert!(!is_absolute("/widgets/1"));
/// assert!(!is_absolute("widgets/1"));
/// ```
#[must_use]
pub fn is_absolute(href: &str) -> bool {
    absolute_pattern().is_some_and(|re| re.is_match(href))
}

/// Prefixes `href` with `base_uri` unless it is already absolute.
#[must_use]
pub fn resolve(base_uri: &str, href: &str) -> String {
    if is_absolute(href) {
        href.to_string()
    } else {
        format!("{base_uri}{href}")
    }
}

/// Prefixes a URI template with `base_uri`, absolute or not.
#[must_use]
pub fn resolve_template(base_uri: &str, template: &str) -> String {
    format!("{base_uri}{template}")
}

/// Appends an encoded query string to `href`, respecting an existing query
/// and keeping any fragment at the end.
#[must_use]
pub fn append_query(href: &str, query: &str) -> String {
    if query.is_empty() {
        return href.to_string();
    }

    let (head, fragment) = match href.find('#') {
        Some(pos) => href.split_at(pos),
        None => (href, ""),
    };
    let separator = if head.contains('?') { '&' } else { '?' };
    format!("{head}{separator}{query}{fragment}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://api.example.com";

    #[test]
    fn test_relative_href_is_prefixed() {
        assert_eq!(resolve(BASE, "/widgets/1"), "https://api.example.com/widgets/1");
    }

    #[test]
    fn test_absolute_hrefs_are_unchanged() {
        assert_eq!(resolve(BASE, "https://other.example/x"), "https://other.example/x");
        assert_eq!(resolve(BASE, "//cdn.example.com/x"), "//cdn.example.com/x");
        assert_eq!(resolve(BASE, "mailto:ops@example.com"), "mailto:ops@example.com");
        assert_eq!(resolve(BASE, "HTTP://SHOUTY.example"), "HTTP://SHOUTY.example");
    }

    #[test]
    fn test_template_is_always_prefixed() {
        assert_eq!(
            resolve_template(BASE, "/widgets{?q}"),
            "https://api.example.com/widgets{?q}"
        );
        assert_eq!(
            resolve_template(BASE, "https://x.example/{id}"),
            "https://api.example.comhttps://x.example/{id}"
        );
    }

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("/a", "access_token=t"), "/a?access_token=t");
        assert_eq!(append_query("/a?x=1", "access_token=t"), "/a?x=1&access_token=t");
        assert_eq!(append_query("/a#top", "access_token=t"), "/a?access_token=t#top");
        assert_eq!(append_query("/a", ""), "/a");
    }

    proptest! {
        #[test]
        fn prop_scheme_hrefs_pass_through(scheme in "[a-z][a-z0-9+.-]{0,8}", rest in "[a-z0-9/]{0,16}") {
            let href = format!("{scheme}://{rest}");
            prop_assert_eq!(resolve(BASE, &href), href);
        }

        #[test]
        fn prop_rooted_paths_get_base(path in "/[a-z0-9]{1,8}(/[a-z0-9]{1,8}){0,3}") {
            prop_assert!(path.starts_with('/') && !path.starts_with("//"));
            prop_assert_eq!(resolve(BASE, &path), format!("{BASE}{path}"));
        }
    }
}
