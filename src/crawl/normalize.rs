// src/crawl/normalize.rs
// =============================================================================
// This module turns a raw link (whatever was inside an href) into the single
// canonical string the frontier uses as a URL's identity.
//
// Steps, in order:
// 1. Empty links are rejected
// 2. The link is parsed; relative links are resolved against the parent page
// 3. Only http (and https, when SSL crawling is on) survive
// 4. The URL is rebuilt from host + path + query (userinfo, port and
//    fragment are dropped)
// 5. The rebuilt string is percent-decoded and the scheme put back in front
// 6. Anything from the first '#' onwards is cut off
//
// Nothing here does I/O and nothing here fails loudly: a link that cannot be
// normalized simply yields None.
// =============================================================================

use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

/// Which schemes the crawl is willing to follow.
///
/// `http` is always allowed; `https` only when SSL crawling was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslPolicy {
    /// Plain http only (the default).
    #[default]
    Exclude,
    /// Both http and https.
    Include,
}

impl SslPolicy {
    /// Returns true when links with this scheme may enter the crawl.
    pub fn allows(self, scheme: &str) -> bool {
        match scheme {
            "http" => true,
            "https" => self == SslPolicy::Include,
            _ => false,
        }
    }
}

impl From<bool> for SslPolicy {
    fn from(include_ssl: bool) -> Self {
        if include_ssl {
            SslPolicy::Include
        } else {
            SslPolicy::Exclude
        }
    }
}

// Normalizes a raw link into its canonical absolute form
//
// Parameters:
//   raw_link: the link exactly as found on the page
//   parent_url: the page the link was found on (needed for relative links)
//   ssl: whether https links are acceptable
//
// Returns: Some(canonical_url) or None when the link is unusable
//
// Examples (parent = "http://ex.com/docs/"):
//   "intro"               -> Some("http://ex.com/docs/intro")
//   "#top"                -> Some("http://ex.com/docs/")
//   "https://ex.com/"     -> None (unless ssl = Include)
//   "mailto:me@ex.com"    -> None
pub fn normalize(raw_link: &str, parent_url: Option<&str>, ssl: SslPolicy) -> Option<String> {
    if raw_link.is_empty() {
        return None;
    }

    let resolved = match Url::parse(raw_link) {
        Ok(url) => url,
        // Relative links only make sense next to the page they came from
        Err(ParseError::RelativeUrlWithoutBase) => {
            let parent = Url::parse(parent_url?).ok()?;
            parent.join(raw_link).ok()?
        }
        Err(_) => return None,
    };

    let scheme = resolved.scheme();
    if !ssl.allows(scheme) {
        return None;
    }

    // Url::parse has already lowercased scheme and host and re-encoded the
    // path and query, so only the pieces we keep need to be picked out.
    let host = resolved.host_str()?;
    let mut rebuilt = format!("{}{}", host, resolved.path());
    if let Some(query) = resolved.query() {
        rebuilt.push('?');
        rebuilt.push_str(query);
    }

    // Only %XX is decoded; '+' stays a literal plus, unlike form decoding.
    let decoded = percent_decode_str(&rebuilt).decode_utf8_lossy();
    let absolute = format!("{}://{}", scheme, decoded);

    // A decoded "%23" becomes a real '#', and is cut like any fragment.
    absolute.split('#').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a", Some("http://ex.com/"), Some("http://ex.com/a"))]
    #[case("http://ex.com/b", Some("http://ex.com/"), Some("http://ex.com/b"))]
    #[case("http://ex.com", None, Some("http://ex.com/"))]
    #[case("../up", Some("http://ex.com/a/b/c"), Some("http://ex.com/a/up"))]
    #[case("//ex.com/x", Some("http://ex.com/"), Some("http://ex.com/x"))]
    #[case("?page=2", Some("http://ex.com/list"), Some("http://ex.com/list?page=2"))]
    #[case("HTTP://EX.COM/Path", None, Some("http://ex.com/Path"))]
    #[case("http://user:pw@ex.com:8080/a?b=1#frag", None, Some("http://ex.com/a?b=1"))]
    #[case("http://ex.com/caf%C3%A9", None, Some("http://ex.com/café"))]
    #[case("http://ex.com/a b", None, Some("http://ex.com/a b"))]
    #[case("http://ex.com/a%23b", None, Some("http://ex.com/a"))]
    #[case("http://ex.com/?", None, Some("http://ex.com/?"))]
    #[case("http://ex.com/s?q=a+b&x=%2B", None, Some("http://ex.com/s?q=a+b&x=+"))]
    #[case("http://ex.com/c++/a%20b", None, Some("http://ex.com/c++/a b"))]
    fn test_normalize_accepts(
        #[case] raw: &str,
        #[case] parent: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            normalize(raw, parent, SslPolicy::Exclude).as_deref(),
            expected,
            "raw: {raw}, parent: {parent:?}"
        );
    }

    #[rstest]
    #[case("", Some("http://ex.com/"))]
    #[case("/a", None)]
    #[case("a", Some("not a url"))]
    #[case("mailto:test@example.com", Some("http://ex.com/"))]
    #[case("javascript:void(0)", Some("http://ex.com/"))]
    #[case("ftp://ex.com/file.txt", None)]
    #[case("https://ex.com/d", Some("http://ex.com/"))]
    #[case("http://[::1]:namedport", None)]
    fn test_normalize_rejects(#[case] raw: &str, #[case] parent: Option<&str>) {
        assert_eq!(normalize(raw, parent, SslPolicy::Exclude), None, "raw: {raw}");
    }

    #[test]
    fn test_fragment_only_link_collapses_to_parent_page() {
        let result = normalize("#section", Some("http://a.com/p"), SslPolicy::Exclude);
        assert_eq!(result.as_deref(), Some("http://a.com/p"));
    }

    #[test]
    fn test_https_needs_ssl_policy() {
        assert_eq!(normalize("https://ex.com/d", None, SslPolicy::Exclude), None);
        assert_eq!(
            normalize("https://ex.com/d", None, SslPolicy::Include).as_deref(),
            Some("https://ex.com/d")
        );
    }

    #[test]
    fn test_relative_link_keeps_parent_scheme_and_host() {
        let result = normalize("docs/intro", Some("https://ex.com/"), SslPolicy::Include);
        assert_eq!(result.as_deref(), Some("https://ex.com/docs/intro"));
    }

    #[rstest]
    #[case("http://ex.com/")]
    #[case("http://ex.com/a/b?x=1&y=2")]
    #[case("http://ex.com/café")]
    #[case("http://ex.com/a b")]
    #[case("http://ex.com/s?q=a+b&x=%2B")]
    fn test_normalize_is_stable(#[case] raw: &str) {
        let once = normalize(raw, None, SslPolicy::Exclude).expect("normalizes");
        let twice = normalize(&once, None, SslPolicy::Exclude).expect("normalizes again");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ssl_policy_from_flag() {
        assert_eq!(SslPolicy::from(true), SslPolicy::Include);
        assert_eq!(SslPolicy::from(false), SslPolicy::Exclude);
        assert!(SslPolicy::Exclude.allows("http"));
        assert!(!SslPolicy::Exclude.allows("https"));
        assert!(!SslPolicy::Include.allows("ftp"));
    }
}
