// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! URL resolution and tolerant URL comparison.

use reqwest::Url;

use crate::error::CardDavError;

/// Resolves an href returned by the server against the account root.
///
/// # Errors
///
/// Returns an error if `href` is not a valid relative or absolute URL.
pub fn resolve(root: &Url, href: &str) -> Result<Url, CardDavError> {
    root.join(href)
        .map_err(|e| CardDavError::Url(format!("{href}: {e}")))
}

/// Compares two URLs ignoring the scheme, default ports and a trailing slash.
///
/// Servers are not consistent about how they spell a collection URL between
/// discovery runs; this is only meant for deduplicating discovered collections.
#[must_use]
pub fn fuzzy_url_equals(a: &Url, b: &Url) -> bool {
    let trimmed = |url: &Url| url.path().trim_end_matches('/').to_string();

    a.host_str().map(str::to_ascii_lowercase) == b.host_str().map(str::to_ascii_lowercase)
        && a.port() == b.port()
        && trimmed(a) == trimmed(b)
        && a.query() == b.query()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn resolve_relative_href_against_root() {
        let root = url("https://dav.example.com/");
        let resolved = resolve(&root, "/addressbooks/user/default/a.vcf").unwrap();
        assert_eq!(
            resolved.as_str(),
            "https://dav.example.com/addressbooks/user/default/a.vcf"
        );
    }

    #[test]
    fn resolve_keeps_absolute_href() {
        let root = url("https://dav.example.com/");
        let resolved = resolve(&root, "https://other.example.com/x.vcf").unwrap();
        assert_eq!(resolved.as_str(), "https://other.example.com/x.vcf");
    }

    #[test]
    fn fuzzy_equals_ignores_trailing_slash() {
        assert!(fuzzy_url_equals(
            &url("https://dav.example.com/books/default/"),
            &url("https://dav.example.com/books/default"),
        ));
    }

    #[test]
    fn fuzzy_equals_ignores_scheme_and_default_port() {
        assert!(fuzzy_url_equals(
            &url("http://dav.example.com/books/default/"),
            &url("http://DAV.example.com:80/books/default/"),
        ));
        assert!(fuzzy_url_equals(
            &url("https://dav.example.com/books/default/"),
            &url("http://dav.example.com/books/default"),
        ));
        assert!(!fuzzy_url_equals(
            &url("https://dav.example.com:8443/books/default/"),
            &url("https://dav.example.com/books/default/"),
        ));
    }

    #[test]
    fn fuzzy_equals_rejects_other_paths() {
        assert!(!fuzzy_url_equals(
            &url("https://dav.example.com/books/default/"),
            &url("https://dav.example.com/books/work/"),
        ));
    }
}
