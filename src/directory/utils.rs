//! Shared helpers for hop modules: static regex compilation and link joining.

use regex::Regex;
use url::Url;

use super::DirectoryError;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Resolves a link taken from the document at `base` into an absolute URL.
///
/// Absolute `http://` and `https://` links pass through unchanged; anything
/// else is joined onto `base`.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidUrl`] when the link cannot be joined.
pub fn absolutize_url(link: &str, base: &str) -> Result<String, DirectoryError> {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        return Ok(link.to_string());
    }
    Url::parse(base)
        .and_then(|base| base.join(link))
        .map(|url| url.to_string())
        .map_err(|_| DirectoryError::invalid_url(link))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_keeps_absolute_links() {
        let url = absolutize_url("https://cm/page2?start=32&amp", "https://other/x").unwrap();
        assert_eq!(url, "https://cm/page2?start=32&amp");
    }

    #[test]
    fn test_absolutize_joins_relative_links() {
        let url = absolutize_url(
            "xmldirectorylist.jsp?start=33",
            "https://cm:8443/ccmcip/xmldirectoryinput.jsp",
        )
        .unwrap();
        assert_eq!(url, "https://cm:8443/ccmcip/xmldirectorylist.jsp?start=33");
    }

    #[test]
    fn test_absolutize_rejects_unjoinable_base() {
        assert!(absolutize_url("page2", "not a url").is_err());
    }
}
