use thiserror::Error;
use url::Url;

/// Errors that can occur when checking a feed URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Checks that a string is an absolute http(s) URL suitable for a feed field.
///
/// Feed readers resolve `<link>`, `<guid>` and `atom:link` without a base, so
/// relative paths such as `/posts/1` produce broken entries. This is used for
/// warnings only; rendering never rejects a URL. The parser already refuses
/// http(s) URLs with an empty host, so a returned URL always has one.
///
/// # Examples
///
/// ```
/// use rssforge::util::validate_feed_url;
///
/// let url = validate_feed_url("https://example.com/feed.xml").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// // Relative paths have no base to resolve against
/// assert!(validate_feed_url("/posts/1").is_err());
///
/// // Non-web schemes
/// assert!(validate_feed_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_feed_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url)
}
