use url::Url;

/// Why a submitted URL was rejected before it ever reached the store.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    Malformed(#[from] url::ParseError),
}

/// Check that `raw` is a syntactically well-formed absolute http(s) URL and
/// return the trimmed form the store should persist.
pub fn validate_url(raw: &str) -> Result<String, UrlError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.to_owned()),
        other => Err(UrlError::UnsupportedScheme(other.to_owned())),
    }
}
