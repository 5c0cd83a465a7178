use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Check that `url_str` is safe to pass to the system opener.
///
/// Only `http`/`https` URLs with a host are accepted, so a crafted value can
/// never launch a local file or a custom protocol handler.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

/// Public page of an article: `{site_url}/{owner}/{slug}`.
///
/// Owner and slug come from the API and are percent-encoded as path segments.
pub fn article_url(site_url: &str, owner: &str, slug: &str) -> Result<Url, UrlValidationError> {
    let mut url = validate_url_for_open(site_url.trim_end_matches('/'))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| UrlValidationError::MissingHost)?
        .pop_if_empty()
        .push(owner)
        .push(slug);
    Ok(url)
}
