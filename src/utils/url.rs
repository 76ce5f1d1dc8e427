//! URL validation before anything is handed to the extraction engine

use crate::error::VidgrabError;
use url::Url;

/// Check that a URL is an absolute http(s) URL with a host and return it trimmed
pub fn validate_media_url(url: &str) -> Result<String, VidgrabError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(VidgrabError::InvalidUrl("URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed)?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(VidgrabError::InvalidUrl(format!(
                "Unsupported scheme: {}",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(VidgrabError::InvalidUrl("Missing host".to_string()));
    }

    Ok(trimmed.to_string())
}
