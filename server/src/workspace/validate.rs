//! Input checks applied before any clone is attempted.

use url::Url;

use super::types::SessionError;

/// Accepts only `http`/`https` URLs that name a host.
pub(crate) fn repository_url(raw: &str) -> Result<Url, SessionError> {
    let raw = raw.trim();
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(SessionError::InvalidInput(
            "Invalid repository URL: only http:// and https:// are supported".to_string(),
        ));
    }

    let url = Url::parse(raw)
        .map_err(|e| SessionError::InvalidInput(format!("Invalid repository URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(SessionError::InvalidInput(
            "Invalid repository URL: a host is required".to_string(),
        ));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(SessionError::InvalidInput(
            "Invalid repository URL: embedded credentials are not supported".to_string(),
        ));
    }
    Ok(url)
}

/// Rejects branch names git would read as options or that carry whitespace.
pub(crate) fn branch(raw: &str) -> Result<&str, SessionError> {
    if raw.is_empty() {
        return Err(SessionError::InvalidInput(
            "Branch name must not be empty".to_string(),
        ));
    }
    if raw.starts_with('-') || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SessionError::InvalidInput(format!(
            "Invalid branch name '{}'",
            raw.escape_debug()
        )));
    }
    Ok(raw)
}
