use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("status code error: {0}")]
    StatusError(StatusCode),

    #[error("Fetch timed out after {0:?}")]
    TimeoutError(Duration),

    #[error("Error parsing content: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed source URL '{0}': expected a '?query=<term>&' segment")]
    MalformedSourceUrl(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AppError::FetchError(format!("request timed out: {}", err));
        }
        match err.status() {
            Some(status) => AppError::StatusError(status),
            None => AppError::FetchError(err.to_string()),
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::ConfigError(format!("Invalid source URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_carries_code() {
        let err = AppError::StatusError(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "status code error: 503 Service Unavailable");
    }

    #[test]
    fn malformed_url_names_the_url() {
        let err = AppError::MalformedSourceUrl("https://example.com/search".into());
        assert!(err.to_string().contains("https://example.com/search"));
    }
}
