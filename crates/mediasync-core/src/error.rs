//! Error types for mediasync.

use thiserror::Error;

/// Result type alias using mediasync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mediasync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed (download, content query, metadata query)
    #[error("Request error: {0}")]
    Request(String),

    /// Content store rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization/deserialization error (ledger file, API responses)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External encoder or prober failed
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_error_display_encoder() {
        let err = Error::Encoder("ffmpeg exited with 1".to_string());
        assert_eq!(err.to_string(), "Encoder error: ffmpeg exited with 1");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("DIRECTUS_URL is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: DIRECTUS_URL is not set"
        );
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error_maintains_message() {
        let json_err = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#);
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        assert!(err.to_string().contains("Serialization error:"));
    }

    #[test]
    fn test_every_variant_has_a_producer() {
        // Exhaustive: a new variant must be matched here and raised somewhere.
        fn label(err: &Error) -> &'static str {
            match err {
                Error::Request(_) => "request",
                Error::Unauthorized(_) => "unauthorized",
                Error::Serialization(_) => "serialization",
                Error::Config(_) => "config",
                Error::Encoder(_) => "encoder",
                Error::Io(_) => "io",
            }
        }

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(label(&Error::from(io)), "io");
        assert_eq!(label(&Error::Encoder("x".into())), "encoder");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
