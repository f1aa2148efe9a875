//! Error types for the config sidecar

use blob_api_client::BlobClientError;
use std::fmt;

#[derive(Debug)]
pub enum SidecarError {
    Config(String),
    Client(Box<BlobClientError>),
    Io(Box<std::io::Error>),
}

impl fmt::Display for SidecarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidecarError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SidecarError::Client(err) => write!(f, "Blob API error: {}", err),
            SidecarError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for SidecarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SidecarError::Client(err) => Some(err.as_ref()),
            SidecarError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<BlobClientError> for SidecarError {
    fn from(err: BlobClientError) -> Self {
        SidecarError::Client(Box::new(err))
    }
}

impl From<std::io::Error> for SidecarError {
    fn from(err: std::io::Error) -> Self {
        SidecarError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for SidecarError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        SidecarError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SidecarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = SidecarError::Config("missing SECRET".to_string());
        assert_eq!(format!("{}", err), "Configuration error: missing SECRET");
    }

    #[test]
    fn test_client_error_display() {
        let err = SidecarError::Client(Box::new(BlobClientError::UnexpectedStatus(418)));
        assert!(format!("{}", err).contains("418"));
    }

    #[test]
    fn test_client_error_has_source() {
        let err: SidecarError = BlobClientError::UnexpectedNotModified.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
