//! Error types for the blob API client

use std::fmt;

#[derive(Debug)]
pub enum BlobClientError {
    Http(Box<reqwest::Error>),
    UnexpectedStatus(u16),
    UnexpectedNotModified,
}

impl fmt::Display for BlobClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobClientError::Http(err) => write!(f, "HTTP error: {}", err),
            BlobClientError::UnexpectedStatus(code) => {
                write!(f, "expected status 200 OK but got {}", code)
            }
            BlobClientError::UnexpectedNotModified => {
                write!(f, "server reported not-modified but no validator was sent")
            }
        }
    }
}

impl std::error::Error for BlobClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobClientError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BlobClientError {
    fn from(err: reqwest::Error) -> Self {
        BlobClientError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BlobClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_display() {
        let err = BlobClientError::UnexpectedStatus(503);
        assert_eq!(format!("{}", err), "expected status 200 OK but got 503");
    }

    #[test]
    fn test_unexpected_not_modified_display() {
        let err = BlobClientError::UnexpectedNotModified;
        assert!(format!("{}", err).contains("no validator was sent"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = BlobClientError::UnexpectedStatus(500);
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("UnexpectedStatus"));
    }
}
