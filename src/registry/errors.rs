use reqwest::StatusCode;
use std::fmt::{self, Formatter};
use url::Url;

/// Errors that can occur while looking up tags in the registry
#[derive(Debug)]
pub enum LookupError {
    /// The tag listing URL could not be constructed
    InvalidUrl(String),
    /// The registry's pagination links lead back to an already fetched page
    PaginationCycle(Url),
    /// The registry responded with an unexpected status
    Status { status: StatusCode, body: String },
    /// An error that occurred while processing the request
    Request(reqwest::Error),
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(path) => write!(f, "invalid registry API path {path:?}"),
            Self::PaginationCycle(url) => {
                write!(f, "registry pagination loops back to {url}")
            }
            Self::Status { status, body } => {
                write!(f, "registry responded with {status}")?;
                if !body.is_empty() {
                    write!(f, ": {body}")?;
                }

                Ok(())
            }
            Self::Request(_) => write!(f, "failed to complete the request"),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> LookupError {
        Self::Request(err)
    }
}
