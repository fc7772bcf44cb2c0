use std::fmt;

use crate::record::RecordKey;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a zone source is rejected while it is normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneError {
    DuplicateSoa,
    MultiValueSoa(usize),
    UnqualifiedTarget { name: String, value: String },
    Invalid(String),
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZoneError::DuplicateSoa => write!(f, "found more than one SOA record"),
            ZoneError::MultiValueSoa(n) => {
                write!(f, "found {} values for SOA record, expected one", n)
            }
            ZoneError::UnqualifiedTarget { name, value } => write!(
                f,
                "could not resolve target '{}' of record {} to a FQDN",
                value, name
            ),
            ZoneError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    MalformedZone(ZoneError),
    ZoneNotFound(String),
    MutationFailure { record: RecordKey, reason: String },
    Credential(String),
    Provider(String),
    HttpError(String),
    ParseError(String),
    IoError(std::io::Error),
}

impl Error {
    /// Process exit code for the outcome this error represents.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MalformedZone(_) => 2,
            Error::ZoneNotFound(_) => 3,
            Error::Credential(_) => 4,
            Error::MutationFailure { .. } => 5,
            _ => 1,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedZone(e) => write!(f, "Malformed zone: {}", e),
            Error::ZoneNotFound(zone) => write!(f, "Zone not found: {}", zone),
            Error::MutationFailure { record, reason } => {
                write!(f, "Failed to apply {}: {}", record, reason)
            }
            Error::Credential(e) => write!(f, "Credential error: {}", e),
            Error::Provider(e) => write!(f, "Provider error: {}", e),
            Error::HttpError(e) => write!(f, "HTTP error: {}", e),
            Error::ParseError(e) => write!(f, "Parse error: {}", e),
            Error::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl From<ZoneError> for Error {
    fn from(err: ZoneError) -> Error {
        Error::MalformedZone(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::HttpError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::ParseError(err.to_string())
    }
}
