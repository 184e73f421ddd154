use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions. Every variant ends the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file is empty: {}", .0.display())]
    InputEmpty(PathBuf),

    #[error("input file could not be read: {}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("fund page not found: {url}")]
    PageNotFound { url: String },

    #[error("page at {url} is in an unexpected format")]
    UnexpectedFormat {
        url: String,
        #[source]
        source: FormatError,
    },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InputNotFound(_) => 2,
            AppError::InputEmpty(_) => 3,
            AppError::InputUnreadable { .. } => 4,
            AppError::Unreachable { .. } => 5,
            AppError::PageNotFound { .. } => 6,
            AppError::UnexpectedFormat { .. } => 7,
            AppError::Browser(_)
            | AppError::Config(_)
            | AppError::Output { .. }
            | AppError::OutputIo { .. }
            | AppError::Io(_) => 1,
        }
    }
}

/// Why a fund page could not be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("page has no title")]
    MissingTitle,

    #[error("no token after '|' in title {0:?}")]
    MissingIsin(String),

    #[error("no element matches {0}")]
    MissingElement(String),

    #[error("marker {marker:?} not found in {text:?}")]
    MissingMarker { marker: &'static str, text: String },

    #[error("table has {found} tokens, {field} needs index {index}")]
    MissingToken {
        field: &'static str,
        index: usize,
        found: usize,
    },

    #[error("invalid selector {0:?}")]
    InvalidSelector(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_failures_have_distinct_codes() {
        let path = PathBuf::from("ids.txt");
        let codes = [
            AppError::InputNotFound(path.clone()).exit_code(),
            AppError::InputEmpty(path.clone()).exit_code(),
            AppError::InputUnreadable {
                path,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4]);
    }

    #[test]
    fn page_failures_have_distinct_codes() {
        let url = "https://example.org/Fonds/F1".to_string();
        let unreachable = AppError::Unreachable {
            url: url.clone(),
            reason: "net::ERR_NAME_NOT_RESOLVED".into(),
        };
        let missing = AppError::PageNotFound { url: url.clone() };
        let format = AppError::UnexpectedFormat {
            url,
            source: FormatError::MissingTitle,
        };
        assert_eq!(unreachable.exit_code(), 5);
        assert_eq!(missing.exit_code(), 6);
        assert_eq!(format.exit_code(), 7);
        assert_eq!(AppError::Browser("launch".into()).exit_code(), 1);
    }

    #[test]
    fn unexpected_format_message_names_the_url_only() {
        let err = AppError::UnexpectedFormat {
            url: "https://example.org/Fonds/F9".into(),
            source: FormatError::MissingElement("table".into()),
        };
        assert_eq!(
            err.to_string(),
            "page at https://example.org/Fonds/F9 is in an unexpected format"
        );
    }
}
