// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for wetSpring I/O and computation.
//!
//! All parser and algorithm errors use [`Error`], with variants for each
//! failure mode. No external error crates — zero-dependency error type.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by wetSpring parsers and algorithms.
#[derive(Debug)]
pub enum Error {
    /// File I/O error with path context.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Feature-table parsing or shape error (sovereign parser).
    Table(String),
    /// Codes-file parsing error.
    Codes(String),
    /// Invalid input parameters (thresholds, ranges, constraints).
    InvalidInput(String),
}

/// Result type alias for wetSpring operations.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Table(msg) => write!(f, "table parse error: {msg}"),
            Self::Codes(msg) => write!(f, "codes parse error: {msg}"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Table(_) | Self::Codes(_) | Self::InvalidInput(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io_error() {
        let err = Error::Io {
            path: PathBuf::from("test_data/ponds.pcl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("ponds.pcl"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn display_all_variants() {
        let cases: Vec<(Error, &str)> = vec![
            (Error::Table("short row".into()), "table parse error"),
            (Error::Codes("missing header".into()), "codes parse error"),
            (
                Error::InvalidInput("bad threshold".into()),
                "invalid input",
            ),
        ];
        for (err, expected_prefix) in cases {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "'{msg}' should start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_source_chain() {
        let io_err = Error::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::other("inner"),
        };
        assert!(std::error::Error::source(&io_err).is_some());

        let parse_err = Error::Table("short row".into());
        assert!(std::error::Error::source(&parse_err).is_none());
    }

    #[test]
    fn source_none_for_all_string_variants() {
        let variants: Vec<Error> = vec![
            Error::Table("x".into()),
            Error::Codes("x".into()),
            Error::InvalidInput("x".into()),
        ];
        for err in &variants {
            assert!(std::error::Error::source(err).is_none());
        }
    }
}
