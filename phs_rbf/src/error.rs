/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error types returned by interpolation and by data/settings file I/O.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Error types for interpolation and file I/O.
use std::{
    error::Error,
    fmt, io,
    num::ParseFloatError,
    path::PathBuf,
};

/// Errors that abort an interpolation.
///
/// Configuration errors are caller contract violations and are reported before
/// any work is done. [`InterpError::InsufficientLocalNodes`] and
/// [`InterpError::SingularLocalSystem`] are raised by an individual subdomain and,
/// under the default all-or-nothing contract, abort the whole interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpError {
    /// No nodes were supplied, so the normalization centroid is undefined.
    EmptyNodes,

    /// Two arrays that must have equal length do not.
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A coordinate or function value is NaN or infinite.
    NonFiniteInput { what: &'static str, index: usize },

    /// Polynomial degree outside `0..=4`.
    InvalidDegree { degree: usize },

    /// The PHS exponent must be positive.
    InvalidRbfPower { power: u32 },

    /// Grid dimensions were half-specified or zero.
    InvalidGrid {
        nx: Option<usize>,
        ny: Option<usize>,
    },

    /// A partition or solver parameter is out of range.
    InvalidParams { reason: String },

    /// The node coordinates collapse to a single point, so they cannot be scaled.
    DegenerateCoordinates,

    /// The nodes inside a subdomain halo cannot determine the local basis.
    InsufficientLocalNodes {
        subdomain: usize,
        local_nodes: usize,
        required: usize,
    },

    /// The local linear system produced non-finite coefficients or values.
    SingularLocalSystem { subdomain: usize },

    /// The auto-sized grid kept satisfying the density criterion past the
    /// configured refinement ceiling.
    PartitionLimitReached {
        refinements: usize,
        nx: usize,
        ny: usize,
    },

    /// The caller's cancel token was triggered.
    Cancelled,

    /// The caller's deadline passed before all subdomains were solved.
    DeadlineExceeded,
}

impl InterpError {
    /// Returns `true` for errors caused by invalid inputs or settings.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            InterpError::EmptyNodes
                | InterpError::LengthMismatch { .. }
                | InterpError::NonFiniteInput { .. }
                | InterpError::InvalidDegree { .. }
                | InterpError::InvalidRbfPower { .. }
                | InterpError::InvalidGrid { .. }
                | InterpError::InvalidParams { .. }
                | InterpError::DegenerateCoordinates
        )
    }
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpError::EmptyNodes => write!(f, "at least one node is required"),
            InterpError::LengthMismatch {
                what,
                expected,
                found,
            } => write!(f, "{} has length {} (expected {})", what, found, expected),
            InterpError::NonFiniteInput { what, index } => {
                write!(f, "{}[{}] is not finite", what, index)
            }
            InterpError::InvalidDegree { degree } => write!(
                f,
                "polynomial degree {} is not supported (use 0 up to 4)",
                degree
            ),
            InterpError::InvalidRbfPower { power } => {
                write!(f, "RBF exponent {} is not a positive integer", power)
            }
            InterpError::InvalidGrid { nx, ny } => write!(
                f,
                "subdomain grid must give both dimensions as positive integers or neither \
                 (got nx = {:?}, ny = {:?})",
                nx, ny
            ),
            InterpError::InvalidParams { reason } => write!(f, "invalid parameters: {}", reason),
            InterpError::DegenerateCoordinates => write!(
                f,
                "node coordinates have zero extent and cannot be normalized"
            ),
            InterpError::InsufficientLocalNodes {
                subdomain,
                local_nodes,
                required,
            } => write!(
                f,
                "not enough data for this polynomial degree: subdomain {} has {} local nodes \
                 (needs {})",
                subdomain, local_nodes, required
            ),
            InterpError::SingularLocalSystem { subdomain } => write!(
                f,
                "local linear system for subdomain {} is singular or ill-conditioned",
                subdomain
            ),
            InterpError::PartitionLimitReached {
                refinements,
                nx,
                ny,
            } => write!(
                f,
                "could not partition the domain: stopped after {} refinements at {} x {} subdomains",
                refinements, nx, ny
            ),
            InterpError::Cancelled => write!(f, "interpolation was cancelled"),
            InterpError::DeadlineExceeded => write!(f, "interpolation deadline exceeded"),
        }
    }
}

impl Error for InterpError {}

/// Errors that can occur when reading or writing data arrays and settings.
#[derive(Debug)]
pub enum DataIOError {
    /// Failed to open an existing file for reading.
    Open { path: PathBuf, source: io::Error },

    /// Failed to create the target file before writing.
    Create { path: PathBuf, source: io::Error },

    /// Low-level read error.
    Read { path: PathBuf, source: io::Error },

    /// Low-level write error.
    Write { path: PathBuf, source: io::Error },

    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },

    /// A line of an array file is not a floating-point number.
    ParseValue {
        path: PathBuf,
        line: usize,
        source: ParseFloatError,
    },

    /// Error reported by the CSV reader or writer.
    Csv { path: PathBuf, source: csv::Error },

    /// A CSV record does not have the expected number of columns.
    InconsistentColumns {
        path: PathBuf,
        record: usize,
        expected: usize,
        found: usize,
    },

    /// Arrays handed to a writer have different lengths.
    LengthMismatch { path: PathBuf },

    /// Error serializing or parsing JSON.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The JSON `format` field does not match the expected format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for DataIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            DataIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            DataIOError::Read { path, source } => {
                write!(f, "reading {}: {}", path.display(), source)
            }
            DataIOError::Write { path, source } => {
                write!(f, "writing {}: {}", path.display(), source)
            }
            DataIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            DataIOError::ParseValue { path, line, source } => {
                write!(f, "parsing line {} of {}: {}", line, path.display(), source)
            }
            DataIOError::Csv { path, source } => {
                write!(f, "CSV error in {}: {}", path.display(), source)
            }
            DataIOError::InconsistentColumns {
                path,
                record,
                expected,
                found,
            } => write!(
                f,
                "record {} of {} has {} columns (expected {})",
                record,
                path.display(),
                found,
                expected
            ),
            DataIOError::LengthMismatch { path } => write!(
                f,
                "arrays written to {} must have the same length",
                path.display()
            ),
            DataIOError::Json { path, source } => {
                write!(f, "JSON error in {}: {}", path.display(), source)
            }
            DataIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            DataIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
        }
    }
}

impl Error for DataIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataIOError::Open { source, .. }
            | DataIOError::Create { source, .. }
            | DataIOError::Read { source, .. }
            | DataIOError::Write { source, .. }
            | DataIOError::Flush { source, .. } => Some(source),
            DataIOError::ParseValue { source, .. } => Some(source),
            DataIOError::Csv { source, .. } => Some(source),
            DataIOError::Json { source, .. } => Some(source),
            DataIOError::InconsistentColumns { .. }
            | DataIOError::LengthMismatch { .. }
            | DataIOError::FormatMismatch { .. }
            | DataIOError::VersionMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_nodes_message_reports_count() {
        let err = InterpError::InsufficientLocalNodes {
            subdomain: 4,
            local_nodes: 3,
            required: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 local nodes"));
        assert!(msg.contains("needs 9"));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(InterpError::EmptyNodes.is_configuration_error());
        assert!(InterpError::InvalidDegree { degree: 7 }.is_configuration_error());
        assert!(!InterpError::Cancelled.is_configuration_error());
        assert!(!InterpError::SingularLocalSystem { subdomain: 0 }.is_configuration_error());
    }

    #[test]
    fn io_error_exposes_source() {
        let err = DataIOError::Open {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("opening missing.txt"));
    }
}
