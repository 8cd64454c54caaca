/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! The errors that can occur when a kd-tree is being built, configured or queried.
//! Most of these are raised right at the API boundary, the search itself cannot fail.

use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type KdResult<T> = Result<T, KdError>;

/// Error type for the kd-tree.
#[derive(Debug)]
pub enum KdError {
    /// A coordinate vector did not have the dimensionality of the builder or tree.
    DimensionMismatch {
        /// The dimensionality of the builder or tree
        expected: usize,
        /// The length of the offending coordinate vector
        found: usize,
    },
    /// An argument was out of range, for example asking for more neighbours than the tree holds.
    InvalidArgument(String),
    /// The build was cancelled through the progress monitor. No tree was produced.
    BuildCancelled,
    /// IO error when opening files
    IoError(io::Error),
    /// Parsing error when loading a yaml or CSV file
    ParsingError(ParsingError),
}

impl KdError {
    /// The dimensionality check that all public entry points share.
    pub fn check_dim(expected: usize, found: usize) -> KdResult<()> {
        if expected == found {
            Ok(())
        } else {
            Err(KdError::DimensionMismatch { expected, found })
        }
    }

    /// Shorthand for an `InvalidArgument`
    pub fn invalid_argument<S: Into<String>>(message: S) -> KdError {
        KdError::InvalidArgument(message.into())
    }
}

impl fmt::Display for KdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KdError::DimensionMismatch { expected, found } => write!(
                f,
                "expected a vector of dimension {}, got one of dimension {}",
                expected, found
            ),
            KdError::InvalidArgument(ref message) => write!(f, "invalid argument: {}", message),
            KdError::BuildCancelled => write!(f, "the tree build was cancelled"),
            KdError::IoError(ref e) => write!(f, "{}", e),
            KdError::ParsingError(ref e) => write!(f, "{}", e),
        }
    }
}

#[allow(deprecated)]
impl Error for KdError {
    fn description(&self) -> &str {
        match *self {
            KdError::DimensionMismatch { .. } => "a vector had the wrong dimension",
            KdError::InvalidArgument(..) => "invalid argument",
            KdError::BuildCancelled => "the tree build was cancelled",
            KdError::IoError(ref e) => e.description(),
            KdError::ParsingError(ref e) => e.description(),
        }
    }

    fn cause(&self) -> Option<&dyn Error> {
        match *self {
            KdError::DimensionMismatch { .. } => None,
            KdError::InvalidArgument(..) => None,
            KdError::BuildCancelled => None,
            KdError::IoError(ref e) => Some(e),
            KdError::ParsingError(ref e) => Some(e),
        }
    }
}

impl From<io::Error> for KdError {
    fn from(err: io::Error) -> Self {
        KdError::IoError(err)
    }
}

impl From<ParsingError> for KdError {
    fn from(err: ParsingError) -> Self {
        KdError::ParsingError(err)
    }
}

impl From<KdError> for io::Error {
    fn from(err: KdError) -> Self {
        match err {
            KdError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, Box::new(e)),
        }
    }
}

/// A parsing error occored while reading a configuration or data file
#[derive(Debug)]
pub enum ParsingError {
    /// Yaml was messed up
    MalformedYamlError {
        /// The file that was messed up
        file_name: String,
        /// The value that was messed up
        field: String,
    },
    /// A needed field was missing from the file.
    MissingYamlError {
        /// The file
        file_name: String,
        /// The missing field
        field: String,
    },
    /// An error reading the CSV
    CSVReadError {
        /// The file that the error occored in
        file_name: String,
        /// The line that was messed up
        line_number: usize,
        /// The column name that was messed up
        key: String,
    },
    /// Something else happened parsing a string
    RegularParsingError(&'static str),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParsingError::MalformedYamlError {
                ref file_name,
                ref field,
            } => write!(f, "malformed yaml entry {} in {}", field, file_name),
            ParsingError::MissingYamlError {
                ref file_name,
                ref field,
            } => write!(f, "missing yaml entry {} in {}", field, file_name),
            ParsingError::CSVReadError {
                ref file_name,
                line_number,
                ref key,
            } => write!(
                f,
                "issue reading CSV entry {} on line {} of {}",
                key, line_number, file_name
            ),
            ParsingError::RegularParsingError(message) => {
                write!(f, "Error parsing a string: {}", message)
            }
        }
    }
}

#[allow(deprecated)]
impl Error for ParsingError {
    fn description(&self) -> &str {
        match *self {
            ParsingError::MalformedYamlError { .. } => "there is a error reading a yaml entry",
            ParsingError::MissingYamlError { .. } => "not all message fields set",
            ParsingError::CSVReadError { .. } => "issue reading a CSV entry",
            ParsingError::RegularParsingError(..) => "Error parsing a string",
        }
    }

    fn cause(&self) -> Option<&dyn Error> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_check() {
        assert!(KdError::check_dim(3, 3).is_ok());
        match KdError::check_dim(3, 2) {
            Err(KdError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected a dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn converts_into_io_error() {
        let err: io::Error = KdError::BuildCancelled.into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(format!("{}", err), "the tree build was cancelled");
    }
}
