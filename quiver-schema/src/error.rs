// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Defines [`QuiverError`] for representing failures in various quiver operations.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Many different operations in the `quiver` crates return this error type.
#[derive(Debug)]
#[non_exhaustive]
pub enum QuiverError {
    /// Wraps an error from an external crate
    ExternalError(Box<dyn Error + Send + Sync>),
    /// A required argument was absent, out of range or inconsistent with another
    InvalidArgumentError(String),
    /// A schema, field lookup or table structure is invalid
    SchemaError(String),
    /// A stream message could not be framed or decoded
    IpcError(String),
    /// The underlying transport failed
    IoError(String, std::io::Error),
    /// An in-flight operation was aborted by its cancellation signal
    Cancelled(String),
}

impl QuiverError {
    /// Wraps an external error in an `QuiverError`.
    pub fn from_external_error(error: Box<dyn Error + Send + Sync>) -> Self {
        Self::ExternalError(error)
    }
}

impl From<std::io::Error> for QuiverError {
    fn from(error: std::io::Error) -> Self {
        QuiverError::IoError(error.to_string(), error)
    }
}

impl From<std::str::Utf8Error> for QuiverError {
    fn from(error: std::str::Utf8Error) -> Self {
        QuiverError::InvalidArgumentError(error.to_string())
    }
}

impl Display for QuiverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QuiverError::ExternalError(source) => write!(f, "External error: {}", &source),
            QuiverError::InvalidArgumentError(desc) => {
                write!(f, "Invalid argument error: {desc}")
            }
            QuiverError::SchemaError(desc) => write!(f, "Schema error: {desc}"),
            QuiverError::IpcError(desc) => write!(f, "Ipc error: {desc}"),
            QuiverError::IoError(desc, _) => write!(f, "Io error: {desc}"),
            QuiverError::Cancelled(desc) => write!(f, "Operation cancelled: {desc}"),
        }
    }
}

impl Error for QuiverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QuiverError::ExternalError(source) => Some(source.as_ref()),
            QuiverError::IoError(_, source) => Some(source),
            _ => None,
        }
    }
}

/// A specialized `Result` for quiver errors
pub type Result<T, E = QuiverError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_source() {
        let e1 = QuiverError::SchemaError("foo".to_string());
        assert!(e1.source().is_none());

        // one level of wrapping
        let e2 = QuiverError::ExternalError(Box::new(e1));
        let source = e2.source().unwrap().downcast_ref::<QuiverError>().unwrap();
        assert!(matches!(source, QuiverError::SchemaError(_)));

        let e3 = QuiverError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "early eof",
        ));
        let source = e3.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn error_display() {
        let e = QuiverError::InvalidArgumentError("index 3 out of range".to_string());
        assert_eq!(e.to_string(), "Invalid argument error: index 3 out of range");

        let e = QuiverError::Cancelled("read".to_string());
        assert_eq!(e.to_string(), "Operation cancelled: read");
    }
}
