//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zi Augment Error Module
//!
//! Error types shared by every stage of the augmentation pipeline.
//!
//! ## Error Categories
//!
//! Errors fall into two recovery classes:
//!
//! - **Fatal**: `Config`, `Io`, `SinkWrite` and `Internal`. These abort the run
//!   (or prevent it from starting) and surface to the caller.
//! - **Per-record**: `Decode` and `Augmentation`. These are logged with the
//!   offending line (and pass) and the run continues with the next unit of work.
//!
//! `Validation` and `Serde` are produced by helpers (augmenter factories, config
//! parsing) and are usually rewrapped into one of the categories above by the
//! caller that knows the context.
//!
//! ## Usage
//!
//! ```rust
//! use zi_augment::errors::{Result, ZiError};
//!
//! fn passes(value: usize) -> Result<usize> {
//!     if value == 0 {
//!         return Err(ZiError::config("max_passes must be at least 1"));
//!     }
//!     Ok(value)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zi Augment.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zi Augment.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Invalid paths, flags or configuration values. Always fatal.
    #[error("config error: {message}")]
    Config { message: String },

    /// One input line could not be decoded into a usable record.
    #[error("decode error at line {line}: {message}")]
    Decode { line: usize, message: String },

    /// The augmenter failed for a field while running one pass of a line.
    #[error("augmentation error at line {line}, pass {pass} (field '{field}'): {message}")]
    Augmentation {
        line: usize,
        pass: usize,
        field: String,
        message: String,
    },

    /// The destination could not be appended to.
    #[error("sink write error: {0}")]
    SinkWrite(String),

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        ZiError::Config {
            message: message.into(),
        }
    }

    /// Helper to construct decode errors tied to an input line.
    pub fn decode<T: Into<String>>(line: usize, message: T) -> Self {
        ZiError::Decode {
            line,
            message: message.into(),
        }
    }

    /// Helper to construct augmentation errors tied to a line, pass and field.
    pub fn augmentation(
        line: usize,
        pass: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ZiError::Augmentation {
            line,
            pass,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Helper to construct sink write errors.
    pub fn sink<T: Into<String>>(message: T) -> Self {
        ZiError::SinkWrite(message.into())
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }

    /// Whether the error must stop the run rather than skip one unit of work.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ZiError::Decode { .. } | ZiError::Augmentation { .. } | ZiError::Validation { .. }
        )
    }
}
