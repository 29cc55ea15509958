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

//! Checks run before any augmentation starts. The destination is
//! `<output_dir>/<input file name>` and is created (or truncated) here, so
//! the sink only ever appends.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::errors::{Result, ZiError};

#[derive(Clone, Debug, Default)]
pub struct ZiPreflight {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Replace an existing destination instead of refusing to start.
    pub overwrite: bool,
    /// Seed the destination with a copy of the input records.
    pub include_original: bool,
}

/// A destination that passed every check and is ready for appends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZiDestination {
    pub input: PathBuf,
    pub path: PathBuf,
}

impl ZiPreflight {
    #[allow(non_snake_case)]
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn include_original(mut self, include: bool) -> Self {
        self.include_original = include;
        self
    }

    /// Path the results will be written to.
    pub fn destination(&self) -> Result<PathBuf> {
        let name = self.input.file_name().ok_or_else(|| {
            ZiError::config(format!("input path {} has no file name", self.input.display()))
        })?;
        Ok(self.output_dir.join(name))
    }

    /// Validates the paths and prepares the destination file.
    pub fn prepare(&self) -> Result<ZiDestination> {
        if !self.input.is_file() {
            return Err(ZiError::config(format!(
                "input file {} does not exist or is not a file",
                self.input.display()
            )));
        }
        if !self.output_dir.is_dir() {
            return Err(ZiError::config(format!(
                "output directory {} does not exist or is not a directory",
                self.output_dir.display()
            )));
        }

        let path = self.destination()?;
        if _same_file(&self.input, &path) {
            return Err(ZiError::config(format!(
                "destination {} is the input file; choose another output directory",
                path.display()
            )));
        }

        if path.exists() {
            if !self.overwrite {
                return Err(ZiError::config(format!(
                    "destination {} already exists; move or rename it, or pass --overwrite",
                    path.display()
                )));
            }
            log::warn!(
                "augment.preflight.overwrite: replacing existing destination - path={}",
                path.display()
            );
        }

        if self.include_original {
            fs::copy(&self.input, &path).map_err(|err| {
                ZiError::Io(format!(
                    "cannot copy {} to {}: {err}",
                    self.input.display(),
                    path.display()
                ))
            })?;
        } else {
            File::create(&path).map_err(|err| {
                ZiError::Io(format!("cannot create {}: {err}", path.display()))
            })?;
        }

        log::info!(
            "augment.preflight.ready: destination prepared - path={}, include_original={}",
            path.display(),
            self.include_original
        );
        Ok(ZiDestination {
            input: self.input.clone(),
            path,
        })
    }
}

fn _same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
