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

//! # Result Sink
//!
//! The only writer of the destination. Appends are serialized behind a
//! mutex and each line goes out in a single `write_all` followed by a flush,
//! so concurrent callers never interleave partial lines.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::{Result, ZiError};

#[derive(Debug)]
pub struct ZiResultSink<W: Write + Send = File> {
    writer: Mutex<W>,
    target: String,
    written: AtomicUsize,
}

impl ZiResultSink<File> {
    /// Opens `path` for appending, creating it if missing.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| ZiError::sink(format!("cannot open {}: {err}", path.display())))?;
        Ok(Self::with_target(file, path.display().to_string()))
    }
}

impl<W: Write + Send> ZiResultSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_target(writer, "<writer>".to_string())
    }

    fn with_target(writer: W, target: String) -> Self {
        Self {
            writer: Mutex::new(writer),
            target,
            written: AtomicUsize::new(0),
        }
    }

    /// Appends one encoded record plus a newline.
    pub fn append_line(&self, encoded: &str) -> Result<()> {
        if encoded.contains('\n') {
            return Err(ZiError::internal("encoded record spans multiple lines"));
        }
        let mut buffer = String::with_capacity(encoded.len() + 1);
        buffer.push_str(encoded);
        buffer.push('\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ZiError::sink(format!("{}: writer lock poisoned", self.target)))?;
        let io_error = |err: std::io::Error| ZiError::sink(format!("{}: {err}", self.target));
        writer.write_all(buffer.as_bytes()).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|_| ZiError::sink(format!("{}: writer lock poisoned", self.target)))
    }
}
