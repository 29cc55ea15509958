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

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::errors::{Result, ZiError};
use crate::log::core::ZiLogRecord;
use crate::log::formatters::{ZiJsonFormatter, ZiTextFormatter};

pub trait ZiLogHandler {
    fn handle(&self, record: &ZiLogRecord);

    fn flush(&self) {}
}

fn _format(record: &ZiLogRecord, json: bool) -> String {
    if json {
        ZiJsonFormatter::format(record)
    } else {
        ZiTextFormatter::format(record)
    }
}

/// Writes to stderr, keeping stdout free for data.
pub struct ZiStderrHandler {
    json: bool,
}

impl ZiStderrHandler {
    #[allow(non_snake_case)]
    pub fn new(json: bool) -> Self {
        ZiStderrHandler { json }
    }
}

impl ZiLogHandler for ZiStderrHandler {
    fn handle(&self, record: &ZiLogRecord) {
        let line = _format(record, self.json);
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }
}

/// Appends to a log file opened once at start-up.
pub struct ZiFileHandler {
    json: bool,
    file: Mutex<File>,
}

impl ZiFileHandler {
    pub fn open(path: impl AsRef<Path>, json: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                ZiError::config(format!("cannot open log file {}: {err}", path.display()))
            })?;
        Ok(ZiFileHandler {
            json,
            file: Mutex::new(file),
        })
    }
}

impl ZiLogHandler for ZiFileHandler {
    fn handle(&self, record: &ZiLogRecord) {
        let line = _format(record, self.json);
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
