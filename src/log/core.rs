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

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{json, Map, Value};

use crate::errors::{Result, ZiError};
use crate::log::config::ZiLogConfig;
use crate::log::handlers::{ZiFileHandler, ZiLogHandler, ZiStderrHandler};

/// One log event, split into the `event.name: message - key=value, ...`
/// parts used by every log call in the crate.
#[derive(Clone, Debug)]
pub struct ZiLogRecord {
    pub level: Level,
    pub target: String,
    pub event: Option<String>,
    pub message: String,
    pub fields: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ZiLogRecord {
    /// Parses a formatted log message. Messages that do not follow the
    /// convention keep their full text in `message`.
    pub fn parse(level: Level, target: &str, text: &str) -> Self {
        let (event, rest) = match text.split_once(": ") {
            Some((head, tail)) if _is_event_name(head) => (Some(head.to_string()), tail),
            _ => (None, text),
        };

        let (message, fields) = match rest.rsplit_once(" - ") {
            Some((message, pairs)) => match _parse_fields(pairs) {
                Some(fields) => (message.to_string(), fields),
                None => (rest.to_string(), Map::new()),
            },
            None => (rest.to_string(), Map::new()),
        };

        ZiLogRecord {
            level,
            target: target.to_string(),
            event,
            message,
            fields,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut data = Map::new();
        data.insert(
            "timestamp".into(),
            json!(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        data.insert("level".into(), json!(self.level.as_str()));
        data.insert("target".into(), json!(self.target));
        if let Some(event) = &self.event {
            data.insert("event".into(), json!(event));
        }
        data.insert("message".into(), json!(self.message));
        if !self.fields.is_empty() {
            data.insert("fields".into(), Value::Object(self.fields.clone()));
        }
        Value::Object(data)
    }
}

fn _is_event_name(head: &str) -> bool {
    head.contains('.')
        && head
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '_')
}

fn _parse_fields(pairs: &str) -> Option<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs.split(", ") {
        let (key, value) = pair.split_once('=')?;
        if key.is_empty() || key.contains(' ') {
            return None;
        }
        fields.insert(key.to_string(), json!(value));
    }
    Some(fields)
}

/// Backend for the `log` facade, fanning records out to the configured
/// handlers.
pub struct ZiLogger {
    level: LevelFilter,
    handlers: Vec<Box<dyn ZiLogHandler + Send + Sync>>,
}

impl ZiLogger {
    /// Builds a logger from configuration without installing it.
    pub fn new(config: &ZiLogConfig) -> Result<Self> {
        let mut handlers: Vec<Box<dyn ZiLogHandler + Send + Sync>> = Vec::new();
        if config.console_enabled {
            handlers.push(Box::new(ZiStderrHandler::new(config.json_format)));
        }
        if config.file_enabled {
            let path = config
                .file_path
                .as_deref()
                .ok_or_else(|| ZiError::config("file logging enabled without a file_path"))?;
            handlers.push(Box::new(ZiFileHandler::open(path, config.json_format)?));
        }
        Ok(Self {
            level: config.level_filter(),
            handlers,
        })
    }

    /// Installs the logger as the global `log` backend. Fails if another
    /// backend is already installed.
    pub fn init(config: &ZiLogConfig) -> Result<()> {
        let logger = Self::new(config)?;
        let level = logger.level;
        log::set_boxed_logger(Box::new(logger))
            .map_err(|err| ZiError::internal(format!("logger already installed: {err}")))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ZiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let parsed = ZiLogRecord::parse(
            record.level(),
            record.target(),
            &record.args().to_string(),
        );
        for handler in &self.handlers {
            handler.handle(&parsed);
        }
    }

    fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}
