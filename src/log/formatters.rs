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

use chrono::SecondsFormat;

use crate::log::core::ZiLogRecord;

pub struct ZiJsonFormatter;

impl ZiJsonFormatter {
    pub fn format(record: &ZiLogRecord) -> String {
        record.to_json().to_string()
    }
}

pub struct ZiTextFormatter;

impl ZiTextFormatter {
    /// `<timestamp> <LEVEL> <event>: <message> key=value ...`
    pub fn format(record: &ZiLogRecord) -> String {
        let mut line = format!(
            "{} {:<5} ",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            record.level.as_str()
        );
        if let Some(event) = &record.event {
            line.push_str(event);
            line.push_str(": ");
        }
        line.push_str(&record.message);
        for (key, value) in &record.fields {
            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }
}
