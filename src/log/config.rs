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

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Configuration for [`ZiLogger`](super::ZiLogger): console/file enablement,
/// default level and output format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiLogConfig {
    pub default_level: String,
    pub console_enabled: bool,
    /// Emit JSON lines instead of text, for every handler.
    pub json_format: bool,
    /// Whether file logging is enabled.
    pub file_enabled: bool,
    /// Log file path when file logging is enabled. Appended to.
    pub file_path: Option<String>,
}

impl Default for ZiLogConfig {
    fn default() -> Self {
        ZiLogConfig {
            default_level: "INFO".to_string(),
            console_enabled: true,
            json_format: false,
            file_enabled: false,
            file_path: None,
        }
    }
}

impl ZiLogConfig {
    /// Maximum level accepted by the logger. Unknown names fall back to INFO.
    pub fn level_filter(&self) -> LevelFilter {
        match self.default_level.to_ascii_uppercase().as_str() {
            "OFF" => LevelFilter::Off,
            "TRACE" => LevelFilter::Trace,
            "DEBUG" => LevelFilter::Debug,
            "WARN" | "WARNING" => LevelFilter::Warn,
            "ERROR" => LevelFilter::Error,
            _ => LevelFilter::Info,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZiLogConfigBuilder {
    pub default_level: Option<String>,
    pub console_enabled: Option<bool>,
    pub json_format: Option<bool>,
    pub file_enabled: Option<bool>,
    pub file_path: Option<String>,
}

impl ZiLogConfigBuilder {
    pub fn build(self) -> ZiLogConfig {
        let base = ZiLogConfig::default();
        // A path on its own implies file logging.
        let file_enabled = self
            .file_enabled
            .unwrap_or(self.file_path.is_some() || base.file_enabled);
        ZiLogConfig {
            default_level: self.default_level.unwrap_or(base.default_level),
            console_enabled: self.console_enabled.unwrap_or(base.console_enabled),
            json_format: self.json_format.unwrap_or(base.json_format),
            file_enabled,
            file_path: self.file_path.or(base.file_path),
        }
    }

    pub fn overlay(self, top: ZiLogConfigBuilder) -> Self {
        Self {
            default_level: top.default_level.or(self.default_level),
            console_enabled: top.console_enabled.or(self.console_enabled),
            json_format: top.json_format.or(self.json_format),
            file_enabled: top.file_enabled.or(self.file_enabled),
            file_path: top.file_path.or(self.file_path),
        }
    }
}
