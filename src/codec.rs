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

//! JSONL codec: one line in, one record (plus its augmentable fields) out.

use serde_json::error::Category;

use crate::errors::{Result, ZiError};
use crate::fields::ZiFieldSelector;
use crate::record::ZiRecord;

/// A decoded line together with the fields selected for augmentation.
#[derive(Clone, Debug)]
pub struct ZiDecodedLine {
    pub record: ZiRecord,
    pub fields: Vec<String>,
}

/// Decodes JSONL lines into records and encodes records back into lines.
///
/// Values of fields that are not rewritten are carried as raw text, so an
/// encoded line differs from its source only in the rewritten fields and in
/// the whitespace between members.
#[derive(Clone, Debug, Default)]
pub struct ZiRecordCodec {
    selector: ZiFieldSelector,
}

impl ZiRecordCodec {
    #[allow(non_snake_case)]
    pub fn new(selector: ZiFieldSelector) -> Self {
        Self { selector }
    }

    /// Parses one line. Anything other than a JSON object, or an object that
    /// lacks the fields the selector requires, is a [`ZiError::Decode`].
    pub fn decode(&self, line: &str, line_number: usize) -> Result<ZiDecodedLine> {
        let text = line.trim_end_matches(['\r', '\n']);
        let record = ZiRecord::parse(line_number, text).map_err(|err| match err.classify() {
            Category::Data => ZiError::decode(
                line_number,
                format!("expected a json object, got {}", _kind(text)),
            ),
            _ => ZiError::decode(line_number, format!("invalid json: {err}")),
        })?;

        let fields = self.selector.select(&record)?;
        Ok(ZiDecodedLine { record, fields })
    }

    /// Serializes a record to a single line without the trailing newline.
    pub fn encode(&self, record: &ZiRecord) -> Result<String> {
        Ok(serde_json::to_string(record)?)
    }
}

fn _kind(text: &str) -> &'static str {
    match text.trim_start().as_bytes().first() {
        Some(b'n') => "null",
        Some(b't' | b'f') => "boolean",
        Some(b'"') => "string",
        Some(b'[') => "array",
        _ => "number",
    }
}
