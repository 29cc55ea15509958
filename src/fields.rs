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

//! Selection of the record fields a pass rewrites.
//!
//! Selection happens once per line, at decode time. A record that lacks the
//! required fields is a decode failure; it never reaches the worker pool.

use std::fmt;

use crate::errors::{Result, ZiError};
use crate::record::ZiRecord;

/// Field every record must carry under the default selection.
pub const PRIMARY_FIELD: &str = "instruction";

/// Response fields accepted under the default selection, in priority order.
pub const RESPONSE_FIELDS: [&str; 2] = ["response", "output"];

/// Which fields of a record are eligible for augmentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ZiFieldSelector {
    /// `instruction` plus the first of `response` / `output` present.
    /// Both halves are required.
    #[default]
    InstructionResponse,
    /// A user-supplied set. Listed fields absent from a record are skipped,
    /// but at least one of them must be present.
    Explicit(Vec<String>),
}

impl ZiFieldSelector {
    /// Builds an explicit selector, dropping blanks and duplicates while
    /// keeping the order the names were given in.
    pub fn explicit<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || fields.iter().any(|existing| existing == name) {
                continue;
            }
            fields.push(name.to_string());
        }
        if fields.is_empty() {
            return Err(ZiError::config("explicit field list may not be empty"));
        }
        Ok(ZiFieldSelector::Explicit(fields))
    }

    /// Resolves the concrete field names to augment for one record.
    ///
    /// Every returned field is present in the record and holds a string.
    pub fn select(&self, record: &ZiRecord) -> Result<Vec<String>> {
        let selected = match self {
            ZiFieldSelector::InstructionResponse => {
                if !record.contains(PRIMARY_FIELD) {
                    return Err(ZiError::decode(
                        record.line,
                        format!("record has no '{PRIMARY_FIELD}' field"),
                    ));
                }
                let response = RESPONSE_FIELDS
                    .iter()
                    .copied()
                    .find(|name| record.contains(name))
                    .ok_or_else(|| {
                        ZiError::decode(
                            record.line,
                            format!("record has none of the fields {RESPONSE_FIELDS:?}"),
                        )
                    })?;
                vec![PRIMARY_FIELD.to_string(), response.to_string()]
            }
            ZiFieldSelector::Explicit(names) => {
                let present: Vec<String> = names
                    .iter()
                    .filter(|name| record.contains(name))
                    .cloned()
                    .collect();
                if present.is_empty() {
                    return Err(ZiError::decode(
                        record.line,
                        format!("record has none of the configured fields {names:?}"),
                    ));
                }
                present
            }
        };

        if let Some(name) = selected.iter().find(|name| record.get_str(name).is_none()) {
            return Err(ZiError::decode(
                record.line,
                format!("field '{name}' must be a string"),
            ));
        }
        Ok(selected)
    }
}

impl fmt::Display for ZiFieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiFieldSelector::InstructionResponse => {
                write!(f, "{PRIMARY_FIELD}+{}", RESPONSE_FIELDS.join("|"))
            }
            ZiFieldSelector::Explicit(names) => write!(f, "{}", names.join(",")),
        }
    }
}
