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

//! # Zi Record Module
//!
//! A [`ZiRecord`] is one decoded line of the input file: the object's fields
//! in source order, plus the 1-based line number it came from.
//!
//! Field values are kept as the exact JSON text they had in the source line
//! ([`serde_json::value::RawValue`]). Only the fields a pass rewrites are ever
//! parsed, so every other value is written back byte for byte: string
//! escapes, number spelling and nested whitespace all survive. Keys are
//! re-encoded with standard JSON escaping.
//!
//! Records are shared read-only between the concurrent passes of a line. A
//! pass never mutates its source; it builds a new record with
//! [`ZiRecord::with_fields`].

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::value::{to_raw_value, RawValue};

/// One field of a record: its name and its value as raw JSON text.
pub type ZiField = (String, Box<RawValue>);

/// One structured record decoded from the input stream.
#[derive(Clone, Debug)]
pub struct ZiRecord {
    /// 1-based line number of the source line.
    pub line: usize,
    fields: Vec<ZiField>,
}

impl ZiRecord {
    /// Constructs a record from its source line number and fields.
    ///
    /// A repeated name keeps its first position and its last value.
    #[allow(non_snake_case)]
    pub fn new(line: usize, fields: Vec<ZiField>) -> Self {
        let mut record = ZiRecord {
            line,
            fields: Vec::with_capacity(fields.len()),
        };
        for (name, value) in fields {
            record.put(name, value);
        }
        record
    }

    /// Parses the text of one JSON object. Errors of category
    /// [`serde_json::error::Category::Data`] mean the text is valid JSON
    /// but not an object.
    pub fn parse(line: usize, text: &str) -> serde_json::Result<Self> {
        let ZiFieldList(fields) = serde_json::from_str(text)?;
        Ok(ZiRecord::new(line, fields))
    }

    /// Returns the raw JSON text of a field, if present.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| &**value)
    }

    /// Returns the decoded value of a field when it is a JSON string.
    pub fn get_str(&self, name: &str) -> Option<String> {
        let raw = self.get(name)?;
        serde_json::from_str::<String>(raw.get()).ok()
    }

    /// Whether the record carries a field with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Builds a new record from this one with the given string fields replaced.
    ///
    /// Fields not named in `replacements` keep their raw text and position;
    /// replaced fields also keep their original position.
    pub fn with_fields<I, K>(&self, replacements: I) -> serde_json::Result<ZiRecord>
    where
        I: IntoIterator<Item = (K, String)>,
        K: Into<String>,
    {
        let mut record = self.clone();
        for (name, value) in replacements {
            record.put(name.into(), to_raw_value(&value)?);
        }
        Ok(record)
    }

    fn put(&mut self, name: String, value: Box<RawValue>) {
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

impl Serialize for ZiRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ZiFieldList(Vec<ZiField>);

impl<'de> Deserialize<'de> for ZiFieldList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = ZiFieldList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a json object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Box<RawValue>>()? {
                    fields.push(entry);
                }
                Ok(ZiFieldList(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
