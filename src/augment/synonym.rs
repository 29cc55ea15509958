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

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::augment::ZiAugmenter;
use crate::errors::{Result, ZiError};

const DEFAULT_AUG_P: f64 = 0.2;

const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    ("answer", &["reply", "response"]),
    ("begin", &["start", "commence"]),
    ("big", &["large", "huge"]),
    ("create", &["make", "build"]),
    ("describe", &["explain", "outline"]),
    ("example", &["instance", "sample"]),
    ("fast", &["quick", "rapid"]),
    ("find", &["locate", "discover"]),
    ("give", &["provide", "offer"]),
    ("good", &["great", "fine"]),
    ("help", &["assist", "aid"]),
    ("important", &["significant", "crucial"]),
    ("list", &["enumerate", "itemize"]),
    ("make", &["create", "produce"]),
    ("problem", &["issue", "difficulty"]),
    ("question", &["query", "inquiry"]),
    ("show", &["display", "demonstrate"]),
    ("simple", &["easy", "basic"]),
    ("small", &["little", "tiny"]),
    ("use", &["utilize", "employ"]),
    ("write", &["compose", "draft"]),
];

#[derive(Debug, Clone)]
pub struct ZiSynonymEntry {
    pub word: String,
    pub replacements: Vec<String>,
}

/// Word-level synonym replacement.
///
/// Each word found in the table is swapped for one of its replacements with
/// probability `aug_p`. Whitespace and punctuation between words are kept as
/// they were. Without a seed every call draws fresh randomness, so repeated
/// passes over the same text yield different variants.
#[derive(Debug)]
pub struct ZiSynonymAugmenter {
    table: HashMap<String, Vec<String>>,
    aug_p: f64,
    seed: Option<u64>,
    calls: AtomicU64,
    word: Regex,
}

impl ZiSynonymAugmenter {
    #[allow(non_snake_case)]
    pub fn new(entries: Vec<ZiSynonymEntry>, aug_p: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&aug_p) {
            return Err(ZiError::validation("augment.synonym 'aug_p' must be in [0,1]"));
        }
        let word = Regex::new(r"\w+")
            .map_err(|err| ZiError::internal(format!("word pattern: {err}")))?;
        let table = entries
            .into_iter()
            .map(|entry| (entry.word.to_lowercase(), entry.replacements))
            .collect();
        Ok(Self {
            table,
            aug_p,
            seed,
            calls: AtomicU64::new(0),
            word,
        })
    }

    /// Built-in English table.
    pub fn default_entries() -> Vec<ZiSynonymEntry> {
        DEFAULT_SYNONYMS
            .iter()
            .map(|(word, replacements)| ZiSynonymEntry {
                word: word.to_string(),
                replacements: replacements.iter().map(|r| r.to_string()).collect(),
            })
            .collect()
    }

    fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => {
                let call = self.calls.fetch_add(1, Ordering::Relaxed);
                SmallRng::seed_from_u64(seed.wrapping_add(call))
            }
            None => SmallRng::from_entropy(),
        }
    }

    fn replace(&self, text: &str, rng: &mut SmallRng) -> String {
        if self.table.is_empty() {
            return text.to_string();
        }

        self.word
            .replace_all(text, |caps: &Captures| {
                let word = &caps[0];
                match self.table.get(&word.to_lowercase()) {
                    Some(replacements) if rng.gen_bool(self.aug_p) => replacements
                        .choose(&mut *rng)
                        .map(|replacement| _match_case(word, replacement))
                        .unwrap_or_else(|| word.to_string()),
                    _ => word.to_string(),
                }
            })
            .into_owned()
    }
}

#[async_trait]
impl ZiAugmenter for ZiSynonymAugmenter {
    fn name(&self) -> &'static str {
        "augment.synonym"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        let mut rng = self.rng();
        Ok(self.replace(text, &mut rng))
    }
}

/// Carries a leading capital over to the replacement.
fn _match_case(original: &str, replacement: &str) -> String {
    let capitalized = original.chars().next().is_some_and(char::is_uppercase);
    if !capitalized {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds a synonym augmenter from JSON parameters.
///
/// Accepted keys: `synonyms` (array of `{word, replacements}`; the built-in
/// table when omitted), `aug_p` (in `[0,1]`, default 0.2) and `seed`.
#[allow(non_snake_case)]
pub fn augment_synonym_factory(config: &Value) -> Result<Arc<dyn ZiAugmenter>> {
    let empty = serde_json::Map::new();
    let obj = match config {
        Value::Null => &empty,
        Value::Object(obj) => obj,
        _ => {
            return Err(ZiError::validation(
                "augment.synonym config must be object",
            ))
        }
    };

    let aug_p = obj.get("aug_p").and_then(Value::as_f64).unwrap_or(DEFAULT_AUG_P);
    let seed = obj.get("seed").and_then(Value::as_u64);

    let synonyms = match obj.get("synonyms") {
        None => ZiSynonymAugmenter::default_entries(),
        Some(value) => {
            let entries = value.as_array().ok_or_else(|| {
                ZiError::validation("augment.synonym 'synonyms' must be an array")
            })?;
            if entries.is_empty() {
                return Err(ZiError::validation(
                    "augment.synonym 'synonyms' may not be empty",
                ));
            }
            entries.iter().map(_parse_entry).collect::<Result<Vec<_>>>()?
        }
    };

    Ok(Arc::new(ZiSynonymAugmenter::new(synonyms, aug_p, seed)?))
}

fn _parse_entry(entry: &Value) -> Result<ZiSynonymEntry> {
    let obj = entry
        .as_object()
        .ok_or_else(|| ZiError::validation("augment.synonym entries must be objects"))?;
    let word = obj
        .get("word")
        .and_then(Value::as_str)
        .ok_or_else(|| ZiError::validation("augment.synonym entry missing 'word'"))?
        .to_lowercase();
    let replacements = obj
        .get("replacements")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ZiError::validation("augment.synonym entry requires array 'replacements'")
        })?;
    if replacements.is_empty() {
        return Err(ZiError::validation(
            "augment.synonym 'replacements' may not be empty",
        ));
    }
    let replacements = replacements
        .iter()
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| ZiError::validation("augment.synonym replacements must be strings"))
                .map(|s| s.to_string())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ZiSynonymEntry { word, replacements })
}
