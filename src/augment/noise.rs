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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::augment::ZiAugmenter;
use crate::errors::{Result, ZiError};

/// Character-level noise: toggles letter case and shifts digits, each with
/// probability `intensity`.
#[derive(Debug)]
pub struct ZiNoiseAugmenter {
    intensity: f64,
    seed: Option<u64>,
    calls: AtomicU64,
}

impl ZiNoiseAugmenter {
    #[allow(non_snake_case)]
    pub fn new(intensity: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&intensity) {
            return Err(ZiError::validation(
                "augment.noise 'intensity' must be in [0,1]",
            ));
        }
        Ok(Self {
            intensity,
            seed,
            calls: AtomicU64::new(0),
        })
    }

    fn perturb(&self, text: &str) -> String {
        let mut rng = match self.seed {
            Some(seed) => {
                SmallRng::seed_from_u64(seed.wrapping_add(self.calls.fetch_add(1, Ordering::Relaxed)))
            }
            None => SmallRng::from_entropy(),
        };

        text.chars()
            .map(|ch| {
                if ch.is_alphabetic() && rng.gen_bool(self.intensity) {
                    if ch.is_lowercase() {
                        ch.to_ascii_uppercase()
                    } else {
                        ch.to_ascii_lowercase()
                    }
                } else if ch.is_ascii_digit() && rng.gen_bool(self.intensity) {
                    ((ch as u8 - b'0' + 1) % 10 + b'0') as char
                } else {
                    ch
                }
            })
            .collect()
    }
}

#[async_trait]
impl ZiAugmenter for ZiNoiseAugmenter {
    fn name(&self) -> &'static str {
        "augment.noise"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        Ok(self.perturb(text))
    }
}

/// Builds a noise augmenter. Keys: `intensity` (in `[0,1]`, default 0.1) and `seed`.
#[allow(non_snake_case)]
pub fn augment_noise_factory(config: &Value) -> Result<Arc<dyn ZiAugmenter>> {
    let intensity = match config {
        Value::Null => None,
        Value::Object(obj) => obj.get("intensity").and_then(Value::as_f64),
        _ => return Err(ZiError::validation("augment.noise config must be object")),
    }
    .unwrap_or(0.1);

    let seed = config.get("seed").and_then(Value::as_u64);
    Ok(Arc::new(ZiNoiseAugmenter::new(intensity, seed)?))
}
