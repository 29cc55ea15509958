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

//! # Augmenter Module
//!
//! The augmenter is the text transformation applied to each selected field.
//! The pipeline treats it as opaque: a string goes in, a string (or an error)
//! comes out.
//!
//! ## Implementing Custom Augmenters
//!
//! ```rust
//! use async_trait::async_trait;
//! use zi_augment::augment::ZiAugmenter;
//! use zi_augment::errors::Result;
//!
//! #[derive(Debug)]
//! struct Shout;
//!
//! #[async_trait]
//! impl ZiAugmenter for Shout {
//!     fn name(&self) -> &'static str {
//!         "augment.shout"
//!     }
//!
//!     async fn augment(&self, text: &str) -> Result<String> {
//!         Ok(text.to_uppercase())
//!     }
//! }
//! ```
//!
//! ## Concurrency Contract
//!
//! One augmenter instance serves every worker of a run, so implementations
//! must be safe to call concurrently. An augmenter that is not should be run
//! with `max_workers = 1`.

pub mod noise;
pub mod synonym;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ZiError};

pub use noise::{augment_noise_factory, ZiNoiseAugmenter};
pub use synonym::{augment_synonym_factory, ZiSynonymAugmenter, ZiSynonymEntry};

/// Contract every text augmenter fulfils.
#[async_trait]
pub trait ZiAugmenter: Send + Sync + Debug {
    /// Registry name of the augmenter, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Produces one augmented variant of `text`.
    async fn augment(&self, text: &str) -> Result<String>;
}

/// Factory signature used by the registry.
pub type AugmenterFactory = fn(&Value) -> Result<Arc<dyn ZiAugmenter>>;

/// Name plus opaque parameters identifying which augmenter a run uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiAugmenterSpec {
    pub name: String,
    #[serde(default)]
    pub config: Value,
}

impl ZiAugmenterSpec {
    #[allow(non_snake_case)]
    pub fn new(name: impl Into<String>, config: Value) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

impl Default for ZiAugmenterSpec {
    fn default() -> Self {
        Self::new("augment.synonym", Value::Null)
    }
}

/// Returns the text unchanged.
#[derive(Debug, Default)]
pub struct ZiIdentityAugmenter;

#[async_trait]
impl ZiAugmenter for ZiIdentityAugmenter {
    fn name(&self) -> &'static str {
        "augment.identity"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

#[allow(non_snake_case)]
pub fn augment_identity_factory(_config: &Value) -> Result<Arc<dyn ZiAugmenter>> {
    Ok(Arc::new(ZiIdentityAugmenter))
}

/// Name-indexed collection of augmenter factories.
pub struct ZiAugmenterRegistry {
    factories: HashMap<String, AugmenterFactory>,
}

impl ZiAugmenterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry pre-loaded with the bundled augmenters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("augment.identity", augment_identity_factory as AugmenterFactory);
        registry.register("augment.synonym", augment_synonym_factory as AugmenterFactory);
        registry.register("augment.noise", augment_noise_factory as AugmenterFactory);
        registry
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: AugmenterFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiates the augmenter described by `spec`.
    ///
    /// Unknown names and factory validation failures are configuration errors.
    pub fn build(&self, spec: &ZiAugmenterSpec) -> Result<Arc<dyn ZiAugmenter>> {
        let factory = self.factories.get(spec.name.as_str()).ok_or_else(|| {
            ZiError::config(format!(
                "unknown augmenter '{}' (available: {})",
                spec.name,
                self.names().join(", ")
            ))
        })?;
        factory(&spec.config).map_err(|err| match err {
            ZiError::Validation { message } => ZiError::config(message),
            other => other,
        })
    }
}

impl Default for ZiAugmenterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
