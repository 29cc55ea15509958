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

//! # Run Configuration
//!
//! [`ZiAugmentConfig`] is built once per run and shared read-only (behind an
//! `Arc`) by the scheduler, the workers and the driver.
//!
//! Values come from three layers, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. an optional JSON or YAML file,
//! 3. command-line flags.
//!
//! Layers are expressed as [`ZiAugmentConfigBuilder`] values whose `Some`
//! fields override the layer below; [`ZiAugmentConfigBuilder::build`] applies
//! validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::augment::ZiAugmenterSpec;
use crate::errors::{Result, ZiError};
use crate::fields::ZiFieldSelector;
use crate::log::ZiLogConfigBuilder;

/// Number of workers the host can run in parallel.
pub fn host_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Immutable configuration for one augmentation run.
#[derive(Clone, Debug)]
pub struct ZiAugmentConfig {
    /// Fields rewritten by each pass.
    pub fields: ZiFieldSelector,
    /// Variants produced per input record.
    pub max_passes: usize,
    /// Concurrency ceiling, never above [`host_parallelism`].
    pub max_workers: usize,
    /// Augmenter name and parameters.
    pub augmenter: ZiAugmenterSpec,
    /// Per-task deadline. `None` waits indefinitely.
    pub task_timeout: Option<Duration>,
}

impl Default for ZiAugmentConfig {
    fn default() -> Self {
        Self {
            fields: ZiFieldSelector::default(),
            max_passes: 1,
            max_workers: host_parallelism(),
            augmenter: ZiAugmenterSpec::default(),
            task_timeout: None,
        }
    }
}

impl ZiAugmentConfig {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: ZiFieldSelector) -> Self {
        self.fields = fields;
        self
    }

    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn augmenter(mut self, augmenter: ZiAugmenterSpec) -> Self {
        self.augmenter = augmenter;
        self
    }

    pub fn task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Checks the invariants the pipeline relies on and clamps the worker
    /// count to the host parallelism.
    pub fn validated(mut self) -> Result<Self> {
        if self.max_passes == 0 {
            return Err(ZiError::config("max_passes must be at least 1"));
        }
        if self.max_workers == 0 {
            return Err(ZiError::config("max_workers must be at least 1"));
        }
        if let ZiFieldSelector::Explicit(names) = &self.fields {
            if names.is_empty() {
                return Err(ZiError::config("explicit field list may not be empty"));
            }
        }
        if self.augmenter.name.trim().is_empty() {
            return Err(ZiError::config("augmenter name may not be empty"));
        }
        if self.task_timeout == Some(Duration::ZERO) {
            return Err(ZiError::config("task timeout must be positive"));
        }

        let host = host_parallelism();
        if self.max_workers > host {
            log::warn!(
                "augment.config.clamp: max_workers exceeds host parallelism, clamping - requested={}, host={}",
                self.max_workers,
                host
            );
            self.max_workers = host;
        }
        Ok(self)
    }
}

/// One configuration layer. Every field is optional; `None` defers to the
/// layer below.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZiAugmentConfigBuilder {
    pub fields: Option<Vec<String>>,
    pub max_passes: Option<usize>,
    pub max_workers: Option<usize>,
    pub augmenter: Option<ZiAugmenterSpec>,
    pub task_timeout_ms: Option<u64>,
    pub log: Option<ZiLogConfigBuilder>,
}

impl ZiAugmentConfigBuilder {
    /// Reads a layer from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            ZiError::config(format!("cannot read config {}: {err}", path.display()))
        })?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let parsed = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ZiError::from),
            _ => serde_json::from_str(&content).map_err(ZiError::from),
        };
        parsed.map_err(|err| ZiError::config(format!("invalid config {}: {err}", path.display())))
    }

    /// Returns `self` with every `Some` value of `top` written over it.
    pub fn overlay(self, top: ZiAugmentConfigBuilder) -> Self {
        Self {
            fields: top.fields.or(self.fields),
            max_passes: top.max_passes.or(self.max_passes),
            max_workers: top.max_workers.or(self.max_workers),
            augmenter: top.augmenter.or(self.augmenter),
            task_timeout_ms: top.task_timeout_ms.or(self.task_timeout_ms),
            log: match (self.log, top.log) {
                (Some(base), Some(top)) => Some(base.overlay(top)),
                (base, top) => top.or(base),
            },
        }
    }

    /// Replaces the parameters of this layer's augmenter, keeping its name.
    /// A layer that names no augmenter gets the default one.
    pub fn augmenter_config(mut self, config: Value) -> Self {
        let mut spec = self.augmenter.take().unwrap_or_default();
        spec.config = config;
        self.augmenter = Some(spec);
        self
    }

    /// Materializes and validates the run configuration.
    pub fn build(&self) -> Result<ZiAugmentConfig> {
        let base = ZiAugmentConfig::default();
        let fields = match &self.fields {
            Some(names) => ZiFieldSelector::explicit(names)?,
            None => base.fields,
        };
        ZiAugmentConfig {
            fields,
            max_passes: self.max_passes.unwrap_or(base.max_passes),
            max_workers: self.max_workers.unwrap_or(base.max_workers),
            augmenter: self.augmenter.clone().unwrap_or(base.augmenter),
            task_timeout: self.task_timeout_ms.map(Duration::from_millis),
        }
        .validated()
    }
}
