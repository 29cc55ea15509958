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

//! # Zi Augment
//!
//! Multi-pass text augmentation for JSON Lines datasets. Each input record is
//! rewritten `max_passes` times by an augmenter, with up to `max_workers`
//! passes running concurrently, and every successful variant is appended to
//! the destination as its own line.
//!
//! ## Module Overview
//!
//! - **record**: ZiRecord, one decoded JSON object plus its source line
//! - **fields**: which fields a pass rewrites
//! - **codec**: line <-> record conversion with field order preserved
//! - **augment**: the ZiAugmenter trait, built-in augmenters and their registry
//! - **config**: run configuration, layered from file and command line
//! - **task**: one pass over one record, atomic across fields
//! - **scheduler**: splits a record's passes into bounded rounds
//! - **pool**: long-lived bounded worker pool with a per-round barrier
//! - **sink**: line-atomic, serialized appends to the destination
//! - **pipeline**: the driver tying the above together
//! - **preflight**: input/output checks before a run starts
//! - **log**: `log` backend with text and JSON output
//!
//! ## Quick Start
//!
//! ```rust
//! use zi_augment::{
//!     ZiAugmentConfig, ZiAugmentPipeline, ZiAugmenterRegistry, ZiPreflight, ZiResultSink,
//! };
//!
//! # async fn demo() -> zi_augment::Result<()> {
//! let destination = ZiPreflight::new("data/train.jsonl", "out").prepare()?;
//! let config = ZiAugmentConfig::new().max_passes(4).max_workers(2);
//! let pipeline = ZiAugmentPipeline::from_registry(config, &ZiAugmenterRegistry::with_defaults())?;
//! let sink = ZiResultSink::open_append(&destination.path)?;
//! let stats = pipeline.run_path(&destination.input, &sink).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Decode and augmentation
//! errors are logged and skipped by the pipeline; everything else stops the
//! run. See [`ZiError::is_fatal`].

#![allow(non_snake_case)]

pub mod augment;
pub mod codec;
pub mod config;
pub mod errors;
pub mod fields;
pub mod log;
pub mod pipeline;
pub mod pool;
pub mod preflight;
pub mod record;
pub mod scheduler;
pub mod sink;
pub mod task;

pub use errors::{Result, ZiError};
pub use record::{ZiField, ZiRecord};
pub use fields::ZiFieldSelector;
pub use codec::{ZiDecodedLine, ZiRecordCodec};
pub use augment::{
    AugmenterFactory, ZiAugmenter, ZiAugmenterRegistry, ZiAugmenterSpec, ZiIdentityAugmenter,
    ZiNoiseAugmenter, ZiSynonymAugmenter, ZiSynonymEntry,
};
pub use config::{host_parallelism, ZiAugmentConfig, ZiAugmentConfigBuilder};
pub use task::{ZiTask, ZiTaskFailure, ZiTaskOutcome};
pub use scheduler::{ZiPassPlan, ZiRound};
pub use pool::ZiWorkerPool;
pub use sink::ZiResultSink;
pub use pipeline::{ProgressCallback, ProgressInfo, ZiAugmentPipeline, ZiRunStats};
pub use preflight::{ZiDestination, ZiPreflight};
pub use self::log::{ZiLogConfig, ZiLogConfigBuilder, ZiLogger};
