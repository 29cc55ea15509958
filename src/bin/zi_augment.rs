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

//! Command-line entry point: augments one JSONL file into an output
//! directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use zi_augment::{
    ZiAugmentConfigBuilder, ZiAugmentPipeline, ZiAugmenterRegistry, ZiAugmenterSpec,
    ZiLogConfigBuilder, ZiLogger, ZiPreflight, ZiResultSink,
};

/// Write `max-passes` augmented variants of every record in a JSONL file.
///
/// Results land in `<output>/<input file name>`; one line per successful pass.
#[derive(Parser, Debug)]
#[command(name = "zi-augment", version)]
struct Cli {
    /// Input JSONL file
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Existing output directory
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Augmented variants produced per record
    #[arg(long)]
    max_passes: Option<usize>,

    /// Concurrency ceiling, clamped to the number of CPUs
    #[arg(long)]
    max_workers: Option<usize>,

    /// Replace an existing destination file
    #[arg(long)]
    overwrite: bool,

    /// Copy the input records into the destination before the variants
    #[arg(long)]
    include_original: bool,

    /// Comma-separated fields to augment (default: instruction + response/output)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Augmenter name, e.g. augment.synonym or augment.noise
    #[arg(long)]
    augmenter: Option<String>,

    /// Augmenter parameters as a JSON object; applies to the configured
    /// augmenter when --augmenter is not given
    #[arg(long)]
    augmenter_config: Option<String>,

    /// Give up on a single pass after this many milliseconds
    #[arg(long)]
    task_timeout_ms: Option<u64>,

    /// JSON or YAML configuration file; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// OFF, ERROR, WARN, INFO, DEBUG or TRACE
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<String>,
}

impl Cli {
    /// Flags as the topmost configuration layer, written over `base`.
    fn layer(&self, base: ZiAugmentConfigBuilder) -> Result<ZiAugmentConfigBuilder> {
        let flags = ZiAugmentConfigBuilder {
            fields: self.fields.clone(),
            max_passes: self.max_passes,
            max_workers: self.max_workers,
            augmenter: self
                .augmenter
                .as_ref()
                .map(|name| ZiAugmenterSpec::new(name, Value::Null)),
            task_timeout_ms: self.task_timeout_ms,
            log: Some(ZiLogConfigBuilder {
                default_level: self.log_level.clone(),
                json_format: self.log_json.then_some(true),
                file_path: self.log_file.clone(),
                ..Default::default()
            }),
        };
        let layered = base.overlay(flags);

        match &self.augmenter_config {
            Some(raw) => {
                let config = serde_json::from_str::<Value>(raw)
                    .context("--augmenter-config is not valid JSON")?;
                Ok(layered.augmenter_config(config))
            }
            None => Ok(layered),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => ZiAugmentConfigBuilder::from_path(path)?,
        None => ZiAugmentConfigBuilder::default(),
    };
    let layered = cli.layer(base)?;

    let log_config = layered.log.clone().unwrap_or_default().build();
    ZiLogger::init(&log_config)?;

    let config = layered.build()?;
    let workers = config.max_workers;
    let pipeline = ZiAugmentPipeline::from_registry(config, &ZiAugmenterRegistry::with_defaults())?;

    let destination = ZiPreflight::new(&cli.file, &cli.output)
        .overwrite(cli.overwrite)
        .include_original(cli.include_original)
        .prepare()?;
    let sink = ZiResultSink::open_append(&destination.path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let stats = runtime.block_on(pipeline.run_path(&destination.input, &sink))?;

    log::logger().flush();
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}
