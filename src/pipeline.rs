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

//! # Augmentation Pipeline
//!
//! Drives a run end to end: streams the input one line at a time, decodes
//! each line, issues the record's passes round by round through the worker
//! pool, and appends every successful variant to the result sink.
//!
//! ## Failure Handling
//!
//! - A line that cannot be decoded is logged and skipped.
//! - A failed pass is logged and produces no output; its siblings still run.
//! - A sink write failure stops the run.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use zi_augment::{ZiAugmentConfig, ZiAugmentPipeline, ZiIdentityAugmenter, ZiResultSink};
//!
//! # async fn demo() -> zi_augment::Result<()> {
//! let config = ZiAugmentConfig::new().max_passes(3).max_workers(2);
//! let pipeline = ZiAugmentPipeline::new(config, Arc::new(ZiIdentityAugmenter))?;
//! let sink = ZiResultSink::open_append("out/data.jsonl")?;
//! let stats = pipeline.run_path("data.jsonl", &sink).await?;
//! println!("{} variants written", stats.tasks_succeeded);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::augment::{ZiAugmenter, ZiAugmenterRegistry};
use crate::codec::ZiRecordCodec;
use crate::config::ZiAugmentConfig;
use crate::errors::{Result, ZiError};
use crate::pool::ZiWorkerPool;
use crate::scheduler::{ZiPassPlan, ZiRound};
use crate::sink::ZiResultSink;
use crate::task::ZiTaskOutcome;

pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Reported after every round.
#[derive(Clone, Debug)]
pub struct ProgressInfo {
    pub line: usize,
    /// 1-based round number.
    pub round: usize,
    pub rounds: usize,
    /// 1-based pass numbers covered by the round, inclusive.
    pub first_pass: usize,
    pub last_pass: usize,
    pub workers: usize,
    pub lines_written: usize,
}

/// Counters for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ZiRunStats {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub records_decoded: usize,
    pub decode_failures: usize,
    pub tasks_issued: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    pub lines_written: usize,
}

pub struct ZiAugmentPipeline {
    config: Arc<ZiAugmentConfig>,
    plan: ZiPassPlan,
    codec: Arc<ZiRecordCodec>,
    pool: ZiWorkerPool,
    progress: Option<ProgressCallback>,
}

impl ZiAugmentPipeline {
    /// Validates `config` and creates the worker pool used for the whole run.
    pub fn new(config: ZiAugmentConfig, augmenter: Arc<dyn ZiAugmenter>) -> Result<Self> {
        let config = config.validated()?;
        let plan = ZiPassPlan::new(config.max_passes, config.max_workers)?;
        let codec = Arc::new(ZiRecordCodec::new(config.fields.clone()));
        let pool = ZiWorkerPool::new(
            plan.concurrency(),
            augmenter,
            Arc::clone(&codec),
            config.task_timeout,
        )?;
        Ok(Self {
            config: Arc::new(config),
            plan,
            codec,
            pool,
            progress: None,
        })
    }

    /// Builds the augmenter named in `config` from `registry`.
    pub fn from_registry(config: ZiAugmentConfig, registry: &ZiAugmenterRegistry) -> Result<Self> {
        let augmenter = registry.build(&config.augmenter)?;
        Self::new(config, augmenter)
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &ZiAugmentConfig {
        &self.config
    }

    pub fn plan(&self) -> ZiPassPlan {
        self.plan
    }

    /// Streams the file at `input` through the pipeline.
    pub async fn run_path<W: Write + Send>(
        &self,
        input: impl AsRef<Path>,
        sink: &ZiResultSink<W>,
    ) -> Result<ZiRunStats> {
        let input = input.as_ref();
        let file = tokio::fs::File::open(input)
            .await
            .map_err(|err| ZiError::Io(format!("cannot open input {}: {err}", input.display())))?;
        self.run_reader(BufReader::new(file), sink).await
    }

    /// Streams any buffered reader through the pipeline. Lines are numbered
    /// from 1, blank lines included.
    pub async fn run_reader<R, W>(&self, mut reader: R, sink: &ZiResultSink<W>) -> Result<ZiRunStats>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        let started = Instant::now();
        let mut stats = ZiRunStats::default();
        log::info!(
            "augment.run.start: starting augmentation - augmenter={}, fields={}, passes={}, workers={}, rounds_per_line={}",
            self.pool.augmenter().name(),
            self.config.fields,
            self.plan.passes(),
            self.plan.concurrency(),
            self.plan.round_count()
        );

        let mut buffer = Vec::new();
        let mut line_number = 0;
        loop {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer).await.map_err(|err| {
                ZiError::Io(format!("read failed after line {line_number}: {err}"))
            })?;
            if read == 0 {
                break;
            }
            line_number += 1;
            stats.lines_read += 1;

            let content = _trim_line_ending(&buffer);
            match std::str::from_utf8(content) {
                Ok(text) => self.process_line(line_number, text, sink, &mut stats).await?,
                Err(err) => {
                    stats.decode_failures += 1;
                    log::error!(
                        "augment.decode.failed: invalid UTF-8 ({}) - line={}",
                        err,
                        line_number
                    );
                }
            }
        }

        log::info!(
            "augment.run.complete: augmentation finished - lines={}, records={}, decode_failures={}, written={}, failed_passes={}, elapsed_ms={}",
            stats.lines_read,
            stats.records_decoded,
            stats.decode_failures,
            stats.lines_written,
            stats.tasks_failed,
            started.elapsed().as_millis()
        );
        Ok(stats)
    }

    /// Decodes one line and runs all of its passes. Returns an error only
    /// when the run must stop.
    pub async fn process_line<W: Write + Send>(
        &self,
        line_number: usize,
        text: &str,
        sink: &ZiResultSink<W>,
        stats: &mut ZiRunStats,
    ) -> Result<()> {
        if text.trim().is_empty() {
            stats.blank_lines += 1;
            return Ok(());
        }

        let decoded = match self.codec.decode(text, line_number) {
            Ok(decoded) => decoded,
            Err(err) => {
                stats.decode_failures += 1;
                log::error!("augment.decode.failed: {} - line={}", err, line_number);
                return Ok(());
            }
        };
        stats.records_decoded += 1;

        log::info!(
            "augment.line.start: augmenting record - line={}, fields={}",
            line_number,
            decoded.fields.join("|")
        );

        let record = Arc::new(decoded.record);
        let fields: Arc<[String]> = decoded.fields.into();
        let rounds = self.plan.round_count();

        for round in self.plan.rounds() {
            log::log!(
                _round_level(rounds),
                "augment.round.start: dispatching passes - line={}, round={}/{}, passes={}..{}, workers={}",
                line_number,
                round.index + 1,
                rounds,
                round.passes.start + 1,
                round.passes.end,
                round.len()
            );

            let tasks = round.tasks(&record, &fields);
            stats.tasks_issued += tasks.len();
            for outcome in self.pool.run_round(tasks).await? {
                match outcome {
                    ZiTaskOutcome::Augmented { encoded, .. } => {
                        sink.append_line(&encoded)?;
                        stats.tasks_succeeded += 1;
                        stats.lines_written += 1;
                    }
                    ZiTaskOutcome::Failed(failure) => {
                        stats.tasks_failed += 1;
                        log::warn!(
                            "augment.task.failed: {} - line={}, pass={}",
                            failure.error,
                            failure.line,
                            failure.pass + 1
                        );
                    }
                }
            }

            self.report_progress(line_number, &round, rounds, sink.lines_written());
        }
        Ok(())
    }

    fn report_progress(&self, line: usize, round: &ZiRound, rounds: usize, lines_written: usize) {
        if let Some(ref callback) = self.progress {
            callback(ProgressInfo {
                line,
                round: round.index + 1,
                rounds,
                first_pass: round.passes.start + 1,
                last_pass: round.passes.end,
                workers: round.len(),
                lines_written,
            });
        }
    }
}

/// Rounds are progress worth seeing by default only when a line needs more
/// than one of them.
fn _round_level(rounds: usize) -> log::Level {
    if rounds > 1 {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

fn _trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
