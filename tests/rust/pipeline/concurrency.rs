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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use zi_augment::errors::{Result, ZiError};
use zi_augment::{ZiAugmentConfig, ZiAugmentPipeline, ZiAugmenter, ZiFieldSelector, ZiResultSink};

/// Records overlap and, for every call, how many calls had finished when it
/// started.
#[derive(Debug, Default)]
struct ZiTProbe {
    active: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
    finished: AtomicUsize,
    starts: Mutex<Vec<(usize, usize)>>,
}

#[async_trait]
impl ZiAugmenter for ZiTProbe {
    fn name(&self) -> &'static str {
        "test.probe"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        let index = self.started.fetch_add(1, Ordering::SeqCst);
        let finished = self.finished.load(Ordering::SeqCst);
        self.starts.lock().unwrap().push((index, finished));

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10 + (index % 3) as u64 * 5)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{text}#"))
    }
}

/// Fails any text containing "bad", after a delay so sibling fields are
/// already done.
#[derive(Debug)]
struct ZiTRejectBad;

#[async_trait]
impl ZiAugmenter for ZiTRejectBad {
    fn name(&self) -> &'static str {
        "test.reject_bad"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        if text.contains("bad") {
            tokio::time::sleep(Duration::from_millis(20)).await;
            return Err(ZiError::internal("rejected"));
        }
        Ok(text.to_uppercase())
    }
}

fn instruction_only(passes: usize, workers: usize) -> ZiAugmentConfig {
    ZiAugmentConfig::new()
        .fields(ZiFieldSelector::explicit(["instruction"]).unwrap())
        .max_passes(passes)
        .max_workers(workers)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_tasks_never_exceed_the_worker_count() {
    let probe = Arc::new(ZiTProbe::default());
    let pipeline = ZiAugmentPipeline::new(instruction_only(7, 3), probe.clone()).unwrap();
    let concurrency = pipeline.plan().concurrency();
    let sink = ZiResultSink::new(Vec::new());

    let input = "{\"instruction\":\"a\"}\n{\"instruction\":\"b\"}\n";
    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();

    assert_eq!(stats.tasks_succeeded, 14);
    assert!(probe.peak.load(Ordering::SeqCst) <= concurrency);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn next_round_waits_for_the_previous_one() {
    let probe = Arc::new(ZiTProbe::default());
    let pipeline = ZiAugmentPipeline::new(instruction_only(5, 2), probe.clone()).unwrap();
    let width = pipeline.plan().concurrency();
    let sink = ZiResultSink::new(Vec::new());

    pipeline
        .run_reader("{\"instruction\":\"a\"}".as_bytes(), &sink)
        .await
        .unwrap();

    let starts = probe.starts.lock().unwrap().clone();
    assert_eq!(starts.len(), 5);
    for (index, finished) in starts {
        let round = index / width;
        assert!(
            finished >= round * width,
            "call {index} started with {finished} finished, round {round} needs {}",
            round * width
        );
    }
}

#[tokio::test]
async fn fields_of_one_pass_are_augmented_together() {
    let probe = Arc::new(ZiTProbe::default());
    let config = ZiAugmentConfig::new().max_passes(1).max_workers(1);
    let pipeline = ZiAugmentPipeline::new(config, probe.clone()).unwrap();
    let sink = ZiResultSink::new(Vec::new());

    pipeline
        .run_reader("{\"instruction\":\"a\",\"output\":\"b\"}".as_bytes(), &sink)
        .await
        .unwrap();

    assert_eq!(probe.peak.load(Ordering::SeqCst), 2);
    let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(out, "{\"instruction\":\"a#\",\"output\":\"b#\"}\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_failed_field_discards_the_whole_pass() {
    let pipeline = ZiAugmentPipeline::new(
        ZiAugmentConfig::new().max_passes(3).max_workers(3),
        Arc::new(ZiTRejectBad),
    )
    .unwrap();
    let sink = ZiResultSink::new(Vec::new());

    let input = concat!(
        "{\"instruction\":\"ok\",\"output\":\"bad answer\"}\n",
        "{\"instruction\":\"fine\",\"output\":\"good answer\"}\n"
    );
    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.tasks_failed, 3);
    assert_eq!(stats.tasks_succeeded, 3);

    let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    for line in out.lines() {
        let record: Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["instruction"], "FINE");
        assert_eq!(record["output"], "GOOD ANSWER");
    }
    assert!(!out.contains("OK"));
    assert!(!out.contains("bad answer"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_passes_time_out_without_stopping_the_run() {
    #[derive(Debug)]
    struct ZiTSlowOnce(AtomicUsize);

    #[async_trait]
    impl ZiAugmenter for ZiTSlowOnce {
        fn name(&self) -> &'static str {
            "test.slow_once"
        }

        async fn augment(&self, text: &str) -> Result<String> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(text.to_string())
        }
    }

    let config = instruction_only(3, 1).task_timeout(Some(Duration::from_millis(100)));
    let pipeline = ZiAugmentPipeline::new(config, Arc::new(ZiTSlowOnce(AtomicUsize::new(0)))).unwrap();
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline
        .run_reader("{\"instruction\":\"a\"}".as_bytes(), &sink)
        .await
        .unwrap();
    assert_eq!(stats.tasks_failed, 1);
    assert_eq!(stats.tasks_succeeded, 2);
    assert_eq!(sink.lines_written(), 2);
}
