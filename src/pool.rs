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

//! # Worker Pool
//!
//! A bounded pool created once per run. Each task holds one semaphore permit
//! while it runs, so no more than `capacity` tasks are ever in flight.
//! [`ZiWorkerPool::run_round`] returns only after every task of the round
//! has finished, which is the barrier between rounds.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::augment::ZiAugmenter;
use crate::codec::ZiRecordCodec;
use crate::errors::{Result, ZiError};
use crate::task::{ZiTask, ZiTaskFailure, ZiTaskOutcome};

pub struct ZiWorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    augmenter: Arc<dyn ZiAugmenter>,
    codec: Arc<ZiRecordCodec>,
    timeout: Option<Duration>,
}

impl ZiWorkerPool {
    pub fn new(
        capacity: usize,
        augmenter: Arc<dyn ZiAugmenter>,
        codec: Arc<ZiRecordCodec>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(ZiError::config("worker pool capacity must be at least 1"));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            augmenter,
            codec,
            timeout,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn augmenter(&self) -> &Arc<dyn ZiAugmenter> {
        &self.augmenter
    }

    /// Runs one round and waits for all of it. Outcomes come back in
    /// submission order. A task that panics is reported as a failure of its
    /// own pass; siblings are unaffected.
    pub async fn run_round(&self, tasks: Vec<ZiTask>) -> Result<Vec<ZiTaskOutcome>> {
        if tasks.len() > self.capacity {
            return Err(ZiError::internal(format!(
                "round of {} tasks exceeds pool capacity {}",
                tasks.len(),
                self.capacity
            )));
        }

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let permit = Arc::clone(&self.permits)
                .acquire_owned()
                .await
                .map_err(|err| ZiError::internal(format!("worker pool closed: {err}")))?;
            let line = task.line();
            let pass = task.pass;
            let augmenter = Arc::clone(&self.augmenter);
            let codec = Arc::clone(&self.codec);
            let timeout = self.timeout;
            let handle = tokio::spawn(async move {
                let outcome = task.execute(augmenter, &codec, timeout).await;
                drop(permit);
                outcome
            });
            handles.push((line, pass, handle));
        }

        let outcomes = join_all(handles.into_iter().map(|(line, pass, handle)| async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => ZiTaskOutcome::Failed(ZiTaskFailure {
                    line,
                    pass,
                    error: ZiError::augmentation(
                        line,
                        pass + 1,
                        "*",
                        if err.is_panic() {
                            "worker panicked".to_string()
                        } else {
                            format!("worker cancelled: {err}")
                        },
                    ),
                }),
            }
        }))
        .await;

        Ok(outcomes)
    }
}
