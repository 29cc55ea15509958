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

//! # Pass Scheduler
//!
//! Splits the passes of one record into rounds. With `P` passes and `W`
//! workers the round width is `C = min(W, P)` and there are `ceil(P / C)`
//! rounds. Every round but the last holds `C` passes; the last holds the
//! remainder, so each record is issued exactly `P` tasks.
//!
//! ```text
//! P = 5, W = 2  ->  C = 2  ->  [0, 1] [2, 3] [4]
//! P = 2, W = 8  ->  C = 2  ->  [0, 1]
//! ```

use std::ops::Range;
use std::sync::Arc;

use crate::errors::{Result, ZiError};
use crate::record::ZiRecord;
use crate::task::ZiTask;

/// Round layout for one record, shared by every record in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZiPassPlan {
    passes: usize,
    concurrency: usize,
}

impl ZiPassPlan {
    pub fn new(max_passes: usize, max_workers: usize) -> Result<Self> {
        if max_passes == 0 {
            return Err(ZiError::config("max_passes must be at least 1"));
        }
        if max_workers == 0 {
            return Err(ZiError::config("max_workers must be at least 1"));
        }
        Ok(Self {
            passes: max_passes,
            concurrency: max_workers.min(max_passes),
        })
    }

    /// Total passes per record.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Tasks in flight per round, never above the worker count.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn round_count(&self) -> usize {
        self.passes.div_ceil(self.concurrency)
    }

    pub fn rounds(&self) -> impl Iterator<Item = ZiRound> + '_ {
        (0..self.round_count()).map(move |index| {
            let start = index * self.concurrency;
            let end = (start + self.concurrency).min(self.passes);
            ZiRound {
                index,
                passes: start..end,
            }
        })
    }
}

/// A contiguous block of pass indices run together behind one barrier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZiRound {
    /// 0-based round index.
    pub index: usize,
    /// 0-based pass indices.
    pub passes: Range<usize>,
}

impl ZiRound {
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// One task per pass of this round, all sharing the same source record.
    pub fn tasks(&self, record: &Arc<ZiRecord>, fields: &Arc<[String]>) -> Vec<ZiTask> {
        self.passes
            .clone()
            .map(|pass| ZiTask::new(Arc::clone(record), Arc::clone(fields), pass))
            .collect()
    }
}
