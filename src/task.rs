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

//! # Task Module
//!
//! A [`ZiTask`] is one pass over one record: every selected field is sent
//! through the augmenter and the results are folded into a new record.
//!
//! ## Atomicity
//!
//! A task succeeds only if every field succeeds. The first field failure
//! fails the whole task and nothing is emitted for that pass; the source
//! record is never written out as a substitute.
//!
//! ## Field Fan-out
//!
//! Fields of one task are augmented concurrently with
//! [`futures::future::try_join_all`]. Completion order does not matter: each
//! output is written back under its own field name.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;

use crate::augment::ZiAugmenter;
use crate::codec::ZiRecordCodec;
use crate::errors::{Result, ZiError};
use crate::record::ZiRecord;

/// One (record, fields, pass) unit of work.
#[derive(Clone, Debug)]
pub struct ZiTask {
    /// Source record, shared read-only with sibling passes.
    pub record: Arc<ZiRecord>,
    /// Fields to rewrite, resolved at decode time.
    pub fields: Arc<[String]>,
    /// 0-based pass index within the record.
    pub pass: usize,
}

impl ZiTask {
    #[allow(non_snake_case)]
    pub fn new(record: Arc<ZiRecord>, fields: Arc<[String]>, pass: usize) -> Self {
        Self {
            record,
            fields,
            pass,
        }
    }

    /// Source line of the record.
    pub fn line(&self) -> usize {
        self.record.line
    }

    /// 1-based pass number, as shown in logs and errors.
    pub fn pass_number(&self) -> usize {
        self.pass + 1
    }

    /// Augments every selected field and builds the resulting record.
    pub async fn augment(&self, augmenter: &dyn ZiAugmenter) -> Result<ZiRecord> {
        let line = self.line();
        let pass = self.pass_number();

        let pending = self.fields.iter().map(|name| async move {
            let text = self.record.get_str(name).ok_or_else(|| {
                ZiError::augmentation(line, pass, name.as_str(), "field is not a string")
            })?;
            let augmented = augmenter.augment(&text).await.map_err(|err| {
                ZiError::augmentation(line, pass, name.as_str(), err.to_string())
            })?;
            Ok::<_, ZiError>((name.clone(), augmented))
        });

        let replacements = try_join_all(pending).await?;
        self.record
            .with_fields(replacements)
            .map_err(|err| ZiError::augmentation(line, pass, "*", err.to_string()))
    }

    /// Runs the task to completion and classifies the result. Never fails:
    /// every error, including an expired deadline, becomes
    /// [`ZiTaskOutcome::Failed`].
    pub async fn execute(
        self,
        augmenter: Arc<dyn ZiAugmenter>,
        codec: &ZiRecordCodec,
        timeout: Option<Duration>,
    ) -> ZiTaskOutcome {
        let attempt = async {
            let record = self.augment(augmenter.as_ref()).await?;
            codec.encode(&record).map_err(|err| {
                ZiError::augmentation(self.line(), self.pass_number(), "*", err.to_string())
            })
        };

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(ZiError::augmentation(
                    self.line(),
                    self.pass_number(),
                    "*",
                    format!("timed out after {} ms", limit.as_millis()),
                )),
            },
            None => attempt.await,
        };

        match result {
            Ok(encoded) => ZiTaskOutcome::Augmented {
                pass: self.pass,
                encoded,
            },
            Err(error) => ZiTaskOutcome::Failed(ZiTaskFailure {
                line: self.line(),
                pass: self.pass,
                error,
            }),
        }
    }
}

/// Why one pass produced no output.
#[derive(Debug)]
pub struct ZiTaskFailure {
    pub line: usize,
    /// 0-based pass index.
    pub pass: usize,
    pub error: ZiError,
}

impl fmt::Display for ZiTaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} pass {}: {}", self.line, self.pass + 1, self.error)
    }
}

/// Result of one task: an augmented line ready to append, or a failure.
#[derive(Debug)]
pub enum ZiTaskOutcome {
    Augmented {
        /// 0-based pass index.
        pass: usize,
        /// The augmented record encoded as one line, without the newline.
        encoded: String,
    },
    Failed(ZiTaskFailure),
}

impl ZiTaskOutcome {
    pub fn pass(&self) -> usize {
        match self {
            ZiTaskOutcome::Augmented { pass, .. } => *pass,
            ZiTaskOutcome::Failed(failure) => failure.pass,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ZiTaskOutcome::Augmented { .. })
    }
}
