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

use std::fs;
use std::time::Duration;

use serde_json::json;
use tempfile::tempdir;

use zi_augment::errors::ZiError;
use zi_augment::log::ZiLogConfigBuilder;
use zi_augment::{host_parallelism, ZiAugmentConfig, ZiAugmentConfigBuilder, ZiFieldSelector};

#[test]
fn json_file_with_log_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("augment.json");
    fs::write(
        &path,
        json!({
            "fields": ["prompt", "completion"],
            "max_passes": 5,
            "max_workers": 1,
            "augmenter": {"name": "augment.synonym", "config": {"aug_p": 0.4, "seed": 9}},
            "log": {"default_level": "debug", "json_format": true}
        })
        .to_string(),
    )
    .unwrap();

    let layer = ZiAugmentConfigBuilder::from_path(&path).unwrap();
    let config = layer.build().unwrap();
    assert_eq!(
        config.fields,
        ZiFieldSelector::Explicit(vec!["prompt".into(), "completion".into()])
    );
    assert_eq!(config.max_passes, 5);
    assert_eq!(config.max_workers, 1);
    assert_eq!(config.augmenter.config, json!({"aug_p": 0.4, "seed": 9}));
    assert_eq!(config.task_timeout, None);

    let log = layer.log.unwrap().build();
    assert_eq!(log.default_level, "debug");
    assert!(log.json_format);
    assert!(log.console_enabled);
    assert!(!log.file_enabled);
}

#[test]
fn command_line_layer_wins_over_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("augment.yml");
    fs::write(
        &path,
        "max_passes: 8\nfields: [title]\nlog:\n  default_level: warn\n",
    )
    .unwrap();

    let flags = ZiAugmentConfigBuilder {
        max_passes: Some(2),
        task_timeout_ms: Some(1500),
        log: Some(ZiLogConfigBuilder {
            file_path: Some("run.log".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let layered = ZiAugmentConfigBuilder::from_path(&path).unwrap().overlay(flags);
    let config = layered.build().unwrap();
    assert_eq!(config.max_passes, 2);
    assert_eq!(config.fields, ZiFieldSelector::Explicit(vec!["title".into()]));
    assert_eq!(config.task_timeout, Some(Duration::from_millis(1500)));

    let log = layered.log.unwrap().build();
    assert_eq!(log.default_level, "warn");
    assert!(log.file_enabled);
    assert_eq!(log.file_path.as_deref(), Some("run.log"));
}

#[test]
fn augmenter_parameters_apply_to_the_file_augmenter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("augment.yaml");
    fs::write(&path, "augmenter:\n  name: augment.noise\n  config:\n    intensity: 0.2\n").unwrap();

    let config = ZiAugmentConfigBuilder::from_path(&path)
        .unwrap()
        .augmenter_config(json!({"intensity": 0.7, "seed": 1}))
        .build()
        .unwrap();
    assert_eq!(config.augmenter.name, "augment.noise");
    assert_eq!(config.augmenter.config, json!({"intensity": 0.7, "seed": 1}));

    let fallback = ZiAugmentConfigBuilder::default()
        .augmenter_config(json!({"aug_p": 0.5}))
        .build()
        .unwrap();
    assert_eq!(fallback.augmenter.name, "augment.synonym");
    assert_eq!(fallback.augmenter.config, json!({"aug_p": 0.5}));
}

#[test]
fn malformed_files_are_configuration_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "max_passes: [unterminated\n").unwrap();
    assert!(matches!(
        ZiAugmentConfigBuilder::from_path(&path).unwrap_err(),
        ZiError::Config { .. }
    ));

    let missing = dir.path().join("absent.json");
    assert!(matches!(
        ZiAugmentConfigBuilder::from_path(&missing).unwrap_err(),
        ZiError::Config { .. }
    ));
}

#[test]
fn invalid_values_are_rejected() {
    let cases = [
        ZiAugmentConfigBuilder {
            max_passes: Some(0),
            ..Default::default()
        },
        ZiAugmentConfigBuilder {
            max_workers: Some(0),
            ..Default::default()
        },
        ZiAugmentConfigBuilder {
            fields: Some(vec![" ".into(), "".into()]),
            ..Default::default()
        },
        ZiAugmentConfigBuilder {
            task_timeout_ms: Some(0),
            ..Default::default()
        },
    ];
    for layer in cases {
        let err = layer.build().unwrap_err();
        assert!(matches!(err, ZiError::Config { .. }), "{layer:?} gave {err:?}");
    }
}

#[test]
fn worker_ceiling_follows_the_host() {
    let config = ZiAugmentConfig::new().max_workers(usize::MAX).validated().unwrap();
    assert_eq!(config.max_workers, host_parallelism());
}
