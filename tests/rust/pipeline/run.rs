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
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::tempdir;

use zi_augment::errors::{Result, ZiError};
use zi_augment::{
    ZiAugmentConfig, ZiAugmentPipeline, ZiAugmenter, ZiAugmenterRegistry, ZiAugmenterSpec,
    ZiFieldSelector, ZiIdentityAugmenter, ZiPreflight, ZiResultSink,
};

#[derive(Debug)]
struct ZiTUpper;

#[async_trait]
impl ZiAugmenter for ZiTUpper {
    fn name(&self) -> &'static str {
        "test.upper"
    }

    async fn augment(&self, text: &str) -> Result<String> {
        Ok(text.to_uppercase())
    }
}

#[derive(Debug)]
struct ZiTAlwaysFail;

#[async_trait]
impl ZiAugmenter for ZiTAlwaysFail {
    fn name(&self) -> &'static str {
        "test.fail"
    }

    async fn augment(&self, _text: &str) -> Result<String> {
        Err(ZiError::internal("model unavailable"))
    }
}

fn pipeline(passes: usize, workers: usize, augmenter: Arc<dyn ZiAugmenter>) -> ZiAugmentPipeline {
    let config = ZiAugmentConfig::new().max_passes(passes).max_workers(workers);
    ZiAugmentPipeline::new(config, augmenter).unwrap()
}

fn output_lines(sink: ZiResultSink<Vec<u8>>) -> Vec<String> {
    let bytes = sink.into_inner().unwrap();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn each_record_yields_one_line_per_pass() {
    let input = concat!(
        r#"{"instruction":"a","output":"b"}"#,
        "\n",
        r#"{"instruction":"c","response":"d"}"#,
        "\n"
    );
    let pipeline = pipeline(3, 2, Arc::new(ZiIdentityAugmenter));
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.records_decoded, 2);
    assert_eq!(stats.tasks_issued, 6);
    assert_eq!(stats.tasks_succeeded, 6);

    let lines = output_lines(sink);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[..3], [r#"{"instruction":"a","output":"b"}"#; 3]);
    assert_eq!(lines[3..], [r#"{"instruction":"c","response":"d"}"#; 3]);
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let input = concat!(
        r#"{"instruction":"a","output":"b"}"#,
        "\n",
        "{not json\n",
        "[1,2,3]\n",
        r#"{"output":"missing instruction"}"#,
        "\n",
        r#"{"instruction":"c","output":"d"}"#,
        "\n"
    );
    let pipeline = pipeline(2, 2, Arc::new(ZiIdentityAugmenter));
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.lines_read, 5);
    assert_eq!(stats.decode_failures, 3);
    assert_eq!(stats.records_decoded, 2);
    assert_eq!(output_lines(sink).len(), 4);
}

#[tokio::test]
async fn failing_augmenter_writes_nothing_and_still_completes() {
    let input = concat!(
        r#"{"instruction":"a","output":"b"}"#,
        "\n",
        r#"{"instruction":"c","output":"d"}"#,
        "\n"
    );
    let pipeline = pipeline(4, 2, Arc::new(ZiTAlwaysFail));
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.tasks_issued, 8);
    assert_eq!(stats.tasks_failed, 8);
    assert_eq!(stats.tasks_succeeded, 0);
    assert!(output_lines(sink).is_empty());
}

#[tokio::test]
async fn untouched_fields_keep_their_bytes_and_order() {
    let input = r#"{"id":7,"instruction":"say hi","meta":{"z":1,"a":[1.5,"x",null]},"output":"hello there","tags":["k"]}"#;
    let pipeline = pipeline(1, 1, Arc::new(ZiTUpper));
    let sink = ZiResultSink::new(Vec::new());

    pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(
        output_lines(sink),
        vec![
            r#"{"id":7,"instruction":"SAY HI","meta":{"z":1,"a":[1.5,"x",null]},"output":"HELLO THERE","tags":["k"]}"#
        ]
    );
}

#[tokio::test]
async fn spaced_input_keeps_untouched_values_verbatim() {
    let input = concat!(
        r#"{"instruction": "a", "output": "b"}"#,
        "\n",
        r#"{"instruction": "say", "output": "it", "note": "caf\u00e9 \/x", "meta": {"k": [1, 2], "n": 1e5}}"#,
        "\n"
    );
    let pipeline = pipeline(2, 2, Arc::new(ZiTUpper));
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.lines_written, 4);

    let lines = output_lines(sink);
    assert_eq!(lines[..2], [r#"{"instruction":"A","output":"B"}"#; 2]);
    assert_eq!(
        lines[2..],
        [r#"{"instruction":"SAY","output":"IT","note":"caf\u00e9 \/x","meta":{"k": [1, 2], "n": 1e5}}"#; 2]
    );
}

#[tokio::test]
async fn escaped_fields_are_augmented_as_decoded_text() {
    let input = r#"{"instruction": "caf\u00e9", "output": "a\tb"}"#;
    let pipeline = pipeline(1, 1, Arc::new(ZiTUpper));
    let sink = ZiResultSink::new(Vec::new());

    pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(output_lines(sink), vec![r#"{"instruction":"CAFÉ","output":"A\tB"}"#]);
}

#[tokio::test]
async fn response_wins_over_output_when_both_exist() {
    let input = r#"{"instruction":"q","response":"r","output":"o"}"#;
    let pipeline = pipeline(1, 1, Arc::new(ZiTUpper));
    let sink = ZiResultSink::new(Vec::new());

    pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    let lines = output_lines(sink);
    let record: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record, json!({"instruction": "Q", "response": "R", "output": "o"}));
}

#[tokio::test]
async fn explicit_fields_replace_the_default_pair() {
    let input = concat!(
        r#"{"title":"t","body":"b","instruction":"i"}"#,
        "\n",
        r#"{"body":"only body"}"#,
        "\n",
        r#"{"instruction":"neither"}"#,
        "\n"
    );
    let config = ZiAugmentConfig::new()
        .fields(ZiFieldSelector::explicit(["title", "body"]).unwrap())
        .max_passes(1)
        .max_workers(1);
    let pipeline = ZiAugmentPipeline::new(config, Arc::new(ZiTUpper)).unwrap();
    let sink = ZiResultSink::new(Vec::new());

    let stats = pipeline.run_reader(input.as_bytes(), &sink).await.unwrap();
    assert_eq!(stats.decode_failures, 1);
    assert_eq!(
        output_lines(sink),
        vec![
            r#"{"title":"T","body":"B","instruction":"i"}"#.to_string(),
            r#"{"body":"ONLY BODY"}"#.to_string(),
        ]
    );
}

#[tokio::test]
async fn registry_augmenter_runs_against_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("train.jsonl");
    fs::write(
        &input,
        concat!(
            r#"{"instruction":"Write a quick answer","output":"It is a big help"}"#,
            "\n",
            r#"{"instruction":"Describe the problem","output":"A small example"}"#,
            "\n"
        ),
    )
    .unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let destination = ZiPreflight::new(&input, &out)
        .include_original(true)
        .prepare()
        .unwrap();
    let config = ZiAugmentConfig::new()
        .max_passes(3)
        .max_workers(2)
        .augmenter(ZiAugmenterSpec::new("augment.synonym", json!({"aug_p": 1.0, "seed": 11})));
    let pipeline =
        ZiAugmentPipeline::from_registry(config, &ZiAugmenterRegistry::with_defaults()).unwrap();
    let sink = ZiResultSink::open_append(&destination.path).unwrap();

    let stats = pipeline.run_path(&destination.input, &sink).await.unwrap();
    drop(sink);

    assert_eq!(stats.tasks_succeeded, 6);
    let content = fs::read_to_string(&destination.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2 + 6);
    assert_eq!(content.lines().take(2).collect::<Vec<_>>().join("\n"), fs::read_to_string(&input).unwrap().trim_end());

    for line in &lines[2..] {
        let record: Value = serde_json::from_str(line).unwrap();
        let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["instruction", "output"]);
        assert_ne!(record["instruction"], json!("Write a quick answer"));
        assert_ne!(record["instruction"], json!("Describe the problem"));
    }
}
