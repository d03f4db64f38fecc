// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tempfile::tempdir;

const NOW: &str = "2025-03-01T09:00:00Z";

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fsrs-scheduler"))
        .args(args)
        .output()
        .expect("failed to run binary")
}

fn run_json(args: &[&str]) -> Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn review_card() -> Value {
    json!({
        "due": "2025-03-01T09:00:00Z",
        "stability": 10.0,
        "difficulty": 5.0,
        "elapsed_days": 8,
        "scheduled_days": 10.0,
        "reps": 5,
        "lapses": 0,
        "state": "Review",
        "last_review": "2025-02-19T09:00:00Z"
    })
}

#[test]
fn test_new_card_then_repeat() {
    let dir = tempdir().unwrap();
    let card = run_json(&["new-card", "--now", NOW]);
    assert_eq!(card["state"], "New");
    let path = write(&dir, "card.json", &card);
    let log = run_json(&["repeat", "--card", s(&path), "--now", NOW]);
    for grade in ["Again", "Hard", "Good"] {
        assert_eq!(log[grade]["card"]["state"], "Learning");
        assert_eq!(log[grade]["log"]["state"], "New");
    }
    assert_eq!(log["Easy"]["card"]["state"], "Review");
    assert_eq!(log["Easy"]["card"]["due"], "2025-03-07T09:00:00.000Z");
}

#[test]
fn test_next_then_rollback() {
    let dir = tempdir().unwrap();
    let card = write(&dir, "card.json", &review_card());
    let item = run_json(&["next", "--card", s(&card), "--grade", "1", "--now", NOW]);
    assert_eq!(item["card"]["state"], "Relearning");
    assert_eq!(item["card"]["lapses"], 1);
    let next_card = write(&dir, "next.json", &item["card"]);
    let log = write(&dir, "log.json", &item["log"]);
    let restored = run_json(&["rollback", "--card", s(&next_card), "--log", s(&log)]);
    assert_eq!(restored["state"], "Review");
    assert_eq!(restored["lapses"], 0);
    assert_eq!(restored["elapsed_days"], 8);
    assert_eq!(restored["due"], "2025-03-01T09:00:00.000Z");
}

#[test]
fn test_forget() {
    let dir = tempdir().unwrap();
    let card = write(&dir, "card.json", &review_card());
    let item = run_json(&["forget", "--card", s(&card), "--now", NOW, "--reset-count"]);
    assert_eq!(item["card"]["state"], "New");
    assert_eq!(item["card"]["reps"], 0);
    assert_eq!(item["log"]["rating"], "Manual");
}

#[test]
fn test_reschedule_keeps_extra_fields() {
    let dir = tempdir().unwrap();
    let mut tagged = review_card();
    tagged["deck"] = json!("geography");
    let cards = write(&dir, "cards.json", &json!([tagged, {"due": NOW, "state": 0, "note": 1}]));
    let config = dir.path().join("params.toml");
    std::fs::write(&config, "request_retention = 0.8\n").unwrap();
    let out = run_json(&["reschedule", "--cards", s(&cards), "--config", s(&config)]);
    let out = out.as_array().unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["deck"], "geography");
    assert_eq!(out[0]["scheduled_days"], 23.0);
    assert_eq!(out[1]["note"], 1);
    assert_eq!(out[1]["state"], "New");
}

#[test]
fn test_retrievability() {
    let dir = tempdir().unwrap();
    let card = write(&dir, "card.json", &review_card());
    let r = run_json(&["retrievability", "--card", s(&card), "--now", NOW]);
    assert_eq!(r, "90.00%");
}

#[test]
fn test_bad_config_fails() {
    let dir = tempdir().unwrap();
    let card = write(&dir, "card.json", &review_card());
    let config = dir.path().join("params.toml");
    std::fs::write(&config, "w = [1.0, 2.0]\n").unwrap();
    let output = run(&["repeat", "--card", s(&card), "--config", s(&config)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid configuration"), "{stderr}");
}

#[test]
fn test_bad_grade_fails() {
    let dir = tempdir().unwrap();
    let card = write(&dir, "card.json", &review_card());
    let output = run(&["next", "--card", s(&card), "--grade", "meh"]);
    assert!(!output.status.success());
}

#[test]
fn test_unknown_state_fails() {
    let dir = tempdir().unwrap();
    let mut card = review_card();
    card["state"] = json!("graduated");
    let cards = write(&dir, "cards.json", &json!([card]));
    let output = run(&["reschedule", "--cards", s(&cards)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid state: unknown state `graduated`"), "{stderr}");
}
