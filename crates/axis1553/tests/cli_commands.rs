#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use axis1553::word::{StreamWord, StreamWordReader, StreamWordWriter, SyncKind, Tag};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "axis1553-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn axis1553(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_axis1553"))
        .env_remove("AXIS1553_CONFIG")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("axis1553 should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn encode_prints_command_trace() {
    let output = axis1553(&["--format", "json", "encode", "0"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    let trace = lines[0]["trace"].as_str().expect("trace should be a string");
    assert_eq!(trace.len(), 40);
    assert!(trace.starts_with("+++---"));
    assert!(trace.ends_with("+-"), "zero word carries parity 1");
    assert_eq!(lines[0]["sync"], "command");
    assert_eq!(lines[0]["parity"], 1);
}

#[test]
fn decode_reads_back_encoded_trace() {
    let encoded = axis1553(&["--format", "raw", "encode", "0xBEEF", "--sync", "data"]);
    assert!(encoded.status.success());
    let trace = String::from_utf8_lossy(&encoded.stdout).trim().to_string();
    assert!(trace.starts_with("---+++"));

    let decoded = axis1553(&["--format", "json", "decode", "--", &trace]);
    assert!(
        decoded.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&decoded.stderr)
    );
    let lines = json_lines(&decoded);
    assert_eq!(lines[0]["data"], "0xBEEF");
    assert_eq!(lines[0]["sync"], "data");
}

#[test]
fn decode_rejects_bad_parity_as_invalid_data() {
    let encoded = axis1553(&["--format", "raw", "encode", "1"]);
    let mut trace = String::from_utf8_lossy(&encoded.stdout).trim().to_string();
    let flipped = if trace.ends_with("+-") { "-+" } else { "+-" };
    trace.replace_range(38.., flipped);

    let output = axis1553(&["decode", &trace]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("parity"));
}

#[test]
fn decode_rejects_unknown_symbols() {
    let output = axis1553(&["decode", "+++---x"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn loopback_round_trips_words_as_json() {
    let output = axis1553(&["--format", "json", "loopback", "--words", "1,0x2,0xFFFF"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let lines = json_lines(&output);
    let data: Vec<&str> = lines.iter().filter_map(|l| l["data"].as_str()).collect();
    assert_eq!(data, vec!["0x0001", "0x0002", "0xFFFF"]);
    assert!(lines.iter().all(|l| l["sync"] == "command"));
    assert_eq!(lines[0]["gap"], false);
    assert_eq!(lines[1]["gap"], true);
}

#[test]
fn loopback_raw_output_is_stream_words() {
    let output = axis1553(&["--format", "raw", "loopback", "--words", "7,8", "--sync", "data"]);
    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 6);

    let words = StreamWordReader::new(output.stdout.as_slice())
        .read_all()
        .expect("stdout should hold whole stream words");
    assert_eq!(words[0].data, 7);
    assert_eq!(words[1].tag.sync, SyncKind::Data);
}

#[test]
fn loopback_reads_stream_word_file() {
    let dir = unique_temp_dir("loopback-file");
    let path = dir.join("words.bin");
    let mut writer = StreamWordWriter::new(Vec::new());
    writer
        .write_word(&StreamWord::new(0x1234, Tag::command()))
        .expect("write should succeed");
    writer
        .write_word(&StreamWord::new(0x5678, Tag::from_bits(0xA).expect("valid tag")))
        .expect("write should succeed");
    std::fs::write(&path, writer.into_inner()).expect("word file should be writable");

    let path_arg = path.to_string_lossy().to_string();
    let output = axis1553(&["--format", "json", "loopback", "--file", &path_arg, "--stats"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["data"], "0x1234");
    assert_eq!(lines[1]["data"], "0x5678");
    assert_eq!(lines[1]["sync"], "data");
    assert_eq!(lines[2]["tx_words"], 2);
    assert_eq!(lines[2]["rx_words"], 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn loopback_without_words_is_usage_error() {
    let output = axis1553(&["loopback"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn loopback_tick_budget_exhaustion_is_timeout() {
    let output = axis1553(&["loopback", "--words", "1,2", "--max-ticks", "10"]);
    assert_eq!(output.status.code(), Some(124));
}

#[test]
fn invalid_config_file_is_usage_error() {
    let dir = unique_temp_dir("config");
    let path = dir.join("core.json");
    std::fs::write(&path, r#"{"clock_hz": 3000000}"#).expect("config should be writable");

    let path_arg = path.to_string_lossy().to_string();
    let output = axis1553(&["--config", &path_arg, "loopback", "--words", "1"]);
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn config_from_environment_is_applied() {
    let dir = unique_temp_dir("config-env");
    let path = dir.join("core.json");
    std::fs::write(&path, r#"{"clock_hz": 40000000}"#).expect("config should be writable");

    let output = Command::new(env!("CARGO_BIN_EXE_axis1553"))
        .env("AXIS1553_CONFIG", &path)
        .args(["--log-level", "error", "--format", "json", "loopback", "--words", "3"])
        .output()
        .expect("axis1553 should run");
    assert!(output.status.success());

    // delivery trails the tx_active rise by at least one 20 us word
    let lines = json_lines(&output);
    let delivered = lines[0]["delivered_ns"].as_u64().expect("delivered_ns");
    let started = lines[0]["tx_start_ns"].as_u64().expect("tx_start_ns");
    assert!(delivered - started >= 20_000);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn receive_flags_gap_between_words() {
    let output = axis1553(&[
        "--format", "json", "receive", "--words", "1,2", "--sync", "data", "--gap-us", "5",
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["gap"], false);
    assert_eq!(lines[1]["gap"], true);
    assert_eq!(lines[1]["tuser"], "01010");
}

#[test]
fn receive_rejects_oversized_gap() {
    let output = axis1553(&["receive", "--words", "1,2", "--gap-us", "18446744073709551615"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn invalid_config_duration_is_usage_error() {
    let dir = unique_temp_dir("config-range");
    let path = dir.join("core.json");
    std::fs::write(
        &path,
        r#"{"clock_hz": 100000000, "reset_settle_ns": 200000000000}"#,
    )
    .expect("config should be writable");

    let path_arg = path.to_string_lossy().to_string();
    let output = axis1553(&["--config", &path_arg, "receive", "--words", "1"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("reset_settle_ns"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn receive_back_to_back_words_have_no_gap_flag() {
    let output = axis1553(&["--format", "json", "receive", "--words", "1,2,3"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l["gap"] == false));
}

#[test]
fn version_prints_package_version() {
    let output = axis1553(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("axis1553 {}", env!("CARGO_PKG_VERSION")));
}
