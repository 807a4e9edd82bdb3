#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use bytes::BytesMut;
use radariq::frame::{encode_frame, DEFAULT_MAX_PAYLOAD};
use serde_json::Value;

fn unique_temp_file(tag: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "radariq-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let path = dir.join("capture.bin");
    std::fs::write(&path, contents).expect("capture file should be writable");
    path
}

fn wire(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_frame(payload, DEFAULT_MAX_PAYLOAD, &mut buf).expect("payload should encode");
    buf.to_vec()
}

fn radariq(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_radariq"))
        .args(args)
        .output()
        .expect("radariq should run")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

fn recording() -> Vec<u8> {
    let mut bytes = vec![0x13, 0x37, 0xB1];
    bytes.extend(wire(b"\x00\x01\x02\x00radar ready\x00"));
    // One point: x=16 y=-16 z=1000 intensity=200 velocity=-500.
    bytes.extend(wire(&[
        0x66, 0x01, 0x02, 0x01, 0x10, 0x00, 0xF0, 0xFF, 0xE8, 0x03, 0xC8, 0x0C, 0xFE,
    ]));
    bytes.extend(wire(&[0x71, 0x01, 0x00]));
    bytes
}

#[test]
fn decodes_recorded_stream_as_json() {
    let path = unique_temp_file("json", &recording());
    let output = radariq(&["--format", "json", "decode", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);

    assert_eq!(lines[0]["index"], 0);
    assert_eq!(lines[0]["type"], "message");
    assert_eq!(lines[0]["message"]["text"], "radar ready");
    assert_eq!(lines[0]["message"]["kind"], "info");

    assert_eq!(lines[1]["type"], "frame");
    assert_eq!(lines[1]["data"]["kind"], "point_cloud");
    assert_eq!(lines[1]["data"]["complete"], true);
    assert_eq!(lines[1]["data"]["items"][0]["z"], 1000);
    assert_eq!(lines[1]["data"]["items"][0]["velocity"], -500);

    assert_eq!(lines[2]["type"], "power");
    assert_eq!(lines[2]["good"], true);
}

#[test]
fn corrupt_frame_is_reported_and_decoding_continues() {
    let mut bytes = wire(&[0x04, 0x01, 0x05]);
    // CRC of [04 01 02] on a [04 01 03] payload.
    bytes.extend([0xB0, 0x04, 0x01, 0x03, 0x03, 0x2F, 0xB1]);
    bytes.extend(wire(&[0x42, 0x01]));
    let path = unique_temp_file("corrupt", &bytes);

    let output = radariq(&["--format", "json", "decode", "--payload", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(60));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);

    assert_eq!(lines[0]["type"], "reply");
    assert_eq!(lines[0]["command"], "frame_rate");
    assert_eq!(lines[0]["payload"], "04 01 05");

    assert_eq!(lines[1]["type"], "rejected");
    assert!(lines[1]["reason"].as_str().unwrap().contains("CRC"));

    assert_eq!(lines[2]["type"], "unknown");
    assert_eq!(lines[2]["code"], 0x42);
}

#[test]
fn raw_format_prints_one_line_per_packet() {
    let path = unique_temp_file("raw", &recording());
    let output = radariq(&["--format", "raw", "decode", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "0 message Radar message - INFO (2/0): radar ready",
            "1 point_cloud 1 items",
            "2 power power good",
        ]
    );
}

#[test]
fn missing_file_is_a_usage_error() {
    let output = radariq(&["decode", "/nonexistent/radariq/capture.bin"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open"));
}

#[test]
fn version_reports_package_version() {
    let output = radariq(&["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("radariq {}", env!("CARGO_PKG_VERSION"))
    );
}
