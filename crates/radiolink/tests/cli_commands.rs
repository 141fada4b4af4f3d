#![cfg(all(unix, feature = "cli"))]

use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "radiolink-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn radiolink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_radiolink"))
        .env_remove("RADIOLINK_CONFIG")
        .env_remove("RADIOLINK_PAYLOAD_SIZE")
        .env_remove("RADIOLINK_QUEUE_FRAMES")
        .env_remove("RADIOLINK_CURSOR_BIAS")
        .env_remove("RADIOLINK_LINE_CODING")
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("radiolink should run")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be one JSON object")
}

#[test]
fn encode_then_decode_roundtrips_a_file() {
    let dir = unique_temp_dir("roundtrip");
    let input = dir.join("input.txt");
    let encoded = dir.join("encoded.bin");
    let decoded = dir.join("decoded.txt");
    let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
    std::fs::write(&input, &data).unwrap();

    let output = radiolink(&["encode", arg(&input), arg(&encoded)]);
    assert!(output.status.success());
    let out = json(&output);
    assert_eq!(out["frames"], 24);
    assert_eq!(out["output_bytes"], 24 * 90);

    let output = radiolink(&["decode", arg(&encoded), arg(&decoded), "--strict"]);
    assert!(output.status.success());
    let out = json(&output);
    assert_eq!(out["frames"], 24);
    assert_eq!(out["corrected_bits"], 0);
    assert_eq!(std::fs::read(&decoded).unwrap(), data);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn strict_decode_fails_on_uncorrectable_codewords() {
    let dir = unique_temp_dir("strict");
    let input = dir.join("input.txt");
    let encoded = dir.join("encoded.bin");
    let decoded = dir.join("decoded.txt");
    std::fs::write(&input, b"hello radio").unwrap();

    assert!(radiolink(&["encode", arg(&input), arg(&encoded)])
        .status
        .success());

    // Four flipped bits in the last codeword of the frame.
    let mut bytes = std::fs::read(&encoded).unwrap();
    for byte in &mut bytes[87..89] {
        *byte ^= 0b1000_0001;
    }
    std::fs::write(&encoded, &bytes).unwrap();

    let output = radiolink(&["decode", arg(&encoded), arg(&decoded)]);
    assert!(output.status.success());
    assert_eq!(json(&output)["uncorrectable"], 1);

    let output = radiolink(&["decode", arg(&encoded), arg(&decoded), "--strict"]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_rejects_partial_slots() {
    let dir = unique_temp_dir("partial");
    let encoded = dir.join("encoded.bin");
    std::fs::write(&encoded, vec![0u8; 100]).unwrap();

    let output = radiolink(&["decode", arg(&encoded), arg(&dir.join("out"))]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn push_then_status_reads_the_shared_fields() {
    let dir = unique_temp_dir("push");
    let input = dir.join("input.txt");
    let region = dir.join("region.bin");
    std::fs::write(&input, vec![b'x'; 100]).unwrap();

    let output = radiolink(&["push", arg(&region), arg(&input), "--reset"]);
    assert!(output.status.success());
    let out = json(&output);
    assert_eq!(out["frames"], 3);
    assert_eq!(out["length"], 270);
    assert_eq!(out["cursor"], 270);

    // Firmware has read one slot.
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&region)
        .unwrap();
    file.write_all_at(&95u32.to_le_bytes(), 4).unwrap();

    let output = radiolink(&["status", arg(&region), "--cursor", "270"]);
    assert!(output.status.success());
    let out = json(&output);
    assert_eq!(out["length"], 270);
    assert_eq!(out["pending_frames"], 3);
    assert_eq!(out["hardware_cursor_raw"], 95);
    assert_eq!(out["hardware_cursor"], 90);
    assert_eq!(out["hardware_slot"], 1);
    assert_eq!(out["lag_bytes"], 180);

    let output = radiolink(&["status", arg(&region), "--cursor", "45"]);
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn info_reflects_flags_and_config_file() {
    let dir = unique_temp_dir("info");
    let config = dir.join("radiolink.json");
    std::fs::write(&config, r#"{"payload_size": 97, "queue_frames": 4}"#).unwrap();

    let output = radiolink(&["info", "--config", arg(&config), "--line-coding"]);
    assert!(output.status.success());
    let out = json(&output);
    assert_eq!(out["frame_size"], 99);
    assert_eq!(out["encoded_frame_size"], 198);
    assert_eq!(out["slot_size"], 396);
    assert_eq!(out["capacity"], 4 * 396);

    let output = radiolink(&["info", "--payload-size", "42"]);
    assert_eq!(output.status.code(), Some(64));

    let huge = (usize::MAX / 2).to_string();
    let output = radiolink(&["info", "--queue-frames", &huge]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("overflow"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_is_a_failure() {
    let dir = unique_temp_dir("missing");
    let output = radiolink(&[
        "encode",
        arg(&dir.join("absent.bin")),
        arg(&dir.join("out.bin")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.bin"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = radiolink(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("radiolink {}", env!("CARGO_PKG_VERSION"))
    );
}
