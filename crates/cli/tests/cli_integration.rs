// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn reference_soc() -> PathBuf {
    workspace_root().join("configs/socs/my-soc.yaml")
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("socfab-cli-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn socfab() -> Command {
    Command::new(env!("CARGO_BIN_EXE_socfab"))
}

#[test]
fn test_check_prints_address_map() {
    let output = socfab()
        .args(["check", "--soc", reference_soc().to_str().unwrap()])
        .output()
        .expect("Failed to execute socfab");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SoC 'my-soc'"));
    assert!(stdout.contains("cpu vexriscv (LiteDebug) reset 0x00100000"));
    assert!(stdout.contains("uart"));
    assert!(stdout.lines().any(|l| l.starts_with("btn_gpio") && l.ends_with("reserved")));
}

#[test]
fn test_overlapping_descriptor_exits_with_config_error() {
    let dir = temp_dir("overlap");
    let yaml = std::fs::read_to_string(reference_soc())
        .unwrap()
        .replace("base_address: 0xb2000000", "base_address: 0xb1000000");
    let soc = dir.join("overlap.yaml");
    std::fs::write(&soc, yaml).unwrap();

    let output = socfab()
        .args(["export", "--soc", soc.to_str().unwrap(), "--out"])
        .arg(dir.join("out"))
        .output()
        .expect("Failed to execute socfab");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("uart"), "stderr: {}", stderr);
    assert!(stderr.contains("led_gpio"), "stderr: {}", stderr);
    // Nothing is produced for a broken map.
    assert!(!dir.join("out").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_reset_vector_outside_rom_exits_with_config_error() {
    let dir = temp_dir("reset");
    let yaml = std::fs::read_to_string(reference_soc())
        .unwrap()
        .replace("reset_vector: 0x00100000", "reset_vector: 0x00000000");
    let soc = dir.join("reset.yaml");
    std::fs::write(&soc, yaml).unwrap();

    let output = socfab()
        .args(["check", "--soc", soc.to_str().unwrap()])
        .output()
        .expect("Failed to execute socfab");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Reset vector 0x00000000"), "stderr: {}", stderr);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_export_is_deterministic() {
    let dir = temp_dir("export");
    let run = |out: &str| {
        let output = socfab()
            .args(["export", "--soc", reference_soc().to_str().unwrap(), "--out"])
            .arg(dir.join(out))
            .output()
            .expect("Failed to execute socfab");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    };

    let first = run("a");
    let second = run("b");
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);

    for file in ["soc.h", "sections.lds", "soc.rs", "soc.json"] {
        let a = std::fs::read(dir.join("a").join(file)).unwrap();
        let b = std::fs::read(dir.join("b").join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
    let header = std::fs::read_to_string(dir.join("a/soc.h")).unwrap();
    assert!(header.contains("(volatile uart_regs_t*)0xb2000000;"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_decode_reports_unmapped() {
    let output = socfab()
        .args([
            "decode",
            "--soc",
            reference_soc().to_str().unwrap(),
            "0xb2000004",
            "0xb5000000",
        ])
        .output()
        .expect("Failed to execute socfab");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0xb2000004 -> uart +0x4"));
    assert!(stdout.contains("0xb5000000 -> UNMAPPED"));
}

#[test]
fn test_replay_emits_json_lines() {
    let script = workspace_root().join("configs/replay/smoke.yaml");
    let output = socfab()
        .args([
            "replay",
            "--soc",
            reference_soc().to_str().unwrap(),
            "--script",
            script.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute socfab");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let records: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    assert_eq!(records.len(), 6);

    let soc_id = records
        .iter()
        .find(|r| r["address"] == "0xb4000000")
        .unwrap();
    assert_eq!(soc_id["data"], "0xca7f100f");
    assert_eq!(soc_id["target"], "soc_id");

    let unmapped = records
        .iter()
        .find(|r| r["address"] == "0xb5000000")
        .unwrap();
    assert_eq!(unmapped["err"], true);
    assert_eq!(unmapped["data"], "0xffffffff");
    assert!(unmapped["target"].is_null());

    let merged = records
        .iter()
        .filter(|r| r["address"] == "0x10000000" && r["op"] == "read")
        .last()
        .unwrap();
    assert_eq!(merged["data"], "0xdeadbeaa");

    let written: Vec<_> = records
        .iter()
        .filter(|r| r["op"] == "write")
        .map(|r| r["data"].as_str().unwrap())
        .collect();
    assert_eq!(written, vec!["0xdeadbeef", "0x000000aa"]);
}

#[test]
fn test_replay_timeout_is_runtime_error() {
    let script = workspace_root().join("configs/replay/smoke.yaml");
    let output = socfab()
        .args([
            "replay",
            "--soc",
            reference_soc().to_str().unwrap(),
            "--script",
            script.to_str().unwrap(),
            "--max-cycles",
            "2",
        ])
        .output()
        .expect("Failed to execute socfab");
    assert_eq!(output.status.code(), Some(3));
}
