//! End-to-end tests for the flowpress binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn flowpress(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flowpress"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run flowpress")
}

fn flowpress_with_stdin(args: &[&str], dir: &Path, input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_flowpress"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn flowpress");
    let mut stdin = child.stdin.take().unwrap();
    let data = input.to_vec();
    let writer = std::thread::spawn(move || stdin.write_all(&data));
    let output = child.wait_with_output().unwrap();
    writer.join().unwrap().unwrap();
    output
}

fn sample_text() -> Vec<u8> {
    b"2024-01-01 INFO request served in 12ms\n".repeat(2_000)
}

#[test]
fn test_compress_then_decompress_file() {
    let dir = TempDir::new().unwrap();
    let data = sample_text();
    fs::write(dir.path().join("app.log"), &data).unwrap();

    let out = flowpress(&["compress", "--no-progress", "app.log"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let compressed = fs::read(dir.path().join("app.log.zz")).unwrap();
    assert!(compressed.len() < data.len() / 10);

    fs::remove_file(dir.path().join("app.log")).unwrap();
    let out = flowpress(&["decompress", "--no-progress", "app.log.zz"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("app.log")).unwrap(), data);
}

#[test]
fn test_zstd_with_detection() {
    let dir = TempDir::new().unwrap();
    let data = sample_text();
    fs::write(dir.path().join("data.txt"), &data).unwrap();

    let out = flowpress(
        &["compress", "--no-progress", "-f", "zstd", "-l", "19", "data.txt"],
        dir.path(),
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    // Renamed so only the header can identify the format
    fs::rename(dir.path().join("data.txt.zst"), dir.path().join("blob")).unwrap();
    let out = flowpress(&["decompress", "--no-progress", "blob"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("blob.out")).unwrap(), data);
}

#[test]
fn test_stdin_to_stdout() {
    let dir = TempDir::new().unwrap();
    let data = sample_text();

    let compressed = flowpress_with_stdin(&["compress"], dir.path(), &data);
    assert!(compressed.status.success());
    assert!(compressed.stdout.len() < data.len());

    let restored = flowpress_with_stdin(&["decompress"], dir.path(), &compressed.stdout);
    assert!(restored.status.success());
    assert_eq!(restored.stdout, data);
}

#[test]
fn test_corrupt_input_fails_and_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), sample_text()).unwrap();
    assert!(
        flowpress(&["compress", "--no-progress", "a.txt"], dir.path())
            .status
            .success()
    );

    let path = dir.path().join("a.txt.zz");
    let mut compressed = fs::read(&path).unwrap();
    let middle = compressed.len() / 2;
    compressed[middle] ^= 0xFF;
    fs::write(&path, &compressed).unwrap();
    fs::remove_file(dir.path().join("a.txt")).unwrap();

    let out = flowpress(&["decompress", "--no-progress", "a.txt.zz"], dir.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Corrupt stream"));
    assert!(!dir.path().join("a.txt").exists());

    let out = flowpress(&["test", "a.txt.zz"], dir.path());
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("FAILED"));
}

#[test]
fn test_existing_output_needs_force() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), sample_text()).unwrap();
    fs::write(dir.path().join("a.txt.zz"), b"keep me").unwrap();

    // No terminal, so the prompt is answered with "no"
    let out = flowpress(&["compress", "--no-progress", "a.txt"], dir.path());
    assert!(!out.status.success());
    assert_eq!(fs::read(dir.path().join("a.txt.zz")).unwrap(), b"keep me");

    let out = flowpress(&["compress", "--no-progress", "--force", "a.txt"], dir.path());
    assert!(out.status.success());
    assert_ne!(fs::read(dir.path().join("a.txt.zz")).unwrap(), b"keep me");
}

#[test]
fn test_many_files_json() {
    let dir = TempDir::new().unwrap();
    let names: Vec<String> = (0..6).map(|i| format!("part{}.txt", i)).collect();
    for (i, name) in names.iter().enumerate() {
        fs::write(dir.path().join(name), sample_text().repeat(i + 1)).unwrap();
    }

    let mut args = vec!["compress", "--no-progress", "--json"];
    args.extend(names.iter().map(String::as_str));
    let out = flowpress(&args, dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let reports: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 6);
    for report in reports {
        assert_eq!(report["state"], "finished");
        assert_eq!(report["format"], "zlib");
        assert!(report["bytes_out"].as_u64().unwrap() < report["bytes_in"].as_u64().unwrap());
    }

    let mut args = vec!["test"];
    let compressed: Vec<String> = names.iter().map(|n| format!("{}.zz", n)).collect();
    args.extend(compressed.iter().map(String::as_str));
    assert!(flowpress(&args, dir.path()).status.success());
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), sample_text()).unwrap();
    fs::write(
        dir.path().join("stream.json"),
        r#"{"input_capacity": 64, "output_capacity": 32, "level": 9}"#,
    )
    .unwrap();

    let out = flowpress(
        &["compress", "--no-progress", "--config", "stream.json", "a.txt"],
        dir.path(),
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    fs::write(dir.path().join("bad.json"), r#"{"chunk": 1}"#).unwrap();
    let out = flowpress(
        &["compress", "--no-progress", "-F", "--config", "bad.json", "a.txt"],
        dir.path(),
    );
    assert!(!out.status.success());
}

#[test]
fn test_invalid_level_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();
    let out = flowpress(&["compress", "--no-progress", "-l", "12", "a.txt"], dir.path());
    assert!(!out.status.success());
    assert!(!dir.path().join("a.txt.zz").exists());
}

#[test]
fn test_info_lists_backends() {
    let dir = TempDir::new().unwrap();
    let out = flowpress(&["info", "--json"], dir.path());
    assert!(out.status.success());
    let backends: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let formats: Vec<&str> = backends
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["format"].as_str().unwrap())
        .collect();
    assert!(formats.contains(&"zlib"));
    assert!(formats.contains(&"zstd"));
}
