//! Integration tests for the erg CLI
//!
//! Runs the built binary against small files written into a temp dir.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

const RECORDS: usize = 5;

/// Write `run.erg` (Time: Double [s], Speed: Float [m/s]) and its companion
fn write_run(dir: &Path) -> PathBuf {
    let path = dir.join("run.erg");

    let mut data = b"CM-ERG\0\0".to_vec();
    data.push(1);
    data.push(0);
    data.extend_from_slice(&12u16.to_le_bytes());
    data.extend_from_slice(&[0; 4]);
    for record in 0..RECORDS {
        data.extend_from_slice(&(record as f64 * 0.5).to_le_bytes());
        data.extend_from_slice(&(record as f32 * 2.0).to_le_bytes());
    }
    std::fs::write(&path, data).expect("Failed to write data file");

    std::fs::write(
        dir.join("run.erg.info"),
        "File.Format = erg\n\
         File.ByteOrder = LittleEndian\n\
         File.At.1.Name = Time\n\
         File.At.1.Type = Double\n\
         File.At.2.Name = Speed\n\
         File.At.2.Type = Float\n\
         Quantity.Time.Unit = s\n\
         Quantity.Speed.Unit = m/s\n",
    )
    .expect("Failed to write companion");

    path
}

/// The binary with an isolated config file
fn erg(dir: &Path, config: &str) -> Command {
    let config_path = dir.join("erg.toml");
    std::fs::write(&config_path, config).expect("Failed to write config");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_erg"));
    cmd.arg("--config").arg(config_path);
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_info() {
    let dir = tempdir().expect("Failed to create temp dir");
    let run = write_run(dir.path());

    let output = erg(dir.path(), "").arg("info").arg(&run).output().unwrap();
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("Records:     5"), "{text}");
    assert!(text.contains("Record size: 12 bytes"), "{text}");
    assert!(text.contains("Time"));
    assert!(text.contains("m/s"));
}

#[test]
fn test_info_json() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "")
        .args(["info", "--json"])
        .arg(&run)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["records"], 5);
    assert_eq!(summary["record_size"], 12);
    assert_eq!(summary["flavor"], "Erg");
    assert_eq!(summary["quantities"][1]["name"], "Speed");
    assert_eq!(summary["quantities"][1]["unit"], "m/s");
    assert_eq!(summary["quantities"][1]["kind"], "f32");
    assert_eq!(summary["quantities"][1]["offset"], 8);
}

#[test]
fn test_read_by_name_and_index() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "")
        .arg("read")
        .arg(&run)
        .arg("Speed")
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "0\n2\n4\n6\n8\n");

    let output = erg(dir.path(), "")
        .arg("read")
        .arg(&run)
        .args(["0", "--start", "1", "--count", "2"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "0.5\n1\n");
}

#[test]
fn test_read_failures() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let unknown = erg(dir.path(), "")
        .arg("read")
        .arg(&run)
        .arg("Data_10")
        .output()
        .unwrap();
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("Data_10"));

    let past_end = erg(dir.path(), "")
        .arg("read")
        .arg(&run)
        .args(["Time", "--start", "4", "--count", "2"])
        .output()
        .unwrap();
    assert!(!past_end.status.success());
}

#[test]
fn test_export_csv() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());
    let csv_path = dir.path().join("run.csv");

    let output = erg(dir.path(), "")
        .arg("export")
        .arg(&run)
        .arg("-o")
        .arg(&csv_path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), RECORDS + 1);
    assert_eq!(lines[0], "Time,Speed");
    assert_eq!(lines[1], "0,0");
    assert_eq!(lines[3], "1,4");
}

#[test]
fn test_export_csv_with_config() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let config = "[reader]\nchunk_records = 2\n\n[export]\ndelimiter = \";\"\nunits_row = true\n";
    let output = erg(dir.path(), config)
        .arg("export")
        .arg(&run)
        .args(["-q", "Speed", "-q", "Time"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), RECORDS + 2);
    assert_eq!(lines[0], "Speed;Time");
    assert_eq!(lines[1], "m/s;s");
    assert_eq!(lines[6], "8;2");
}

#[test]
fn test_export_json() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "")
        .arg("export")
        .arg(&run)
        .args(["--format", "json", "-q", "Speed"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let table: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let object = table.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(
        table["Speed"],
        serde_json::json!([0.0, 2.0, 4.0, 6.0, 8.0])
    );
}

#[test]
fn test_export_json_selection_only() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "[reader]\nchunk_records = 2\n")
        .arg("export")
        .arg(&run)
        .args(["--format", "json", "-q", "Time"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let table: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(table.get("Speed").is_none());
    assert_eq!(
        table["Time"],
        serde_json::json!([0.0, 0.5, 1.0, 1.5, 2.0])
    );
}

#[test]
fn test_export_unknown_quantity() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "")
        .arg("export")
        .arg(&run)
        .args(["-q", "Nope"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_check() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "").arg("check").arg(&run).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).starts_with("ok"));

    let output = erg(dir.path(), "")
        .arg("check")
        .arg(&run)
        .arg(dir.path().join("missing.erg"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("ok"));
    assert!(text.contains("FAIL"));
}

#[test]
fn test_bad_config_is_an_error() {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path());

    let output = erg(dir.path(), "[reader\n")
        .arg("info")
        .arg(&run)
        .output()
        .unwrap();
    assert!(!output.status.success());
}
