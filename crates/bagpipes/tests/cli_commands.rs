#![cfg(all(unix, feature = "cli"))]

use std::process::Command;

#[test]
fn doctor_json_reports_pass() {
    let output = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("--format")
        .arg("json")
        .arg("doctor")
        .output()
        .expect("doctor should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("doctor output should be json");
    assert_eq!(value["overall"], "pass");
    let names: Vec<_> = value["checks"]
        .as_array()
        .expect("checks should be an array")
        .iter()
        .map(|check| check["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(names.contains(&"fifo_lifecycle".to_string()));
    assert!(names.contains(&"loopback".to_string()));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("bagpipes {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_extended_includes_build_details() {
    let output = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("version")
        .arg("--extended")
        .output()
        .expect("version should run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: bagpipes"));
    assert!(stdout.contains(&format!("target_os: {}", std::env::consts::OS)));
    assert!(stdout.contains("build_profile:"));
}

#[test]
fn usage_errors_exit_with_64() {
    let output = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("run")
        .arg("--timeout")
        .arg("0s")
        .output()
        .expect("bagpipes should start");

    assert_eq!(output.status.code(), Some(64));
}
