#![cfg(all(unix, feature = "cli"))]

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use bagpipes::fifo::{Creator, NamespaceConfig, PipeNamespace};
use bagpipes::frame::{FrameConfig, FramedChannel};

fn coordinator(root: &Path, identity: u32) -> (PipeNamespace, FramedChannel<Creator>) {
    let config = NamespaceConfig {
        temp_root: Some(root.to_path_buf()),
        ..NamespaceConfig::default()
    };
    let ns = PipeNamespace::with_config(identity, config).expect("namespace should be creatable");
    let pair = ns.create_pair("worker").expect("pair should be creatable");
    let frame_config = FrameConfig {
        read_timeout: Some(Duration::from_secs(5)),
        write_timeout: Some(Duration::from_secs(5)),
        ..FrameConfig::default()
    };
    (ns, FramedChannel::with_config(pair, frame_config))
}

fn spawn_worker(channel: &FramedChannel<Creator>, extra: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("worker")
        .arg("--coordinator-in")
        .arg(channel.inbound_path())
        .arg("--coordinator-out")
        .arg(channel.outbound_path())
        .args(extra)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("worker should start")
}

#[test]
fn worker_replies_then_exits_after_count() {
    let root = tempfile::tempdir().expect("temp root should be creatable");
    let (ns, mut channel) = coordinator(root.path(), 1);
    let child = spawn_worker(&channel, &["--reply", "pong", "--count", "1"]);

    assert_eq!(channel.send("ping").expect("send should succeed"), Some(8));
    let reply = channel
        .recv()
        .expect("recv should succeed")
        .expect("worker should reply");
    assert_eq!(reply.as_ref(), b"pong");

    let output = child.wait_with_output().expect("worker should exit");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(stdout.contains("\"payload\":\"ping\""), "stdout: {stdout}");
    assert!(stdout.contains("\"role\":\"worker\""), "stdout: {stdout}");
    assert!(stdout.contains("\"payload\":\"pong\""), "stdout: {stdout}");

    channel.teardown(ns).expect("teardown should succeed");
}

#[test]
fn worker_echoes_until_coordinator_tears_down() {
    let root = tempfile::tempdir().expect("temp root should be creatable");
    let (ns, mut channel) = coordinator(root.path(), 2);
    let child = spawn_worker(&channel, &["--poll-interval", "50ms"]);

    let binary: Vec<u8> = vec![0, 159, 146, 150, 255];
    for payload in [&b"first"[..], &binary[..], &b""[..]] {
        channel.send(payload).expect("send should succeed");
        let echoed = channel
            .recv()
            .expect("recv should succeed")
            .expect("worker should echo");
        assert_eq!(echoed.as_ref(), payload);
    }

    channel.teardown(ns).expect("teardown should succeed");
    let output = child.wait_with_output().expect("worker should exit");
    assert!(
        output.status.success(),
        "worker failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let received = stdout.matches("\"direction\":\"received\"").count();
    let sent = stdout.matches("\"direction\":\"sent\"").count();
    assert_eq!((received, sent), (3, 3), "stdout: {stdout}");
}

#[test]
fn worker_with_missing_pipes_is_a_transport_error() {
    let root = tempfile::tempdir().expect("temp root should be creatable");

    let output = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("worker")
        .arg("--coordinator-in")
        .arg(root.path().join("worker_0_in"))
        .arg("--coordinator-out")
        .arg(root.path().join("worker_0_out"))
        .output()
        .expect("worker should start");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("attach failed"), "stderr: {stderr}");
}

#[test]
fn worker_refuses_regular_files() {
    let root = tempfile::tempdir().expect("temp root should be creatable");
    let inbound = root.path().join("worker_0_in");
    let outbound = root.path().join("worker_0_out");
    std::fs::write(&inbound, b"").expect("file should be writable");
    std::fs::write(&outbound, b"").expect("file should be writable");

    let status = Command::new(env!("CARGO_BIN_EXE_bagpipes"))
        .arg("--log-level")
        .arg("off")
        .arg("worker")
        .arg("--coordinator-in")
        .arg(&inbound)
        .arg("--coordinator-out")
        .arg(&outbound)
        .status()
        .expect("worker should start");

    assert_eq!(status.code(), Some(3));
}
