//! Integration tests driving the `mk` binary against a mock analytics server.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mk(home: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mk"))
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("MK_APP_KEY")
        .env_remove("MK_HOST")
        .env_remove("MK_APP_VERSION")
        .env_remove("MK_REQUEST_TIMEOUT_SECS")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run mk")
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file.flush().unwrap();
    file
}

/// Test that `mk event` sends begin, events and end requests.
#[tokio::test(flavor = "multi_thread")]
async fn test_event_command_sends_full_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/i"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":"Success"}"#))
        .expect(3)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = config_file(&format!(
        "app_key = \"cli-app\"\nhost = \"{}\"\n",
        server.uri()
    ));

    let output = mk(
        home.path(),
        config.path(),
        &[
            "event",
            "purchase",
            "--count",
            "2",
            "--sum",
            "9.5",
            "--segment",
            "currency=USD",
        ],
    );

    assert!(
        output.status.success(),
        "mk event should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sent purchase (count 2, sum 9.5)"));

    let requests = server.received_requests().await.unwrap();
    let events_body = String::from_utf8_lossy(&requests[1].body);
    assert!(events_body.contains("events="));
    assert!(events_body.contains("currency"));

    // The device identity is persisted for later runs.
    assert!(home.path().join(".local/share/mk/device.json").exists());
}

/// Test that the same device ID is reused across runs.
#[tokio::test(flavor = "multi_thread")]
async fn test_device_id_is_stable_across_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":"Success"}"#))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = config_file(&format!(
        "app_key = \"cli-app\"\nhost = \"{}\"\n",
        server.uri()
    ));

    for key in ["first", "second"] {
        let output = mk(home.path(), config.path(), &["event", key]);
        assert!(output.status.success());
    }

    let requests = server.received_requests().await.unwrap();
    let device_ids: Vec<String> = requests
        .iter()
        .filter_map(|request| {
            let body = String::from_utf8_lossy(&request.body);
            body.split('&')
                .find_map(|pair| pair.strip_prefix("device_id="))
                .map(str::to_string)
        })
        .collect();
    assert_eq!(device_ids.len(), 6);
    assert!(device_ids.windows(2).all(|pair| pair[0] == pair[1]));
}

/// Test that a missing app key fails with a helpful message.
#[test]
fn test_event_without_app_key_fails_gracefully() {
    let home = TempDir::new().unwrap();
    let config = config_file("host = \"stats.example.com\"\n");

    let output = mk(home.path(), config.path(), &["event", "launch"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no app_key configured"), "stderr: {stderr}");
}

/// Test that an unreachable host is reported instead of panicking.
#[test]
fn test_event_with_unreachable_host_fails_gracefully() {
    let home = TempDir::new().unwrap();
    let config = config_file(
        "app_key = \"cli-app\"\nhost = \"http://127.0.0.1:9\"\nrequest_timeout_secs = 2\n",
    );

    let output = mk(home.path(), config.path(), &["event", "launch"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to start session"), "stderr: {stderr}");
}

/// Test that `mk config` never prints the app key.
#[test]
fn test_config_command_redacts_app_key() {
    let home = TempDir::new().unwrap();
    let config = config_file("app_key = \"top-secret\"\nhost = \"stats.example.com\"\n");

    let output = mk(home.path(), config.path(), &["config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[REDACTED]"));
    assert!(stdout.contains("stats.example.com"));
    assert!(!stdout.contains("top-secret"));
}

/// Test that `mk device --reset` issues a new device ID.
#[test]
fn test_device_reset_changes_id() {
    let home = TempDir::new().unwrap();
    let config = config_file("");

    let first = mk(home.path(), config.path(), &["device"]);
    let second = mk(home.path(), config.path(), &["device", "--reset"]);
    assert!(first.status.success());
    assert!(second.status.success());

    let id_line = |output: &Output| {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .find(|line| line.starts_with("Device ID:"))
            .map(str::to_string)
            .unwrap()
    };
    assert_ne!(id_line(&first), id_line(&second));
}
