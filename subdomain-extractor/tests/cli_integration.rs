// subdomain-extractor/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a URL list file
fn create_url_file(lines: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), lines.join("\n")).expect("Failed to write to temp file");
    file
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("subdomain-extractor").unwrap();
    // Keep user config files and env out of the picture.
    cmd.env_remove("SE_THREADS")
        .env_remove("SE_RPS")
        .env_remove("SE_INSECURE")
        .env_remove("SE_TIMEOUT")
        .env_remove("SE_CONFIG")
        .env("HOME", std::env::temp_dir())
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("se-no-config"));
    cmd
}

async fn page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[test]
fn test_help_lists_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--domain"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--threads"))
        .stdout(predicate::str::contains("--rps"))
        .stdout(predicate::str::contains("--insecure"));
}

#[test]
fn test_missing_domain_fails_with_usage() {
    cmd()
        .args(["-u", "http://127.0.0.1:1/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_blank_domain_fails_with_usage() {
    cmd()
        .args(["-d", "  ", "-u", "http://127.0.0.1:1/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be blank"))
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_url_source_fails() {
    cmd()
        .args(["-d", "ford.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_both_url_sources_fail() {
    let file = create_url_file(&["http://127.0.0.1:1/"]);
    cmd()
        .args(["-d", "ford.com", "-u", "http://127.0.0.1:1/", "-f"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unreadable_url_file_is_fatal() {
    cmd()
        .args(["-d", "ford.com", "-f", "/no/such/urls.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_zero_threads_is_rejected() {
    cmd()
        .args(["-d", "ford.com", "-u", "http://127.0.0.1:1/", "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Threads must be at least 1"));
}

#[test]
fn test_empty_url_file_exits_cleanly() {
    let file = create_url_file(&["", "   ", ""]);
    cmd()
        .args(["-d", "ford.com", "--no-progress", "-f"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unreachable_urls_are_silent() {
    let file = create_url_file(&["http://127.0.0.1:1/a", "http://127.0.0.1:1/b"]);
    cmd()
        .args(["-d", "ford.com", "--no-progress", "-f"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_prints_each_subdomain_once() {
    let server = MockServer::start().await;
    page(&server, "/one", 200, "go to a.b.ford.com and test.ford.com").await;
    page(&server, "/two", 200, "test.ford.com again, plus www.ford.com").await;
    page(&server, "/err", 503, "hidden.ford.com").await;

    let one = format!("{}/one", server.uri());
    let two = format!("{}/two", server.uri());
    let err = format!("{}/err", server.uri());
    let file = create_url_file(&[one.as_str(), "", two.as_str(), err.as_str()]);

    let output = cmd()
        .args(["-d", "ford.com", "--no-progress", "-f"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["a.b.ford.com", "test.ford.com", "www.ford.com"]);
    assert!(stdout.ends_with('\n'));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_writes_to_output_file() {
    let server = MockServer::start().await;
    page(&server, "/", 200, "mail.ford.com").await;

    let uri = server.uri();
    let out = NamedTempFile::new().unwrap();
    cmd()
        .args(["-d", "ford.com", "--no-progress", "-u", uri.as_str(), "-o"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(out.path()).unwrap();
    assert_eq!(written, "mail.ford.com\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_file_is_applied() {
    let server = MockServer::start().await;
    page(&server, "/", 200, "cfg.ford.com").await;

    let config = NamedTempFile::new().unwrap();
    fs::write(config.path(), "[defaults]\nthreads = 2\nrps = 5\n").unwrap();

    let uri = server.uri();
    cmd()
        .args(["-d", "ford.com", "--no-progress", "-u", uri.as_str(), "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout("cfg.ford.com\n");
}

#[test]
fn test_invalid_config_file_is_fatal() {
    let config = NamedTempFile::new().unwrap();
    fs::write(config.path(), "[defaults]\nrps = 0\n").unwrap();

    cmd()
        .args(["-d", "ford.com", "-u", "http://127.0.0.1:1/", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_invalid_discovered_config_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("subdomain-extractor.toml"),
        "[defaults]\nthreads = 0\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["-d", "ford.com", "--no-progress", "-u", "http://127.0.0.1:1/"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ignoring config file"));
}
