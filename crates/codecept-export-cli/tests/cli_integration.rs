use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("codecept-export").unwrap();
    // Keep the user's config and session out of the tests.
    cmd.env_remove("CODECEPT_EXPORT_URL")
        .env_remove("CODECEPT_EXPORT_SESSION");
    cmd
}

#[test]
fn test_help_exits_zero() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("codecept-export"));
}

#[test]
fn test_export_help_lists_flags() {
    cli()
        .args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--origin-tracing"))
        .stdout(predicate::str::contains("--suite"));
}

#[test]
fn test_export_single_test_to_stdout() {
    let fixture = fixture_path("shop.side");

    let assert = cli()
        .args(["export", fixture.to_str().unwrap(), "--test", "Login", "--stdout"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.starts_with("<?php"));
    assert!(stdout.contains("class LoginCest"));
    assert!(stdout.contains("public function testLogin(AcceptanceTester $i)"));
    assert!(stdout.contains("$i->amOnUrl('https://shop.test/login');"));
    assert!(stdout.contains("$i->pressKey(WebDriverBy::id('email'), 'ada@shop.test');"));
    assert!(stdout.contains(
        "$i->pressKey(WebDriverBy::id('password'), 'hunter2', WebDriverKeys::ENTER);"
    ));
    assert!(stdout.contains("$i->waitForElementVisible(WebDriverBy::cssSelector('.welcome'), 5000);"));
    assert!(stdout.contains("$i->seeInTitle('Welcome');"));
}

#[test]
fn test_export_url_flag_overrides_project_url() {
    let fixture = fixture_path("shop.side");

    cli()
        .args([
            "export",
            fixture.to_str().unwrap(),
            "--test",
            "Login",
            "--stdout",
            "--url",
            "https://staging.shop.test",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "$i->amOnUrl('https://staging.shop.test/login');",
        ));
}

#[test]
fn test_export_run_generates_helper_method() {
    let fixture = fixture_path("shop.side");

    let assert = cli()
        .args(["export", fixture.to_str().unwrap(), "--test", "Checkout", "--stdout"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("$this->login($i);"));
    assert!(stdout.contains("public function login(AcceptanceTester $i)"));
    assert!(stdout.contains("$this->vars['total']"));
}

#[test]
fn test_export_writes_one_file_per_test() {
    let fixture = fixture_path("shop.side");
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("acceptance");

    cli()
        .args([
            "export",
            fixture.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("LoginCest.php"))
        .stdout(predicate::str::contains("CheckoutCest.php"));

    let login = std::fs::read_to_string(out_dir.join("LoginCest.php")).unwrap();
    assert!(login.contains("class LoginCest"));
    assert!(out_dir.join("CheckoutCest.php").exists());
}

#[test]
fn test_export_suite_as_single_class() {
    let fixture = fixture_path("shop.side");
    let out = tempfile::tempdir().unwrap();

    cli()
        .args([
            "--quiet",
            "export",
            fixture.to_str().unwrap(),
            "--suite",
            "Shop flows",
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let body = std::fs::read_to_string(out.path().join("ShopflowsCest.php")).unwrap();
    assert!(body.contains("class ShopflowsCest {"));
    assert!(body.contains("public function testLogin(AcceptanceTester $i)"));
    assert!(body.contains("public function testCheckout(AcceptanceTester $i)"));
}

#[test]
fn test_export_origin_tracing() {
    let fixture = fixture_path("shop.side");

    cli()
        .args([
            "export",
            fixture.to_str().unwrap(),
            "--test",
            "Login",
            "--stdout",
            "--origin-tracing",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("// Test name: Login"))
        .stdout(predicate::str::contains("// 1 | open | /login | "));
}

#[test]
fn test_export_reads_project_from_stdin() {
    let content = std::fs::read_to_string(fixture_path("relative.side")).unwrap();

    cli()
        .args(["export", "-", "--stdout", "--url", "http://localhost:8080"])
        .write_stdin(content)
        .assert()
        .success()
        .stdout(predicate::str::contains("class HomeCest"))
        .stdout(predicate::str::contains("$i->amOnUrl('http://localhost:8080/');"));
}

#[test]
fn test_export_unknown_command_fails() {
    let fixture = fixture_path("unsupported.side");

    cli()
        .args(["export", fixture.to_str().unwrap(), "--stdout"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown command teleport"));
}

#[test]
fn test_export_unknown_test_fails() {
    let fixture = fixture_path("shop.side");

    cli()
        .args(["export", fixture.to_str().unwrap(), "--test", "Refund"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Refund"));
}

#[test]
fn test_export_unknown_suite_fails() {
    let fixture = fixture_path("shop.side");

    cli()
        .args(["export", fixture.to_str().unwrap(), "--suite", "Nightly"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Suite 'Nightly' not found"));
}

#[test]
fn test_export_broken_project_fails() {
    let fixture = fixture_path("broken.side");

    cli()
        .args(["export", fixture.to_str().unwrap(), "--stdout"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_export_missing_file_is_io_error() {
    cli()
        .args(["export", "/nonexistent/path/shop.side", "--stdout"])
        .assert()
        .code(4);
}

#[test]
fn test_test_and_suite_conflict() {
    let fixture = fixture_path("shop.side");

    cli()
        .args([
            "export",
            fixture.to_str().unwrap(),
            "--test",
            "Login",
            "--suite",
            "Shop flows",
        ])
        .assert()
        .failure();
}

#[test]
fn test_commands_lists_builtins() {
    cli()
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("waitForElementVisible"))
        .stdout(predicate::str::contains("executeAsyncScript"))
        .stdout(predicate::str::contains("assertTitle"));
}

#[test]
fn test_send_without_server_is_connection_error() {
    let options = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(options.path(), r#"{"url": "https://shop.test"}"#).unwrap();

    cli()
        .args([
            "-s",
            "no-such-session-for-tests",
            "send",
            options.path().to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Connection error"));
}

#[test]
fn test_send_invalid_options_fails_before_connecting() {
    let options = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(options.path(), "[1, 2").unwrap();

    cli()
        .args(["send", options.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid export options"));
}
