//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn studydesk() -> Command {
    let mut cmd = Command::cargo_bin("studydesk").unwrap();
    // Keep tests independent of the developer's environment
    cmd.env_remove("DATABASE_URL")
        .env_remove("STUDYDESK_BIND")
        .env_remove("STUDYDESK_ADMIN_PASSWORD")
        .env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd
}

#[test]
fn test_top_level_help_lists_commands() {
    studydesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("create-admin"))
        .stdout(predicate::str::contains("rehash-passwords"));
}

#[test]
fn test_serve_help() {
    studydesk()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("--no-migrate"));
}

#[test]
fn test_create_admin_help() {
    studydesk()
        .arg("create-admin")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_rehash_help() {
    studydesk()
        .arg("rehash-passwords")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_migrate_without_database_url_fails() {
    studydesk()
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

#[test]
fn test_create_admin_rejects_short_password_before_connecting() {
    studydesk()
        .args(["create-admin", "--name", "Root", "--email", "root@uni.edu", "--password", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password must be at least 6 characters"));
}

#[test]
fn test_completions_bash() {
    studydesk()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("studydesk"));
}
