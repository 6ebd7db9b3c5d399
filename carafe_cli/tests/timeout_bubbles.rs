#![cfg(not(feature = "hardware"))]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[rstest]
#[case(false, "What happened: Scale read timed out")]
#[case(true, "\"reason\":\"Timeout\"")]
fn scale_timeout_bubbles_to_cli(#[case] json: bool, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let toml = r#"
[pins]
hx711_dt = 17
hx711_sck = 27
encoder_clk = 26
encoder_dt = 21
encoder_button = 20
red_button = 18
expander_interrupt = 4

[hardware]
sensor_read_timeout_ms = 250
"#;
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, toml).unwrap();

    let mut cmd = Command::cargo_bin("carafe_cli").unwrap();
    cmd.env("CARAFE_TEST_SIM_FAIL", "100");
    if json {
        cmd.arg("--json");
    }
    cmd.arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("self-check");
    let assert = cmd.assert().code(3);
    if json {
        assert.stdout(predicate::str::contains(needle));
    } else {
        assert.stderr(predicate::str::contains(needle));
    }
}
