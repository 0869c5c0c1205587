use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("payroute"));
    cmd.arg("tests/fixtures/events.csv")
        .arg("--config")
        .arg("tests/fixtures/all_succeed.toml");

    // Three routed attempts plus one successful and one failed callback, all on razorpay.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("gateway,enabled,healthy,success_rate"))
        .stdout(predicate::str::contains("razorpay,true,true,80.0"))
        .stdout(predicate::str::contains("payu,false,true,100.0"));

    Ok(())
}

#[test]
fn test_failing_gateway_is_disabled() -> Result<(), Box<dyn std::error::Error>> {
    let events = NamedTempFile::new()?;
    common::generate_events_csv(events.path(), 60)?;

    let mut cmd = Command::new(cargo_bin!("payroute"));
    cmd.arg(events.path())
        .arg("--config")
        .arg("tests/fixtures/failing_razorpay.toml")
        .arg("--seed")
        .arg("7");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("razorpay,true,false,0.0"))
        .stdout(predicate::str::contains("payu,true,true,100.0"))
        .stdout(predicate::str::contains("cashfree,true,true,100.0"));

    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = NamedTempFile::new()?;
    std::io::Write::write_all(&mut config, b"gateways = []\n")?;

    let mut cmd = Command::new(cargo_bin!("payroute"));
    cmd.arg("tests/fixtures/events.csv")
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("At least one gateway must be configured"));

    Ok(())
}
