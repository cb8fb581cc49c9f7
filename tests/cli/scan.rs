use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{ARRAY_PAYLOAD, CALL_CHAIN_PAYLOAD, CliTest, stderr, stdout};

#[test]
fn test_scan_lists_arrays_and_mapping_sites() -> Result<()> {
    let test = CliTest::with_file("payload.js", ARRAY_PAYLOAD)?;

    let output = test.scan_command().arg("payload.js").output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("arrays (2)"), "stdout: {}", out);
    assert!(out.contains("strings x11"));
    assert!(out.contains("numbers x11"));
    assert!(out.contains("mapping sites (1)"));
    assert!(out.contains("ix -> fr"));

    Ok(())
}

#[test]
fn test_scan_lists_call_chains() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test.scan_command().arg("payload.js").output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("functions (4)"), "stdout: {}", out);
    assert!(out.contains("call chains (1)"));
    assert!(out.contains("build() = q1() + q2() + q3()"));

    Ok(())
}

#[test]
fn test_scan_verbose_shows_return_expressions() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test
        .scan_command()
        .args(["payload.js", "--verbose"])
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains(r#"q2() @"#));
    assert!(stdout(&output).contains(r#""Lm4$""#));

    Ok(())
}

#[test]
fn test_scan_empty_payload() -> Result<()> {
    let test = CliTest::with_file("empty.js", "")?;

    let output = test.scan_command().arg("empty.js").output()?;

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("arrays (0)"));
    assert!(out.contains("functions (0)"));

    Ok(())
}

#[test]
fn test_scan_reports_main_body() -> Result<()> {
    let test = CliTest::with_file(
        "payload.js",
        "if (f[1].gate()) { (() => { var a = 1; })(); }",
    )?;

    let output = test.scan_command().arg("payload.js").output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("main body @"));

    let test = CliTest::with_file("plain.js", "var a = 1;")?;
    let output = test.scan_command().arg("plain.js").output()?;
    assert!(stdout(&output).contains("main body not found"));

    Ok(())
}
