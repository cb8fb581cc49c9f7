use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{ARRAY_PAYLOAD, CALL_CHAIN_PAYLOAD, CliTest, stderr, stdout};

const CALL_CHAIN_KEY: &str = "Zx9#Lm4$Pq7!Rs2&";
const ARRAY_KEY: &str = "Opn0Lmk9Ijh7Fge5D$c3aB";

#[test]
fn test_extract_prints_key() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test.extract_command().arg("payload.js").output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(CALL_CHAIN_KEY), "stdout: {}", out);
    assert!(out.contains("via: call-concatenation (high confidence)"));
    assert!(out.contains("Recovered keys from 1 payload"));

    Ok(())
}

#[test]
fn test_extract_no_key_exits_with_failure() -> Result<()> {
    let test = CliTest::with_file("plain.js", "console.log('nothing to see');\n")?;

    let output = test.extract_command().arg("plain.js").output()?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("plain.js"));
    assert!(out.contains("array-indirection"));
    assert!(out.contains("1 of 1 payload yielded no key"));

    Ok(())
}

#[test]
fn test_extract_json_output() -> Result<()> {
    let test = CliTest::with_file("payload.js", ARRAY_PAYLOAD)?;

    let output = test
        .extract_command()
        .args(["payload.js", "--json"])
        .output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    let payload = &report["payloads"][0];
    assert_eq!(payload["source"], "payload.js");
    assert_eq!(payload["success"], true);
    assert_eq!(payload["key"], ARRAY_KEY);
    assert_eq!(payload["keyLength"], 22);
    assert_eq!(payload["strategy"], "arrayIndirection");
    assert!(payload["timestamp"].is_string());
    assert_eq!(payload["pair"]["stringArray"]["name"], "fr");
    assert_eq!(payload["pair"]["numberArray"]["name"], "ix");
    assert_eq!(payload["pair"]["numberArray"]["length"], 11);

    let diagnostics = payload["diagnostics"].as_array().expect("diagnostics");
    assert_eq!(diagnostics.len(), 5);
    assert_eq!(diagnostics[0]["strategy"], "callConcatenation");
    assert_eq!(diagnostics[0]["outcome"]["status"], "rejected");
    assert_eq!(diagnostics[4]["outcome"]["status"], "success");

    Ok(())
}

#[test]
fn test_extract_writes_output_file() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test
        .extract_command()
        .args(["payload.js", "-o", "report.json"])
        .output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_str(&test.read_file("report.json")?)?;
    assert_eq!(report["payloads"][0]["key"], CALL_CHAIN_KEY);
    assert_eq!(report["version"], env!("CARGO_PKG_VERSION"));

    Ok(())
}

#[test]
fn test_extract_disable_strategy() -> Result<()> {
    let test = CliTest::with_file("payload.js", ARRAY_PAYLOAD)?;

    let output = test
        .extract_command()
        .args(["payload.js", "--json", "--disable", "array-indirection"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    let payload = &report["payloads"][0];
    assert_eq!(payload["success"], false);
    assert_eq!(payload["diagnostics"][4]["outcome"]["status"], "disabled");

    Ok(())
}

#[test]
fn test_extract_min_key_len_rejects_short_key() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test
        .extract_command()
        .args(["payload.js", "--json", "--min-key-len", "40"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    let first = &report["payloads"][0]["diagnostics"][0];
    assert_eq!(first["strategy"], "callConcatenation");
    assert_eq!(first["outcome"]["rejection"]["kind"], "validationRejected");

    Ok(())
}

#[test]
fn test_extract_directory_in_sorted_order() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("payloads/b.js", ARRAY_PAYLOAD)?;
    test.write_file("payloads/a.js", CALL_CHAIN_PAYLOAD)?;
    test.write_file("payloads/notes.txt", "not a script")?;

    let output = test
        .extract_command()
        .args(["payloads", "--json"])
        .output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    let payloads = report["payloads"].as_array().expect("payloads");
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0]["key"], CALL_CHAIN_KEY);
    assert_eq!(payloads[1]["key"], ARRAY_KEY);

    Ok(())
}

#[test]
fn test_extract_respects_config_ignores() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".keysiftrc.json", r#"{ "ignores": ["**/vendor/**"] }"#)?;
    test.write_file("payloads/a.js", CALL_CHAIN_PAYLOAD)?;
    test.write_file("payloads/vendor/lib.js", "var x = 1;")?;

    let output = test
        .extract_command()
        .args(["payloads", "--json"])
        .output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["payloads"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[test]
fn test_extract_reads_stdin() -> Result<()> {
    use std::io::Write;
    use std::process::Stdio;

    let test = CliTest::new()?;
    let mut child = test
        .extract_command()
        .args(["-", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(CALL_CHAIN_PAYLOAD.as_bytes())?;
    let output = child.wait_with_output()?;

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["payloads"][0]["source"], "-");
    assert_eq!(report["payloads"][0]["key"], CALL_CHAIN_KEY);

    Ok(())
}

#[test]
fn test_extract_missing_file_is_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().arg("missing.js").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read missing.js"));

    Ok(())
}

#[test]
fn test_extract_invalid_config_is_error() -> Result<()> {
    let test = CliTest::with_file("payload.js", CALL_CHAIN_PAYLOAD)?;
    test.write_file(".keysiftrc.json", r#"{ "maxCallDepth": 0 }"#)?;

    let output = test.extract_command().arg("payload.js").output()?;

    assert_eq!(output.status.code(), Some(2));

    Ok(())
}
