use anyhow::{Context, Result};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CALL_CHAIN_PAYLOAD, CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["proximityThreshold"], 1000);
    assert_eq!(parsed["minArrayLen"], 10);
    assert_eq!(parsed["minKeyLen"], 10);
    assert_eq!(parsed["maxCallDepth"], 10);
    assert_eq!(parsed["nineCallArity"], 9);
    assert!(
        parsed["routeMarker"].is_string(),
        "Config should have 'routeMarker' field"
    );
    assert_eq!(parsed["strategies"]["arrayIndirection"], true);
    assert_eq!(parsed["strategies"]["fallback"], true);

    // 2-space indentation
    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_snapshot!(stdout(&output).trim(), @"✓ Created .keysiftrc.json");
    assert!(test.root().join(".keysiftrc.json").exists());

    let content = test.read_file(".keysiftrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".keysiftrc.json", "{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_snapshot!(stderr(&output).trim(), @"Error: .keysiftrc.json already exists");
    assert_eq!(test.read_file(".keysiftrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("payload.js", CALL_CHAIN_PAYLOAD)?;

    let output = test.extract_command().arg("payload.js").output()?;
    assert!(
        output.status.success(),
        "Extract should work with initialized config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}
