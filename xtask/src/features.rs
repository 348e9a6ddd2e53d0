use std::process::Command;

use anyhow::{Context, Result};

/// (default features enabled, extra features)
const FEATURE_COMBINATIONS: &[(bool, &[&str])] = &[
    (false, &[]),
    (true, &[]),
    (false, &["keychain"]),
];

/// Check that every supported jobportal-infra feature set compiles.
///
/// Without `keychain` the storage layer falls back to the session file, so
/// both sides of that switch need to build.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} jobportal-infra feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (defaults, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let mut command = Command::new("cargo");
        command.args(["check", "-p", "jobportal-infra", "--all-targets"]);

        if !defaults {
            command.arg("--no-default-features");
        }
        let joined = features.join(",");
        if !joined.is_empty() {
            command.args(["--features", joined.as_str()]);
        }

        let label = match (*defaults, joined.is_empty()) {
            (true, true) => "default".to_string(),
            (false, true) => "no-default-features".to_string(),
            _ => joined.clone(),
        };

        println!(
            "\n[{}/{}] cargo check -p jobportal-infra ({label})",
            index + 1,
            FEATURE_COMBINATIONS.len()
        );

        let status =
            command.status().with_context(|| format!("Failed to run cargo check for '{label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{label}' failed to compile");
        }

        println!("✅ Features '{label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
