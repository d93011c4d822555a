use std::process::Command;

use anyhow::{Context, Result};

/// Workspace crates, lowest layer first. Each must build without help from
/// the crates above it.
const PACKAGES: &[&str] = &["nexus-domain", "nexus-core", "nexus-infra"];

/// Check every workspace crate (with its tests) in isolation.
pub fn check_packages() -> Result<()> {
    println!("Checking {} workspace crates...", PACKAGES.len());

    for (index, package) in PACKAGES.iter().enumerate() {
        println!("\n[{}/{}] cargo check -p {package} --all-targets", index + 1, PACKAGES.len());

        let status = Command::new("cargo")
            .args(["check", "-p", package, "--all-targets"])
            .status()
            .with_context(|| format!("Failed to run cargo check for '{package}'"))?;

        if !status.success() {
            anyhow::bail!("Crate '{package}' failed to compile");
        }

        println!("✅ {package} compiled successfully");
    }

    println!("\n✅ All {} crates compile successfully!", PACKAGES.len());

    Ok(())
}
