//! Detection and installation of the external tools the runner wraps.

use crate::errors::CodequalError;
use anyhow::{anyhow, Result};
use std::process::Command;

pub const CARGO_LLVM_COV_VERSION: &str = "0.6.16";
pub const RUST_CODE_ANALYSIS_VERSION: &str = "0.0.25";

/// Checks PATH for a tool binary.
pub fn is_installed(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Errors with a typed tool failure when a binary is missing from PATH.
pub fn require(tool: &str, hint: &str) -> Result<(), CodequalError> {
    if is_installed(tool) {
        Ok(())
    } else {
        Err(CodequalError::tool(tool, hint))
    }
}

pub fn install_cargo_llvm_cov() -> Result<()> {
    cargo_install("cargo-llvm-cov", CARGO_LLVM_COV_VERSION)
}

pub fn install_rust_code_analysis() -> Result<()> {
    cargo_install("rust-code-analysis-cli", RUST_CODE_ANALYSIS_VERSION)
}

/// Installs everything the full analyse sequence needs, collecting
/// failures instead of stopping at the first.
pub fn install_all() -> Result<()> {
    println!("Installing required tools...");
    let mut failed = false;

    for (tool, install) in [
        ("cargo-llvm-cov", install_cargo_llvm_cov as fn() -> Result<()>),
        ("rust-code-analysis-cli", install_rust_code_analysis),
    ] {
        match install() {
            Ok(()) => println!("✓ {tool} installed"),
            Err(e) => {
                log::error!("installing {tool}: {e:#}");
                failed = true;
            }
        }
    }

    if failed {
        return Err(anyhow!("failed to install some tools"));
    }
    println!("✓ All tools installed successfully");
    Ok(())
}

fn cargo_install(package: &str, version: &str) -> Result<()> {
    println!("Installing {package} {version}...");
    let status = Command::new("cargo")
        .args(["install", "--version", version, package])
        .status()
        .map_err(|e| CodequalError::tool(package, format!("failed to run cargo install: {e}")))?;

    if !status.success() {
        return Err(
            CodequalError::tool(package, format!("cargo install exited with {status}")).into(),
        );
    }
    Ok(())
}
