//! Build script for foodprint-ce
//!
//! Stamps the binary with the revision it was built from for the startup
//! banner. `FOODPRINT_BUILD_REV` overrides git lookup for packaged builds
//! made outside a checkout.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed=FOODPRINT_BUILD_REV");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let git_hash = std::env::var("FOODPRINT_BUILD_REV")
        .ok()
        .filter(|rev| !rev.trim().is_empty())
        .or_else(|| {
            let hash = git(&["rev-parse", "--short=8", "HEAD"])?;
            // Uncommitted tracked changes
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"]).is_some();
            Some(if dirty { format!("{}-dirty", hash) } else { hash })
        })
        .unwrap_or_else(|| "unknown".to_string());

    let build_timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
