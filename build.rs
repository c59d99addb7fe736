use std::env;
use std::process::Command;

/// Overrides the commit hash when building outside a git checkout
/// (release tarballs, distro packages).
const HASH_OVERRIDE: &str = "SCM_PROVISION_GIT_HASH";

fn main() {
    // Build metadata shown by `scm-provision --version`
    let git_hash = env::var(HASH_OVERRIDE)
        .ok()
        .filter(|hash| !hash.trim().is_empty())
        .or_else(short_head)
        .unwrap_or_else(|| "unknown".to_string());
    let build_date = chrono::Utc::now().format("%Y-%m-%d");
    let target = env::var("TARGET").unwrap_or_default();

    println!("cargo:rustc-env=GIT_HASH={git_hash}");
    println!("cargo:rustc-env=BUILD_DATE={build_date}");
    println!("cargo:rustc-env=BUILD_TARGET={target}");

    println!("cargo:rerun-if-env-changed={HASH_OVERRIDE}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}

fn short_head() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
