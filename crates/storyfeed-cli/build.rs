//! Build script embedding the git version as `STORYFEED_VERSION`.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let pkg = env!("CARGO_PKG_VERSION");
    let version = match git_describe() {
        // Untagged checkouts only describe to a commit hash.
        Some(desc) if is_commit_only(&desc) => format!("{pkg}+{desc}"),
        Some(desc) => desc,
        None => pkg.to_string(),
    };

    println!("cargo:rustc-env=STORYFEED_VERSION={}", version);
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let desc = String::from_utf8(output.stdout).ok()?;
    let desc = desc.trim();
    if desc.is_empty() {
        return None;
    }

    Some(desc.strip_prefix('v').unwrap_or(desc).to_string())
}

fn is_commit_only(desc: &str) -> bool {
    let hash = desc.strip_suffix("-dirty").unwrap_or(desc);
    hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit())
}
