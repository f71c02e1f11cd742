#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use url::Url;

/// Run the CLI binary with an isolated HOME, so no real config is read.
pub fn run_cli_with_env(args: &[&str], home: &Path) -> Output {
    run_cli_with_source_env(args, home, None)
}

/// Run the CLI with an isolated HOME and optionally STORYFEED_SOURCE set.
pub fn run_cli_with_source_env(args: &[&str], home: &Path, source: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_storyfeed"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env_remove("RUST_LOG");
    match source {
        Some(source) => cmd.env("STORYFEED_SOURCE", source),
        None => cmd.env_remove("STORYFEED_SOURCE"),
    };
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with an isolated HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path) -> String {
    let output = run_cli_with_env(args, home);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// file:// URL for a capture directory.
pub fn file_source_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// One SSE frame carrying a story.
pub fn story_frame(story: serde_json::Value) -> String {
    format!("data: {}\n\n", story)
}

/// The closing frame of a listing.
pub fn complete_frame(has_more: bool) -> String {
    format!("event: complete\ndata: {{\"has_more\": {}}}\n\n", has_more)
}

/// Write a recorded stream for `offset` into `dir`.
pub fn write_capture(dir: &Path, offset: u32, frames: &[String]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(format!("analyze-{offset}.sse")), frames.concat()).unwrap();
}

/// Parse JSON-lines output.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}
