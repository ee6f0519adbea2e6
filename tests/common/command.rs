use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::ffi::OsStr;
use std::path::Path;

#[fixture]
pub fn workspace_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn cache_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// `walkalike` with the given arguments, isolated from the caller's environment and
/// caching into `cache_dir`
pub fn run_walkalike_command<I, S>(cache_dir: &Path, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::cargo_bin("walkalike").expect("Failed to find walkalike binary");
    cmd.env_remove("WALKALIKE_WORKERS")
        .env_remove("WALKALIKE_INSPECTOR")
        .env_remove("RUST_LOG")
        .env("WALKALIKE_CACHE_DIR", cache_dir)
        .env("NO_COLOR", "1")
        .args(args);

    cmd
}
