#![cfg(unix)]

use assert_fs::TempDir;
use common::command::{cache_dir, run_walkalike_command, workspace_dir};
use common::file::{inspector_calls, write_inspector, write_tree};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

mod common;

const LISTING: &str = "\
d,0755,4096,,/etc,
-,0644,9,930766865,/etc/hostname,
l,0777,7,,/etc/localtime,/usr/share/zoneinfo/UTC
-,0644,5,1234,/etc/motd,
";

fn write_image(dir: &Path) -> PathBuf {
    let image = dir.join("disk.img");
    std::fs::write(&image, b"not really a disk image").expect("Failed to write image");
    image
}

#[rstest]
fn image_listing_is_indexed(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = write_inspector(workspace_dir.path(), LISTING, 0);
    let image = write_image(workspace_dir.path());

    let output = run_walkalike_command(cache_dir.path(), [
        OsStr::new("ls-index"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
    ])
    .output()?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 2);

    let calls = inspector_calls(workspace_dir.path());
    assert_eq!(
        calls,
        vec![format!(
            "--csv --checksum=crc --long --recursive --add {} /",
            image.display()
        )]
    );

    Ok(())
}

#[rstest]
fn image_index_is_served_from_cache(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = write_inspector(workspace_dir.path(), LISTING, 0);
    let image = write_image(workspace_dir.path());
    let args = [
        OsStr::new("ls-index"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
    ];

    let first = run_walkalike_command(cache_dir.path(), args).output()?;
    let second = run_walkalike_command(cache_dir.path(), args).output()?;

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(inspector_calls(workspace_dir.path()).len(), 1);

    let entries = std::fs::read_dir(cache_dir.path())?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with("-disk.img.index.bin"));

    Ok(())
}

#[rstest]
fn no_cache_always_runs_the_inspector(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = write_inspector(workspace_dir.path(), LISTING, 0);
    let image = write_image(workspace_dir.path());
    let args = [
        OsStr::new("ls-index"),
        OsStr::new("--no-cache"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
    ];

    run_walkalike_command(cache_dir.path(), args).assert().success();
    run_walkalike_command(cache_dir.path(), args).assert().success();

    assert_eq!(inspector_calls(workspace_dir.path()).len(), 2);
    assert_eq!(std::fs::read_dir(cache_dir.path())?.count(), 0);

    Ok(())
}

#[rstest]
fn modified_image_is_inspected_again(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = write_inspector(workspace_dir.path(), LISTING, 0);
    let image = write_image(workspace_dir.path());
    let args = [
        OsStr::new("ls-index"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
    ];

    run_walkalike_command(cache_dir.path(), args).assert().success();
    std::fs::write(&image, b"a different, longer disk image")?;
    run_walkalike_command(cache_dir.path(), args).assert().success();

    assert_eq!(inspector_calls(workspace_dir.path()).len(), 2);

    Ok(())
}

#[rstest]
fn failing_inspector_is_an_error(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = write_inspector(workspace_dir.path(), LISTING, 3);
    let image = write_image(workspace_dir.path());

    run_walkalike_command(cache_dir.path(), [
        OsStr::new("ls-index"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed for"));

    assert_eq!(std::fs::read_dir(cache_dir.path())?.count(), 0);

    Ok(())
}

#[rstest]
fn image_and_extracted_directory_are_fully_similar(
    workspace_dir: TempDir,
    cache_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let listing = "\
d,0755,4096,,/etc,
-,0644,9,930766865,/etc/hostname,
";
    let inspector = write_inspector(workspace_dir.path(), listing, 0);
    let image = write_image(workspace_dir.path());
    let extracted = workspace_dir.path().join("extracted");
    write_tree(&extracted, &[("etc/hostname", "123456789")]);

    run_walkalike_command(cache_dir.path(), [
        OsStr::new("compare"),
        OsStr::new("--inspector"),
        inspector.as_os_str(),
        image.as_os_str(),
        extracted.as_os_str(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("1.0000000000000 "));

    Ok(())
}
