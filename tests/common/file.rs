use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Write `(relative path, content)` pairs under `dir`
pub fn write_tree(dir: &Path, files: &[(&str, &str)]) -> Vec<FileSpec> {
    files
        .iter()
        .map(|(path, content)| {
            let file_spec = FileSpec::new(dir.join(path), content.to_string());
            write_file(file_spec.clone());

            file_spec
        })
        .collect()
}

pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<FileSpec> {
    use fake::{
        Fake,
        faker::lorem::en::{Word, Words},
    };

    (0..files_count)
        .map(|i| {
            let file_name = format!("{}-{}.txt", Word().fake::<String>(), i);
            let file_path = dir.join(&file_name);
            let file_content = Words(5..10).fake::<Vec<String>>().join(" ");

            let file_spec = FileSpec::new(file_path, file_content);
            write_file(file_spec.clone());

            file_spec
        })
        .collect::<Vec<_>>()
}

/// Write a copy of `files`, rooted at `from`, under `to`
pub fn mirror_files(files: &[FileSpec], from: &Path, to: &Path) {
    for file_spec in files {
        let relative = file_spec
            .path
            .strip_prefix(from)
            .unwrap_or_else(|e| panic!("{:?} is not under {:?}: {}", file_spec.path, from, e));

        write_file(FileSpec::new(to.join(relative), file_spec.content.clone()));
    }
}

/// Write an executable shell script standing in for the image inspector.
///
/// Each run appends a line to `calls.log` next to the script, then prints `listing`.
#[cfg(unix)]
pub fn write_inspector(dir: &Path, listing: &str, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script_path = dir.join("inspector.sh");
    let calls_path = dir.join("calls.log");
    let script = format!(
        "#!/bin/sh\necho \"$@\" >> '{}'\ncat <<'LISTING'\n{}LISTING\nexit {}\n",
        calls_path.display(),
        listing,
        exit_code
    );

    std::fs::write(&script_path, script)
        .unwrap_or_else(|e| panic!("Failed to write inspector {:?}: {}", script_path, e));
    std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|e| panic!("Failed to make {:?} executable: {}", script_path, e));

    script_path
}

/// Lines logged by the inspector written with [`write_inspector`]
pub fn inspector_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .map(|calls| calls.lines().map(String::from).collect())
        .unwrap_or_default()
}
