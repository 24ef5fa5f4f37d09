//! Input collection for the `match` command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Extensions treated as media when scanning a directory.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mka", "mk3d", "mp4", "m4v", "m4a", "mov", "avi", "ts", "m2ts", "mts", "vob", "webm",
    "flac", "wav", "ac3", "eac3", "dts", "mp3", "ogg", "opus",
];

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand files and directories into a sorted, deduplicated file list.
///
/// Directories are scanned one level deep and only media files are kept.
/// Explicit file arguments are taken as given.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?;
            for entry in entries {
                let path = entry?.path();
                if path.is_file() && is_media(&path) {
                    files.push(path);
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scans_one_level_and_filters_extensions() {
        let dir = tempdir().unwrap();
        for name in ["b.mkv", "a.MKV", "notes.txt", "c.m2ts"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let nested = dir.path().join("extras");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("d.mkv"), b"").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.MKV", "b.mkv", "c.m2ts"]);
    }

    #[test]
    fn explicit_files_are_kept_and_deduplicated() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"").unwrap();

        let files = collect_inputs(&[file.clone(), file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(collect_inputs(&[dir.path().join("missing")]).is_err());
    }
}
