use indicatif::{ProgressBar, ProgressStyle};
use jwalk::WalkDir;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::types::get_image_extensions_set;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Delete the directory if it exists and create it again empty
pub fn create_output_directory(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        log::warn!(
            "Directory {:?} already exists. Deleting and recreating it.",
            path
        );
        fs::remove_dir_all(path).and_then(|_| fs::create_dir_all(path))?;
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Whether the file extension is one of the supported image formats
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
}

/// Whether the file extension matches one of `extensions`, ignoring case
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Recursively list files below `root` whose extension is in `extensions`.
/// The result is sorted so batch runs are reproducible.
pub fn collect_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    files
}

/// Recursively list supported image files below `root`
pub fn collect_image_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();
    files.sort();
    files
}

/// Recursively list XML annotation files below `root`
pub fn collect_annotation_files(root: &Path) -> Vec<PathBuf> {
    collect_files(root, &["xml"])
}

/// A random 32 character hex name
pub fn random_name() -> String {
    Uuid::new_v4().simple().to_string()
}

/// `folder/<random hex>.<extension>` that does not exist yet
pub fn unique_random_path(folder: &Path, extension: &str) -> PathBuf {
    loop {
        let candidate = folder.join(format!("{}.{}", random_name(), extension));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Split a path into its parent directory, file stem and extension (without dot)
pub fn split_file_name(path: &Path) -> (PathBuf, String, String) {
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (base_dir, stem, extension)
}

/// Name of the last component of a directory path
pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Map `path` below `input_root` onto the same relative location below `output_root`
pub fn mirror_path(path: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    match path.strip_prefix(input_root) {
        Ok(relative) => output_root.join(relative),
        Err(_) => output_root.to_path_buf(),
    }
}

/// Whether `path` lies in an output folder nested inside the input tree.
/// Such files were written by an earlier run and are not input.
pub fn is_nested_output(path: &Path, input_root: &Path, output_root: &Path) -> bool {
    output_root != input_root && output_root.starts_with(input_root) && path.starts_with(output_root)
}
