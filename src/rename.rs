use jwalk::WalkDir;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::{collect_image_files, split_file_name, unique_random_path};
use crate::voc::{annotation_path_for, read_annotation, write_annotation};

/// First character upper case, the rest lower case, spaces as underscores
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    capitalized.replace(' ', "_")
}

/// Rename every sub-directory of `root` to its capitalized form, deepest first.
/// Returns the number of renamed folders.
pub fn capitalize_folder_names(root: &Path) -> Result<usize> {
    let mut renames: Vec<(usize, PathBuf, PathBuf)> = WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.depth() > 0 && entry.file_type().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let changed = capitalize(&name);
            (changed != name).then(|| {
                let path = entry.path();
                let target = path.with_file_name(&changed);
                (entry.depth(), path, target)
            })
        })
        .collect();

    info!(
        "Found {} folders where name shall be capitalized.",
        renames.len()
    );

    renames.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for (_, from, to) in &renames {
        info!("Renaming folder {} to {} ...", from.display(), to.display());
        fs::rename(from, to)?;
    }
    Ok(renames.len())
}

/// Give one image a random unique name and carry its annotation along
pub fn rename_image(image_file: &Path) -> Result<PathBuf> {
    let (folder, _, extension) = split_file_name(image_file);
    let new_image = unique_random_path(&folder, &extension);
    fs::rename(image_file, &new_image)?;

    let old_xml = annotation_path_for(image_file);
    if old_xml.is_file() {
        let mut annotation = read_annotation(&old_xml)?;
        annotation.folder = Some("XML".to_string());
        annotation.filename = new_image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        annotation.path = Some(new_image.to_string_lossy().into_owned());
        annotation.lowercase_labels();
        write_annotation(&annotation_path_for(&new_image), &annotation)?;
        fs::remove_file(&old_xml)?;
    }
    Ok(new_image)
}

/// Rename every image below `root`, returning the number of renamed images
pub fn rename_images(root: &Path) -> Result<usize> {
    let mut renamed = 0;
    for image_file in collect_image_files(root) {
        match rename_image(&image_file) {
            Ok(_) => renamed += 1,
            Err(e) => error!("Failed to rename {}: {}", image_file.display(), e),
        }
    }
    Ok(renamed)
}
