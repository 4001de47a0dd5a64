use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::TransferMode;
use crate::error::Result;
use crate::types::SPLIT_IMG_FORMATS;
use crate::utils::collect_files;

pub const IMAGES_DIR: &str = "images";
pub const ANNOTATIONS_DIR: &str = "Annotations";

/// Output folder names of the three splits
pub const SPLIT_NAMES: [&str; 3] = ["train", "validation", "test"];

fn transfer(from: &Path, to: &Path, mode: TransferMode) -> std::io::Result<()> {
    match mode {
        TransferMode::Copy => fs::copy(from, to).map(|_| ()),
        TransferMode::Move => fs::rename(from, to).or_else(|_| {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }),
    }
}

/// Put the images of `split_dir` into `target/images` and the XML files into
/// `target/Annotations`. Returns the number of files transferred.
fn layout_split(split_dir: &Path, target: &Path, mode: TransferMode) -> Result<usize> {
    let images_dir = target.join(IMAGES_DIR);
    let annotations_dir = target.join(ANNOTATIONS_DIR);
    fs::create_dir_all(&images_dir)?;
    fs::create_dir_all(&annotations_dir)?;

    let files: Vec<(PathBuf, PathBuf)> = collect_files(split_dir, SPLIT_IMG_FORMATS)
        .into_iter()
        .map(|file| (file, images_dir.clone()))
        .chain(
            collect_files(split_dir, &["xml"])
                .into_iter()
                .map(|file| (file, annotations_dir.clone())),
        )
        .collect();

    let mut transferred = 0;
    for (file, dir) in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        match transfer(&file, &dir.join(name), mode) {
            Ok(()) => transferred += 1,
            Err(e) => error!("Could not transfer {}: {}", file.display(), e),
        }
    }
    Ok(transferred)
}

/// Reorganize split folders into `output/{train,validation,test}/{images,Annotations}`
pub fn to_pascal_voc_layout(
    train: &Path,
    val: &Path,
    test: &Path,
    output: &Path,
    mode: TransferMode,
) -> Result<usize> {
    fs::create_dir_all(output)?;
    let mut total = 0;
    for (split_dir, name) in [train, val, test].into_iter().zip(SPLIT_NAMES) {
        if !split_dir.is_dir() {
            info!("Skipping missing split folder {}", split_dir.display());
            continue;
        }
        let count = layout_split(split_dir, &output.join(name), mode)?;
        info!("{}: {} files", name, count);
        total += count;
    }
    Ok(total)
}
