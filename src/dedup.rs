//! Removal of perceptually identical images
//!
//! Images are compared by an 8x8 DCT hash against the median, so re-encoded
//! or slightly rescaled copies of the same picture end up in one group.

use image_hasher::{HashAlg, HasherConfig};
use log::{error, info};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::{collect_image_files, create_progress_bar};
use crate::voc::annotation_path_for;

/// Perceptual hash of an image file, encoded as base64
pub fn perceptual_hash(path: &Path) -> Result<String> {
    let hasher = HasherConfig::new()
        .hash_size(8, 8)
        .preproc_dct()
        .hash_alg(HashAlg::Median)
        .to_hasher();
    let image = image::open(path)?;
    Ok(hasher.hash_image(&image).to_base64())
}

/// Groups of images sharing a hash, each group in path order.
/// Only groups with more than one image are returned.
pub fn find_duplicates(images: &[PathBuf]) -> Vec<Vec<PathBuf>> {
    let pb = create_progress_bar(images.len() as u64, "Hashing");
    let hashes: Vec<(PathBuf, String)> = images
        .par_iter()
        .filter_map(|path| {
            let hash = perceptual_hash(path);
            pb.inc(1);
            match hash {
                Ok(hash) => Some((path.clone(), hash)),
                Err(e) => {
                    error!("Failed to hash {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();
    pb.finish_with_message("Hashing complete");

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for (path, hash) in hashes {
        let group = groups.entry(hash.clone()).or_default();
        if group.is_empty() {
            order.push(hash);
        }
        group.push(path);
    }

    order
        .into_iter()
        .filter_map(|hash| groups.remove(&hash))
        .filter(|group| group.len() > 1)
        .collect()
}

/// Image of a duplicate group that survives: the first annotated one, else the first one
pub fn select_keeper(group: &[PathBuf]) -> Option<&PathBuf> {
    group
        .iter()
        .find(|path| annotation_path_for(path).is_file())
        .or_else(|| group.first())
}

fn remove_with_annotation(image_file: &Path) -> Result<()> {
    let xml_file = annotation_path_for(image_file);
    if xml_file.is_file() {
        fs::remove_file(&xml_file)?;
    }
    fs::remove_file(image_file)?;
    info!("Deleting file: {}", image_file.display());
    Ok(())
}

/// Delete all but one image of every duplicate group below `root`.
/// Returns the number of deleted images.
pub fn remove_duplicates(root: &Path) -> Result<usize> {
    let images = collect_image_files(root);
    let mut deleted = 0;
    for group in find_duplicates(&images) {
        let keeper = select_keeper(&group).cloned();
        for image_file in group.iter().filter(|path| Some(*path) != keeper.as_ref()) {
            match remove_with_annotation(image_file) {
                Ok(()) => deleted += 1,
                Err(e) => error!("Failed to delete {}: {}", image_file.display(), e),
            }
        }
    }
    Ok(deleted)
}
