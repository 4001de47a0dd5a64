//! Normalisation of image file formats to `.jpg`

use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::raster::{open_rgb, save_image};
use crate::utils::{collect_files, create_progress_bar, unique_random_path};
use crate::voc::{annotation_path_for, read_annotation, write_annotation};

/// `<stem>.jpg` next to `path`, or a random name if that is taken
fn free_jpg_path(path: &Path) -> PathBuf {
    let candidate = path.with_extension("jpg");
    if !candidate.exists() {
        return candidate;
    }
    unique_random_path(path.parent().unwrap_or(Path::new("")), "jpg")
}

/// Point the XML of `old_image` at `new_image`.
/// The XML follows the image when the stem changed.
fn move_annotation(old_image: &Path, new_image: &Path) -> Result<bool> {
    let old_xml = annotation_path_for(old_image);
    if !old_xml.is_file() {
        return Ok(false);
    }
    let mut annotation = read_annotation(&old_xml)?;
    annotation.filename = new_image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    annotation.path = Some(new_image.to_string_lossy().into_owned());
    annotation.lowercase_labels();

    let new_xml = annotation_path_for(new_image);
    write_annotation(&new_xml, &annotation)?;
    if new_xml != old_xml {
        fs::remove_file(&old_xml)?;
    }
    Ok(true)
}

/// Re-encode a PNG as JPG, delete the PNG and update its annotation
pub fn convert_png_to_jpg(png_file: &Path) -> Result<PathBuf> {
    let image = open_rgb(png_file)?;
    let jpg_file = free_jpg_path(png_file);
    save_image(&image, &jpg_file)?;
    fs::remove_file(png_file)?;
    move_annotation(png_file, &jpg_file)?;
    Ok(jpg_file)
}

/// Rename a `.jpeg` file to `.jpg` and update its annotation
pub fn rename_jpeg_to_jpg(jpeg_file: &Path) -> Result<PathBuf> {
    let jpg_file = free_jpg_path(jpeg_file);
    fs::rename(jpeg_file, &jpg_file)?;
    move_annotation(jpeg_file, &jpg_file)?;
    Ok(jpg_file)
}

/// Convert every PNG and rename every JPEG below `root`.
/// Returns the number of PNG and JPEG files handled.
pub fn convert_images(root: &Path) -> Result<(usize, usize)> {
    let png_files = collect_files(root, &["png"]);
    let mut converted = 0;
    if png_files.is_empty() {
        info!("No PNG images found in folder.");
    } else {
        info!("Converting {} PNG images...", png_files.len());
        let pb = create_progress_bar(png_files.len() as u64, "PNG");
        for file in &png_files {
            match convert_png_to_jpg(file) {
                Ok(_) => converted += 1,
                Err(e) => error!("Error with file {}: {}", file.display(), e),
            }
            pb.inc(1);
        }
        pb.finish_with_message("PNG conversion complete");
    }

    let jpeg_files = collect_files(root, &["jpeg"]);
    let mut renamed = 0;
    if jpeg_files.is_empty() {
        info!("No JPEG images found in folder.");
    } else {
        info!("Renaming {} JPEG images...", jpeg_files.len());
        for file in &jpeg_files {
            match rename_jpeg_to_jpg(file) {
                Ok(_) => renamed += 1,
                Err(e) => error!("Error with file {}: {}", file.display(), e),
            }
        }
    }

    Ok((converted, renamed))
}
