//! Random train/validation/test split of an annotated image folder

use log::{error, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::TransferMode;
use crate::error::Result;
use crate::utils::{collect_files, create_progress_bar, folder_name};
use crate::voc::annotation_path_for;

pub const DEFAULT_TRAIN_RATIO: f64 = 0.88;
pub const DEFAULT_VAL_RATIO: f64 = 0.10;

/// Share of images for training and validation; the test split takes the rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: DEFAULT_TRAIN_RATIO,
            val: DEFAULT_VAL_RATIO,
        }
    }
}

/// Number of images per split as (train, val, test)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

/// Target folders of a split
#[derive(Debug, Clone)]
pub struct SplitDirs {
    pub train: PathBuf,
    pub val: PathBuf,
    pub test: PathBuf,
}

impl SplitDirs {
    pub fn new(train: impl Into<PathBuf>, val: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        Self {
            train: train.into(),
            val: val.into(),
            test: test.into(),
        }
    }

    pub fn create(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.train)?;
        fs::create_dir_all(&self.val)?;
        fs::create_dir_all(&self.test)
    }
}

pub fn split_counts(total: usize, ratios: SplitRatios) -> SplitCounts {
    let train = ((total as f64 * ratios.train) as usize).min(total);
    let val = ((total as f64 * ratios.val) as usize).min(total - train);
    SplitCounts {
        train,
        val,
        test: total - train - val,
    }
}

/// Image files below `dir` with one of `extensions` (any case), sorted
pub fn collect_image_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    collect_files(dir, extensions)
}

/// Copy or move an image and its XML into `target_dir` as `<parent folder>_<file name>`,
/// made safe for use as a file name.
/// The `<filename>` element of the XML is rewritten to the new name.
pub fn transfer_file(image_file: &Path, target_dir: &Path, mode: TransferMode) -> Result<PathBuf> {
    let parent = image_file.parent().unwrap_or(Path::new(""));
    let prefix = format!("{}_", folder_name(parent));
    let file_name = image_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_file_name = sanitize_filename::sanitize(format!("{}{}", prefix, file_name));
    let new_image = target_dir.join(&new_file_name);

    match mode {
        TransferMode::Copy => {
            fs::copy(image_file, &new_image)?;
        }
        TransferMode::Move => move_file(image_file, &new_image)?,
    }

    let xml_file = annotation_path_for(image_file);
    if xml_file.is_file() {
        let content = fs::read_to_string(&xml_file)?.replace(
            &format!("<filename>{}</filename>", file_name),
            &format!("<filename>{}</filename>", new_file_name),
        );
        fs::write(annotation_path_for(&new_image), content)?;
        if mode == TransferMode::Move {
            fs::remove_file(&xml_file)?;
        }
    }
    Ok(new_image)
}

// Rename fails across file systems, fall back to copy and delete
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// Shuffle `images` with `seed` and distribute them over the split folders
pub fn distribute_images(
    mut images: Vec<PathBuf>,
    dirs: &SplitDirs,
    ratios: SplitRatios,
    mode: TransferMode,
    seed: u64,
) -> Result<SplitCounts> {
    dirs.create()?;
    let mut rng = StdRng::seed_from_u64(seed);
    images.shuffle(&mut rng);

    let counts = split_counts(images.len(), ratios);
    info!(
        "Found a total of {} images. ({} training, {} validation, {} test)",
        images.len(),
        counts.train,
        counts.val,
        counts.test
    );

    let verb = match mode {
        TransferMode::Move => "Moving",
        TransferMode::Copy => "Copying",
    };
    let (train, rest) = images.split_at(counts.train);
    let (val, test) = rest.split_at(counts.val);
    let mut transferred = SplitCounts::default();
    for (files, target_dir, counter) in [
        (train, &dirs.train, &mut transferred.train),
        (val, &dirs.val, &mut transferred.val),
        (test, &dirs.test, &mut transferred.test),
    ] {
        info!(
            "{} {} images with annotation data to {} ...",
            verb,
            files.len(),
            target_dir.display()
        );
        let pb = create_progress_bar(files.len() as u64, folder_name(target_dir).as_str());
        for file in files {
            match transfer_file(file, target_dir, mode) {
                Ok(_) => *counter += 1,
                Err(e) => error!(
                    "Could not transfer file {} to {}: {}",
                    file.display(),
                    target_dir.display(),
                    e
                ),
            }
            pb.inc(1);
        }
        pb.finish();
    }
    Ok(transferred)
}
