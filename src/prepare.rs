//! Preparation of a training set from a folder tree of labelled datasets
//!
//! Every leaf folder holding XML files is a class, named after the folder.
//! The pipeline samples images per requested class, copies them into a
//! temporary `all` folder, smart-resizes them there and finally copies them
//! into train/validation/test folders next to it.

use jwalk::WalkDir;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::TransferMode;
use crate::error::{Result, VocError};
use crate::smart_resize::smart_resize_all;
use crate::split::{distribute_images, transfer_file, SplitCounts, SplitDirs, SplitRatios};
use crate::utils::{collect_files, create_output_directory, folder_name};
use crate::voc::annotation_path_for;

pub const ALL_DIR: &str = "all";
pub const LABELMAP_FILE: &str = "labelmap.txt";

#[derive(Debug, Clone)]
pub struct PrepareConfig {
    pub dataset_root: PathBuf,
    pub labels: Vec<String>,
    pub limit_per_label: usize,
    pub temp_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
    pub ratios: SplitRatios,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub dirs: SplitDirs,
    pub counts: SplitCounts,
    pub labelmap: PathBuf,
}

// Hidden and system folders (`.git`, `@eaDir`) do not make a folder a non-leaf
fn is_hidden_or_system(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('@')
}

fn is_class_folder(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    let mut has_xml = false;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if !is_hidden_or_system(&entry.file_name().to_string_lossy()) {
                return false;
            }
        } else if path.extension().is_some_and(|ext| ext == "xml") {
            has_xml = true;
        }
    }
    has_xml
}

/// Leaf folders below `root` holding XML files, as (lowercase folder name, path)
pub fn available_classes(root: &Path) -> Vec<(String, PathBuf)> {
    let mut classes: Vec<(String, PathBuf)> = WalkDir::new(root)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.path())
        .filter(|dir| is_class_folder(dir))
        .map(|dir| (folder_name(&dir).to_lowercase(), dir))
        .collect();
    classes.sort();
    classes
}

/// Annotated `.jpg` images for each label, at most `limit_per_label` per label,
/// sampled at random when more are available
pub fn collect_images(
    labels: &[String],
    root: &Path,
    limit_per_label: usize,
    seed: u64,
) -> Vec<PathBuf> {
    let classes = available_classes(root);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut images = Vec::new();

    for label in labels {
        let label = label.to_lowercase();
        let mut candidates: Vec<PathBuf> = classes
            .iter()
            .filter(|(name, _)| *name == label)
            .flat_map(|(_, dir)| collect_files(dir, &["jpg"]))
            .filter(|image| annotation_path_for(image).is_file())
            .collect();
        if candidates.is_empty() {
            warn!("No annotated images found for label {}", label);
            continue;
        }
        candidates.shuffle(&mut rng);
        candidates.truncate(limit_per_label);
        info!("Label {}: {} images", label, candidates.len());
        images.extend(candidates);
    }
    images
}

/// Recreate `temp` with empty split folders below it
pub fn create_temp_folder_structure(
    temp: &Path,
    train: &str,
    val: &str,
    test: &str,
) -> Result<SplitDirs> {
    create_output_directory(temp)?;
    let dirs = SplitDirs::new(temp.join(train), temp.join(val), temp.join(test));
    dirs.create()?;
    Ok(dirs)
}

/// Collect, copy, smart resize and distribute the images of `config.labels`
pub fn prepare_dataset(config: &PrepareConfig) -> Result<PreparedDataset> {
    if config.labels.is_empty() {
        return Err(VocError::InvalidArgument(
            "at least one label is required".to_string(),
        ));
    }
    let labels: Vec<String> = config.labels.iter().map(|l| l.to_lowercase()).collect();

    let dirs = create_temp_folder_structure(&config.temp_dir, "train", "validation", "test")?;
    let all_dir = config.temp_dir.join(ALL_DIR);
    fs::create_dir_all(&all_dir)?;

    let images = collect_images(&labels, &config.dataset_root, config.limit_per_label, config.seed);
    info!("Copying {} images to {}", images.len(), all_dir.display());
    for image in &images {
        if let Err(e) = transfer_file(image, &all_dir, TransferMode::Copy) {
            warn!("Could not copy file {}: {}", image.display(), e);
        }
    }

    let stats = smart_resize_all(&all_dir, &all_dir, config.target_width, config.target_height)?;
    stats.print_summary();

    let resized = collect_files(&all_dir, &["jpg"]);
    let counts = distribute_images(resized, &dirs, config.ratios, TransferMode::Copy, config.seed)?;

    let labelmap = all_dir.join(LABELMAP_FILE);
    fs::write(&labelmap, labels.join("\n") + "\n")?;

    Ok(PreparedDataset {
        dirs,
        counts,
        labelmap,
    })
}
