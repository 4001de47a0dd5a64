use clap::{Args as ClapArgs, Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::download::DEFAULT_LIMIT;
use crate::resize::DEFAULT_TARGET_SIZE;
use crate::smart_resize::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};
use crate::split::{DEFAULT_TRAIN_RATIO, DEFAULT_VAL_RATIO};

/// Dataset folder shared by all tools
#[derive(ClapArgs, Debug, Clone)]
pub struct DatasetPath {
    /// Path to the dataset (images and annotations)
    #[arg(short = 'p', long = "path", default_value = ".")]
    pub path: PathBuf,
}

/// Capitalize the names of all folders below the dataset path.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct CapitalizeArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

/// Give every image a random unique name and update its XML annotation.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct RenameArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

/// Convert PNG images to JPG and rename .jpeg files to .jpg.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ConvertImagesArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

/// Convert COCO JSON annotation files to Pascal VOC XML files.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Coco2VocArgs {
    /// Folder searched recursively for COCO JSON files
    #[arg(short = 'p', long = "path", default_value = ".")]
    pub path: PathBuf,

    /// Output folder, one sub-folder per JSON file is created
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,
}

/// Convert YOLO text labels to Pascal VOC XML files.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Yolo2VocArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,

    /// Class names used for numeric labels, in class index order
    #[arg(short = 'c', long = "classes", use_value_delimiter = true)]
    pub classes: Vec<String>,
}

/// Edit one class label in all XML annotations.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct LabelArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,

    /// The class label
    #[arg(short = 'l', long = "label")]
    pub label: String,
}

/// Lowercase class names and list all classes of the dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct CheckClassesArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

/// Move images with a single class into a sub-folder named after the class.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct GroupArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

/// Delete perceptually identical images and their annotations.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct DedupArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,
}

// How the plain resize treats the aspect ratio
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum ResizeMode {
    /// Stretch to exactly the target size
    Size,
    /// Keep the aspect ratio, no side smaller than the target
    Scale,
    /// Keep the aspect ratio, no side larger than the target
    Target,
    /// Keep the aspect ratio and crop the overshooting side
    Crop,
}

/// Resize images and their annotations.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ResizeArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,

    /// Output path, the input is overwritten when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// The new image width
    #[arg(short = 'x', long = "new_x", default_value_t = DEFAULT_TARGET_SIZE, value_parser = validate_dimension)]
    pub new_x: u32,

    /// The new image height
    #[arg(short = 'y', long = "new_y", default_value_t = DEFAULT_TARGET_SIZE, value_parser = validate_dimension)]
    pub new_y: u32,

    /// Resize mode
    #[arg(short = 'm', long = "mode", value_enum, default_value = "size")]
    pub mode: ResizeMode,
}

/// Resize images around their bounding boxes.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct SmartResizeArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,

    /// Output path of the new images and annotations, the input is overwritten when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// The new image width
    #[arg(short = 'x', long = "new_x", default_value_t = DEFAULT_TARGET_WIDTH, value_parser = validate_dimension)]
    pub new_x: u32,

    /// The new image height
    #[arg(short = 'y', long = "new_y", default_value_t = DEFAULT_TARGET_HEIGHT, value_parser = validate_dimension)]
    pub new_y: u32,
}

// Whether files are copied or moved between folders
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum TransferMode {
    Move,
    Copy,
}

/// Randomly split a folder of annotated images into train, validation and test folders.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct SplitArgs {
    /// Folder holding all images
    #[arg(short = 'p', long = "path", default_value = "images/all")]
    pub path: PathBuf,

    #[arg(long = "train_dir", default_value = "images/train")]
    pub train_dir: PathBuf,

    #[arg(long = "val_dir", default_value = "images/validation")]
    pub val_dir: PathBuf,

    #[arg(long = "test_dir", default_value = "images/test")]
    pub test_dir: PathBuf,

    /// Proportion of the dataset used for training
    #[arg(long = "train_size", default_value_t = DEFAULT_TRAIN_RATIO, value_parser = validate_size)]
    pub train_size: f64,

    /// Proportion of the dataset used for validation
    #[arg(long = "val_size", default_value_t = DEFAULT_VAL_RATIO, value_parser = validate_size)]
    pub val_size: f64,

    /// Seed for random shuffling
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Move or copy the files
    #[arg(short = 'm', long = "mode", value_enum, default_value = "move")]
    pub mode: TransferMode,
}

/// Reorganize split folders into the Pascal VOC layout (images/ + Annotations/).
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct LayoutArgs {
    #[arg(long = "train_dir", default_value = "train")]
    pub train_dir: PathBuf,

    #[arg(long = "val_dir", default_value = "validation")]
    pub val_dir: PathBuf,

    #[arg(long = "test_dir", default_value = "test")]
    pub test_dir: PathBuf,

    /// Output folder of the layout
    #[arg(short = 'o', long = "output", default_value = "voc")]
    pub output: PathBuf,

    /// Move or copy the files
    #[arg(short = 'm', long = "mode", value_enum, default_value = "move")]
    pub mode: TransferMode,
}

/// Collect, smart resize and split the images of some labels for training.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub dataset: DatasetPath,

    /// Labels to include
    #[arg(short = 'l', long = "labels", use_value_delimiter = true, required = true)]
    pub labels: Vec<String>,

    /// Maximum number of images per label
    #[arg(long = "limit", default_value_t = 1000)]
    pub limit_per_label: usize,

    /// Temporary folder, recreated on every run
    #[arg(short = 't', long = "temp", default_value = "temp")]
    pub temp: PathBuf,

    #[arg(short = 'x', long = "new_x", default_value_t = DEFAULT_TARGET_SIZE, value_parser = validate_dimension)]
    pub new_x: u32,

    #[arg(short = 'y', long = "new_y", default_value_t = DEFAULT_TARGET_SIZE, value_parser = validate_dimension)]
    pub new_y: u32,

    #[arg(long = "train_size", default_value_t = DEFAULT_TRAIN_RATIO, value_parser = validate_size)]
    pub train_size: f64,

    #[arg(long = "val_size", default_value_t = DEFAULT_VAL_RATIO, value_parser = validate_size)]
    pub val_size: f64,

    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,
}

/// Search and download images.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct DownloadArgs {
    /// The search query
    #[arg(short = 'q', long = "query", required_unless_present = "urls_file")]
    pub query: Option<String>,

    /// File with one image URL per line, used instead of a search
    #[arg(long = "urls_file", conflicts_with = "query")]
    pub urls_file: Option<PathBuf>,

    /// Path where the images are saved
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,

    /// Maximum number of images to download
    #[arg(short = 'l', long = "limit", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Download in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,
}

// Validate that the size is between 0.0 and 1.0
pub fn validate_size(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0".to_string()),
    }
}

// Validate that an image dimension is a positive pixel count
pub fn validate_dimension(s: &str) -> Result<u32, String> {
    match u32::from_str(s) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("dimension must be a positive number of pixels".to_string()),
    }
}
