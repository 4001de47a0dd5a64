//! COCO format data structures and conversion to Pascal VOC
//!
//! Only the parts of a COCO file needed for bounding boxes are modelled.
//! Unknown fields are ignored, so full COCO exports load as well.

use glob::glob;
use log::{error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Result, VocError};
use crate::types::ConversionStats;
use crate::utils::folder_name;
use crate::voc::{write_annotation, VocAnnotation, VocObject};

/// COCO category information
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub supercategory: Option<String>,
}

/// COCO image information
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// COCO annotation information
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    pub image_id: u64,
    pub category_id: u64,
    // [x, y, width, height]
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

/// Complete COCO dataset structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CocoFile {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl CocoFile {
    pub fn read(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|source| VocError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn category_names(&self) -> HashMap<u64, &str> {
        self.categories
            .iter()
            .map(|category| (category.id, category.name.as_str()))
            .collect()
    }

    fn annotations_by_image(&self) -> HashMap<u64, Vec<&Annotation>> {
        let mut grouped: HashMap<u64, Vec<&Annotation>> = HashMap::new();
        for annotation in &self.annotations {
            grouped.entry(annotation.image_id).or_default().push(annotation);
        }
        grouped
    }
}

// Integer cast of a coordinate; `-0.0` becomes `0.0`
fn truncate(value: f64) -> f64 {
    value.trunc() + 0.0
}

/// Convert a COCO `[x, y, w, h]` box into a VOC object, truncating like an integer cast
fn to_voc_object(name: &str, bbox: &[f64]) -> Option<VocObject> {
    match *bbox {
        [x, y, width, height] => Some(VocObject::new(
            name,
            truncate(x),
            truncate(y),
            truncate(x + width),
            truncate(y + height),
        )),
        _ => None,
    }
}

/// Write one VOC XML per image of `coco` that has at least one box
pub fn coco_to_voc(coco: &CocoFile, output_dir: &Path) -> Result<ConversionStats> {
    fs::create_dir_all(output_dir)?;
    let categories = coco.category_names();
    let annotations = coco.annotations_by_image();
    let folder = folder_name(output_dir);
    let mut stats = ConversionStats::new();

    info!("Found {} images in this annotation file.", coco.images.len());

    for image in &coco.images {
        let image_path = output_dir.join(&image.file_name);
        let mut annotation = VocAnnotation::new(
            &folder,
            &image.file_name,
            &image_path.to_string_lossy(),
            image.width,
            image.height,
        );

        for coco_annotation in annotations.get(&image.id).into_iter().flatten() {
            let Some(bbox) = &coco_annotation.bbox else {
                continue;
            };
            let object = categories
                .get(&coco_annotation.category_id)
                .and_then(|name| to_voc_object(name, bbox));
            match object {
                Some(object) => annotation.object.push(object),
                None => {
                    warn!(
                        "Skipping annotation of {} with category {} and bbox {:?}",
                        image.file_name, coco_annotation.category_id, bbox
                    );
                    stats.errors += 1;
                }
            }
        }

        if annotation.object.is_empty() {
            continue;
        }
        let stem = Path::new(&image.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        write_annotation(&output_dir.join(format!("{}.xml", stem)), &annotation)?;
        stats.files_written += 1;
    }

    Ok(stats)
}

/// Read a COCO JSON file and convert it into `output_dir`
pub fn convert_coco_file(json_file: &Path, output_dir: &Path) -> Result<ConversionStats> {
    info!("Starting conversion of {}", json_file.display());
    let coco = CocoFile::read(json_file)?;
    let stats = coco_to_voc(&coco, output_dir)?;
    info!(
        "Conversion of {} completed. {} images converted, {} errors occurred.",
        json_file.display(),
        stats.files_written,
        stats.errors
    );
    Ok(stats)
}

/// Convert every `*.json` below `input` into `output_root/<json stem>/`
pub fn convert_coco_dir(input: &Path, output_root: &Path) -> Result<ConversionStats> {
    let pattern = format!("{}/**/*.json", input.display());
    let json_files: Vec<PathBuf> = glob(&pattern)
        .map_err(|e| VocError::InvalidArgument(format!("invalid glob pattern {}: {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .collect();

    if json_files.is_empty() {
        warn!("No JSON files found in folder {}", input.display());
    }

    let mut total = ConversionStats::new();
    for json_file in &json_files {
        let stem = json_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match convert_coco_file(json_file, &output_root.join(stem)) {
            Ok(stats) => total = total.merge(stats),
            Err(e) => {
                error!("Failed to convert {}: {}", json_file.display(), e);
                total.errors += 1;
            }
        }
    }
    Ok(total)
}
