//! YOLO text labels to Pascal VOC
//!
//! A label file `labels/foo.txt` describes the image `foo.<ext>` found either
//! one folder up or next to the label file. The XML is written next to the
//! image.

use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{ConversionStats, SPLIT_IMG_FORMATS};
use crate::utils::{collect_files, folder_name};
use crate::voc::{write_annotation, VocAnnotation, VocObject};

/// One parsed label line before conversion to pixels
#[derive(Debug, Clone, PartialEq)]
pub struct YoloLine {
    pub label: String,
    pub values: [f64; 4],
}

/// Split a label line into a label and four numbers.
///
/// Labels containing whitespace are joined with `_` until five tokens remain.
pub fn parse_line(line: &str) -> Option<YoloLine> {
    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    while tokens.len() > 5 {
        let second = tokens.remove(1);
        tokens[0] = format!("{}_{}", tokens[0], second);
    }
    if tokens.len() != 5 {
        return None;
    }
    let mut values = [0.0; 4];
    for (value, token) in values.iter_mut().zip(&tokens[1..]) {
        *value = token.parse().ok()?;
    }
    Some(YoloLine {
        label: tokens[0].to_lowercase(),
        values,
    })
}

/// Resolve the class name of a label.
/// Labels shorter than two characters are class indices or placeholders.
pub fn resolve_label(label: &str, folder: &str, classes: &[String]) -> String {
    if label.chars().count() >= 2 {
        return label.to_string();
    }
    label
        .parse::<usize>()
        .ok()
        .and_then(|index| classes.get(index))
        .map(|name| name.to_lowercase())
        .unwrap_or_else(|| folder.to_lowercase())
}

/// Pixel corners of a label. Values all `<= 1.0` are normalized centre/size,
/// anything else is taken as absolute corners.
pub fn to_corners(values: [f64; 4], image_width: f64, image_height: f64) -> [f64; 4] {
    let [a, b, c, d] = values;
    let corners = if values.iter().all(|v| *v <= 1.0) {
        let half_width = c * image_width / 2.0;
        let half_height = d * image_height / 2.0;
        let center_x = a * image_width;
        let center_y = b * image_height;
        [
            (center_x - half_width).trunc(),
            (center_y - half_height).trunc(),
            (center_x + half_width).trunc(),
            (center_y + half_height).trunc(),
        ]
    } else {
        [
            a.round_ties_even(),
            b.round_ties_even(),
            c.round_ties_even(),
            d.round_ties_even(),
        ]
    };
    // `-0.0` would be written as `-0`
    corners.map(|v| v + 0.0)
}

/// Find the image belonging to a label file
pub fn find_image_for_label(label_file: &Path) -> Option<PathBuf> {
    let stem = label_file.file_stem()?.to_string_lossy().into_owned();
    let label_dir = label_file.parent()?;
    let search_dirs = label_dir.parent().into_iter().chain(std::iter::once(label_dir));
    for dir in search_dirs {
        for ext in SPLIT_IMG_FORMATS {
            let candidate = dir.join(format!("{}.{}", stem, ext));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Convert one label file, returning the classes it used
pub fn convert_label_file(label_file: &Path, classes: &[String]) -> Result<Option<Vec<String>>> {
    let Some(image_path) = find_image_for_label(label_file) else {
        warn!("No image found for label file {}", label_file.display());
        return Ok(None);
    };
    let (image_width, image_height) = image::image_dimensions(&image_path)?;
    let image_dir = image_path.parent().unwrap_or(Path::new(""));
    let folder = folder_name(image_dir);
    let image_file_name = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut annotation = VocAnnotation::new(
        "XML",
        &image_file_name,
        &image_path.to_string_lossy(),
        image_width,
        image_height,
    );

    let content = fs::read_to_string(label_file)?;
    for line in content.lines() {
        let Some(parsed) = parse_line(line) else {
            if !line.trim().is_empty() {
                warn!("Ignoring malformed line in {}: {:?}", label_file.display(), line);
            }
            continue;
        };
        let name = resolve_label(&parsed.label, &folder, classes);
        let [xmin, ymin, xmax, ymax] =
            to_corners(parsed.values, f64::from(image_width), f64::from(image_height));
        annotation.object.push(VocObject::new(&name, xmin, ymin, xmax, ymax));
    }

    write_annotation(&image_path.with_extension("xml"), &annotation)?;
    Ok(Some(annotation.classes()))
}

/// Convert every `*.txt` label file below `input`.
/// Returns the run counters and the classes in order of first appearance.
pub fn convert_yolo_dir(input: &Path, classes: &[String]) -> Result<(ConversionStats, Vec<String>)> {
    let label_files = collect_files(input, &["txt"]);
    if label_files.is_empty() {
        warn!("No TXT files found in folder {}", input.display());
    } else {
        info!("Converting {} files...", label_files.len());
    }

    let mut stats = ConversionStats::new();
    let mut found_classes: Vec<String> = Vec::new();
    for label_file in &label_files {
        match convert_label_file(label_file, classes) {
            Ok(Some(file_classes)) => {
                stats.files_written += 1;
                for class in file_classes {
                    if !found_classes.contains(&class) {
                        found_classes.push(class);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to convert {}: {}", label_file.display(), e);
                stats.errors += 1;
            }
        }
    }
    Ok((stats, found_classes))
}
