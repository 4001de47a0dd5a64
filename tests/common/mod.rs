#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

use voc_tools::voc::{read_annotation, write_annotation, VocAnnotation, VocObject};

/// Gray image with a black rectangle for every box, so images with
/// different boxes differ in content
pub fn write_image(path: &Path, width: u32, height: u32, boxes: &[(f64, f64, f64, f64)]) {
    let mut image = RgbImage::from_pixel(width, height, Rgb([128, 128, 128]));
    for &(xmin, ymin, xmax, ymax) in boxes {
        for y in (ymin as u32)..(ymax as u32).min(height) {
            for x in (xmin as u32)..(xmax as u32).min(width) {
                image.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

/// Write `<stem>.<ext>` plus its XML with one object per `(name, box)`
pub fn write_annotated_image(
    dir: &Path,
    file_name: &str,
    width: u32,
    height: u32,
    objects: &[(&str, (f64, f64, f64, f64))],
) -> PathBuf {
    let image_path = dir.join(file_name);
    let boxes: Vec<_> = objects.iter().map(|(_, b)| *b).collect();
    write_image(&image_path, width, height, &boxes);

    let mut annotation = VocAnnotation::new(
        &dir.file_name().unwrap().to_string_lossy(),
        file_name,
        &image_path.to_string_lossy(),
        width,
        height,
    );
    for (name, (xmin, ymin, xmax, ymax)) in objects {
        annotation
            .object
            .push(VocObject::new(name, *xmin, *ymin, *xmax, *ymax));
    }
    write_annotation(&image_path.with_extension("xml"), &annotation).unwrap();
    image_path
}

pub fn read_xml(path: &Path) -> VocAnnotation {
    read_annotation(path).unwrap()
}

pub fn object_boxes(annotation: &VocAnnotation) -> Vec<(String, [f64; 4])> {
    annotation
        .object
        .iter()
        .map(|o| {
            (
                o.name.clone(),
                [o.bndbox.xmin, o.bndbox.ymin, o.bndbox.xmax, o.bndbox.ymax],
            )
        })
        .collect()
}
