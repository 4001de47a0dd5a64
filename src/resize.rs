//! Plain resizing of annotated images
//!
//! Boxes are scaled with the image; objects pushed completely outside the
//! output by a crop are dropped from the annotation.

use image::imageops;
use image::RgbImage;
use log::error;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bbox::clamp;
use crate::config::ResizeMode;
use crate::error::{Result, VocError};
use crate::raster::{open_rgb, save_image, scale_image};
use crate::types::ProcessingStats;
use crate::utils::{
    collect_image_files, create_progress_bar, is_nested_output, mirror_path, split_file_name,
};
use crate::voc::{annotation_path_for, read_annotation, write_annotation, VocAnnotation};

pub const DEFAULT_TARGET_SIZE: u32 = 320;

/// Geometry of one output file
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizePlan {
    width: u32,
    height: u32,
    scale_x: f64,
    scale_y: f64,
    offset_x: i64,
    offset_y: i64,
}

/// Output geometry for an image of `image_width` x `image_height`.
/// Every plan is written to its own file, the first one with the `_1` suffix
/// when two are returned.
fn plan_resize(
    image_width: f64,
    image_height: f64,
    target_width: f64,
    target_height: f64,
    mode: ResizeMode,
) -> Vec<ResizePlan> {
    let scale_x = target_width / image_width;
    let scale_y = target_height / image_height;
    let plan = |width: f64, height: f64, scale_x: f64, scale_y: f64, offset_x, offset_y| {
        ResizePlan {
            width: width as u32,
            height: height as u32,
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    };

    match mode {
        ResizeMode::Size => vec![plan(target_width, target_height, scale_x, scale_y, 0, 0)],
        ResizeMode::Scale => {
            // No side below the target
            let scale = scale_x.max(scale_y);
            vec![plan(
                if scale_y > scale_x { scale * image_width } else { target_width },
                if scale_y > scale_x { target_height } else { scale * image_height },
                scale,
                scale,
                0,
                0,
            )]
        }
        ResizeMode::Target => {
            // No side above the target
            let scale = scale_x.min(scale_y);
            vec![plan(
                if scale_y < scale_x { scale * image_width } else { target_width },
                if scale_y < scale_x { target_height } else { scale * image_height },
                scale,
                scale,
                0,
                0,
            )]
        }
        ResizeMode::Crop => {
            if scale_y > scale_x {
                let offset_x = (scale_y * image_width - target_width) as i64;
                vec![
                    plan(target_width, target_height, scale_y, scale_y, offset_x, 0),
                    plan(target_width, target_height, scale_y, scale_y, 0, 0),
                ]
            } else if scale_x > scale_y {
                let offset_y = (scale_x * image_height - target_height) as i64;
                vec![
                    plan(target_width, target_height, scale_x, scale_x, 0, offset_y),
                    plan(target_width, target_height, scale_x, scale_x, 0, 0),
                ]
            } else {
                vec![plan(target_width, target_height, scale_x, scale_y, 0, 0)]
            }
        }
    }
}

/// Resize one annotated image into `output_dir`, returning the number of files written
pub fn resize(
    image_file: &Path,
    output_dir: &Path,
    target_width: u32,
    target_height: u32,
    mode: ResizeMode,
) -> Result<usize> {
    let (_, stem, extension) = split_file_name(image_file);
    let xml_path = annotation_path_for(image_file);
    if !xml_path.is_file() {
        return Err(VocError::MissingAnnotation(image_file.to_path_buf()));
    }
    let annotation = read_annotation(&xml_path)?;
    let image = open_rgb(image_file)?;

    let plans = plan_resize(
        f64::from(image.width()),
        f64::from(image.height()),
        f64::from(target_width),
        f64::from(target_height),
        mode,
    );
    let with_suffix = plans.len() > 1;
    for (index, plan) in plans.iter().enumerate() {
        let name = if with_suffix && index == 0 {
            format!("{}_1", stem)
        } else {
            stem.clone()
        };
        resize_and_save(&image, &annotation, &name, &extension, plan, output_dir)?;
    }
    Ok(plans.len())
}

fn resize_and_save(
    image: &RgbImage,
    source_annotation: &VocAnnotation,
    name: &str,
    extension: &str,
    plan: &ResizePlan,
    output_dir: &Path,
) -> Result<()> {
    let mut resized = scale_image(image, plan.scale_x, plan.scale_y, &mut []);
    if resized.width() != plan.width
        || resized.height() != plan.height
        || plan.offset_x > 0
        || plan.offset_y > 0
    {
        resized = imageops::crop_imm(
            &resized,
            plan.offset_x.max(0) as u32,
            plan.offset_y.max(0) as u32,
            plan.width,
            plan.height,
        )
        .to_image();
    }

    let image_file_name = format!("{}.{}", name, extension);
    let image_path = output_dir.join(&image_file_name);

    let mut annotation = source_annotation.clone();
    annotation.filename = Some(image_file_name);
    annotation.path = Some(image_path.to_string_lossy().into_owned());
    annotation.set_size(plan.width, plan.height);
    annotation.lowercase_labels();

    let new_width = i64::from(plan.width);
    let new_height = i64::from(plan.height);
    let transform = |value: f64, scale: f64, offset: i64, limit: i64| -> i64 {
        clamp((value * scale).round_ties_even() as i64 - offset, 0, limit)
    };
    annotation.object.retain_mut(|object| {
        let b = &mut object.bndbox;
        let xmin = transform(b.xmin, plan.scale_x, plan.offset_x, new_width);
        let ymin = transform(b.ymin, plan.scale_y, plan.offset_y, new_height);
        let xmax = transform(b.xmax, plan.scale_x, plan.offset_x, new_width);
        let ymax = transform(b.ymax, plan.scale_y, plan.offset_y, new_height);
        if xmin == new_width || xmax == 0 || ymin == new_height || ymax == 0 {
            return false;
        }
        b.xmin = xmin as f64;
        b.ymin = ymin as f64;
        b.xmax = xmax as f64;
        b.ymax = ymax as f64;
        true
    });

    save_image(&resized, &image_path)?;
    write_annotation(&output_dir.join(format!("{}.xml", name)), &annotation)?;
    Ok(())
}

/// Resize every image below `input_root` into the mirrored folder below `output_root`
pub fn resize_all(
    input_root: &Path,
    output_root: &Path,
    target_width: u32,
    target_height: u32,
    mode: ResizeMode,
) -> Result<ProcessingStats> {
    fs::create_dir_all(output_root)?;
    let images: Vec<PathBuf> = collect_image_files(input_root)
        .into_iter()
        .filter(|path| !is_nested_output(path, input_root, output_root))
        .collect();

    let pb = create_progress_bar(images.len() as u64, "Resize");
    let stats = images
        .par_iter()
        .map(|image_path| {
            let mut stats = ProcessingStats::new();
            stats.increment_total();
            let parent = image_path.parent().unwrap_or(input_root);
            let output_dir = mirror_path(parent, input_root, output_root);
            let result = fs::create_dir_all(&output_dir)
                .map_err(VocError::from)
                .and_then(|_| resize(image_path, &output_dir, target_width, target_height, mode));
            match result {
                Ok(count) => {
                    stats.increment_successful();
                    stats.add_outputs(count);
                }
                Err(VocError::MissingAnnotation(path)) => {
                    error!("No annotation file found for {}", path.display());
                    stats.increment_skipped_missing_annotation();
                }
                Err(e) => {
                    error!("Failed to resize {}: {}", image_path.display(), e);
                    stats.increment_failed();
                }
            }
            pb.inc(1);
            stats
        })
        .reduce(ProcessingStats::new, ProcessingStats::merge);
    pb.finish_with_message("Resize complete");

    Ok(stats)
}
