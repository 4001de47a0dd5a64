//! Bounding-box aware resizing
//!
//! Instead of stretching a source image to the target size, the annotated
//! regions drive the transform: the image is scaled so the annotated region
//! keeps its aspect ratio, then cropped around the boxes. One source image may
//! produce several derived image/annotation pairs (corner crops, a box-fit
//! view, and zoomed views of small objects). Derived files keep the source
//! stem, later ones are suffixed `_1`, `_2`, ...

use image::RgbImage;
use log::{error, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bbox::{BoundingBox, DEFAULT_MIN_SIZE};
use crate::error::{Result, VocError};
use crate::raster::{
    crop_image, crop_image_to_center, open_rgb, save_image, scale_image, scale_image_to_center,
};
use crate::types::ProcessingStats;
use crate::utils::{
    collect_image_files, create_progress_bar, is_nested_output, mirror_path, split_file_name,
};
use crate::voc::{annotation_path_for, read_annotation, VocAnnotation};

pub const DEFAULT_TARGET_WIDTH: u32 = 480;
pub const DEFAULT_TARGET_HEIGHT: u32 = 640;

// Minimum box size of corner crops, as a share of the smaller target side
const SINGLE_OBJECT_CROP_MIN_PERCENT: f64 = 0.25;
const MULTI_OBJECT_CROP_MIN_PERCENT: f64 = 0.05;

// Zoomed views are only produced for boxes covering less than this share of the target
const ZOOM_MAX_PERCENT: f64 = 0.5;
const ZOOM_PADDING: f64 = 20.0;
const ZOOM_MAX_FACTOR: f64 = 4.0;

/// Result of resizing one source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartResizeOutcome {
    /// Number of derived image/annotation pairs written
    Written(usize),
    MissingAnnotation,
    NoObjects,
}

/// Writes derived image/annotation pairs for one source image
struct DerivedWriter<'a> {
    template: &'a VocAnnotation,
    stem: &'a str,
    extension: &'a str,
    output_dir: &'a Path,
    target_width: f64,
    target_height: f64,
    counter: usize,
}

impl DerivedWriter<'_> {
    fn target_width_px(&self) -> i64 {
        self.target_width as i64
    }

    fn target_height_px(&self) -> i64 {
        self.target_height as i64
    }

    /// Save the image with every box that is still visible and at least
    /// `min_size` pixels wide and high. Nothing is written when no box survives.
    fn save_as_copy(
        &mut self,
        image: &RgbImage,
        boxes: &[BoundingBox],
        min_size: f64,
    ) -> Result<bool> {
        let width = image.width();
        let height = image.height();
        let kept: Vec<BoundingBox> = boxes
            .iter()
            .cloned()
            .map(|mut bbox| {
                bbox.clamp(f64::from(width), f64::from(height));
                bbox
            })
            .filter(|bbox| !bbox.is_empty(min_size))
            .collect();
        if kept.is_empty() {
            return Ok(false);
        }

        let name = if self.counter > 0 {
            format!("{}_{}", self.stem, self.counter)
        } else {
            self.stem.to_string()
        };
        let image_file_name = format!("{}.{}", name, self.extension);
        let image_path = self.output_dir.join(&image_file_name);
        save_image(image, &image_path)?;

        let mut annotation = self.template.clone();
        annotation.filename = Some(image_file_name);
        annotation.path = Some(image_path.to_string_lossy().into_owned());
        annotation.set_size(width, height);
        annotation.object = kept.iter().map(BoundingBox::to_object).collect();
        crate::voc::write_annotation(
            &self.output_dir.join(format!("{}.xml", name)),
            &annotation,
        )?;

        self.counter += 1;
        Ok(true)
    }

    /// Save the top-left and the bottom-right target-sized windows of `image`
    fn save_corner_crops(
        &mut self,
        image: &RgbImage,
        boxes: &[BoundingBox],
        min_size_percent: f64,
    ) -> Result<()> {
        let min_size = (self.target_width * min_size_percent)
            .min(self.target_height * min_size_percent)
            .max(DEFAULT_MIN_SIZE);
        let (target_w, target_h) = (self.target_width_px(), self.target_height_px());

        let mut left_top_boxes = boxes.to_vec();
        let left_top = crop_image(image, 0, 0, target_w, target_h, &mut left_top_boxes);
        self.save_as_copy(&left_top, &left_top_boxes, min_size)?;

        let offset_x = (f64::from(image.width()) - self.target_width) as i64;
        let offset_y = (f64::from(image.height()) - self.target_height) as i64;
        let mut right_bottom_boxes = boxes.to_vec();
        let right_bottom = crop_image(
            image,
            offset_x,
            offset_y,
            target_w,
            target_h,
            &mut right_bottom_boxes,
        );
        self.save_as_copy(&right_bottom, &right_bottom_boxes, min_size)?;
        Ok(())
    }

    /// Zoom the unscaled source so the first box fills the target, then crop around it
    fn save_bounding_box(&mut self, image: &RgbImage, boxes: &[BoundingBox]) -> Result<()> {
        let mut boxes = boxes.to_vec();
        let Some(bbox) = boxes.first() else {
            return Ok(());
        };
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            warn!("Skipping box-fit view of degenerate box {:?}", bbox);
            return Ok(());
        }
        let scale = (self.target_width / bbox.width()).min(self.target_height / bbox.height());
        let (center_x, center_y) = (bbox.center_x(), bbox.center_y());

        let zoomed = scale_image_to_center(image, scale, scale, center_x, center_y, &mut boxes);
        let cropped = crop_image_to_center(
            &zoomed,
            center_x,
            center_y,
            self.target_width_px(),
            self.target_height_px(),
            &mut boxes,
            true,
        );
        self.save_as_copy(&cropped, &boxes, DEFAULT_MIN_SIZE)?;
        Ok(())
    }

    /// One zoomed view per small box that does not touch the source border
    fn save_zoomed_bounding_boxes(
        &mut self,
        image: &RgbImage,
        scale: f64,
        boxes: &[BoundingBox],
    ) -> Result<()> {
        let image_width = f64::from(image.width());
        let image_height = f64::from(image.height());

        for index in 0..boxes.len() {
            let mut boxes_copy = boxes.to_vec();
            let bbox = &boxes_copy[index];
            let coverage = bbox
                .percent_w(self.target_width, 0.0)
                .max(bbox.percent_h(self.target_height, 0.0));
            if coverage >= ZOOM_MAX_PERCENT || bbox.is_touching_border(image_width, image_height)
            {
                continue;
            }

            let (center_x, center_y) = (bbox.center_x(), bbox.center_y());
            let cropped = crop_image_to_center(
                image,
                center_x,
                center_y,
                self.target_width_px(),
                self.target_height_px(),
                &mut boxes_copy,
                false,
            );

            // The box now lives in the coordinates of the cropped window
            let bbox = &boxes_copy[index];
            let coverage = bbox
                .percent_w(self.target_width, ZOOM_PADDING)
                .max(bbox.percent_h(self.target_height, ZOOM_PADDING));
            let rescale = (1.0 / coverage).min(ZOOM_MAX_FACTOR * scale);
            let (center_x, center_y) = (bbox.center_x(), bbox.center_y());

            let zoomed = scale_image_to_center(
                &cropped,
                rescale,
                rescale,
                center_x,
                center_y,
                &mut boxes_copy,
            );
            self.save_as_copy(&zoomed, &boxes_copy, DEFAULT_MIN_SIZE)?;
        }
        Ok(())
    }
}

/// Resize one annotated image to `target_width` x `target_height`, writing the
/// derived pairs into `output_dir`
pub fn smart_resize(
    image_file: &Path,
    target_width: u32,
    target_height: u32,
    output_dir: &Path,
) -> Result<SmartResizeOutcome> {
    let (base_dir, stem, extension) = split_file_name(image_file);
    let xml_path = annotation_path_for(image_file);
    if !xml_path.is_file() {
        warn!(
            "No XML file was found for {}.{} in {}. Image won't be resized!",
            stem,
            extension,
            base_dir.display()
        );
        return Ok(SmartResizeOutcome::MissingAnnotation);
    }

    let annotation = read_annotation(&xml_path)?;
    let boxes: Vec<BoundingBox> = annotation
        .object
        .iter()
        .map(BoundingBox::from_object)
        .collect();
    if boxes.is_empty() {
        warn!(
            "No bounding boxes were found in {}.xml in {}. Image won't be resized!",
            stem,
            base_dir.display()
        );
        return Ok(SmartResizeOutcome::NoObjects);
    }

    let image = open_rgb(image_file)?;
    let target_w = f64::from(target_width);
    let target_h = f64::from(target_height);
    let scale_x = target_w / f64::from(image.width());
    let scale_y = target_h / f64::from(image.height());

    let mut writer = DerivedWriter {
        template: &annotation,
        stem: &stem,
        extension: &extension,
        output_dir,
        target_width: target_w,
        target_height: target_h,
        counter: 0,
    };

    if scale_x == scale_y {
        let mut scaled_boxes = boxes.clone();
        let scaled = scale_image(&image, scale_x, scale_y, &mut scaled_boxes);
        writer.save_as_copy(&scaled, &scaled_boxes, DEFAULT_MIN_SIZE)?;
        if boxes.len() > 1 {
            writer.save_zoomed_bounding_boxes(&image, scale_x, &boxes)?;
        }
        return Ok(SmartResizeOutcome::Written(writer.counter));
    }

    // Scale by the larger factor so the target is covered along both axes;
    // the source is then too wide (`scale_y > scale_x`) or too tall.
    let scale = scale_x.max(scale_y);
    let too_wide = scale_y > scale_x;
    let mut scaled_boxes = boxes.clone();
    let scaled = scale_image(&image, scale, scale, &mut scaled_boxes);

    let region = if boxes.len() == 1 {
        scaled_boxes[0].clone()
    } else {
        BoundingBox::union(&scaled_boxes).unwrap_or_else(|| scaled_boxes[0].clone())
    };
    let overshoots = if too_wide {
        region.width() > target_w
    } else {
        region.height() > target_h
    };

    if overshoots {
        let min_size_percent = if boxes.len() == 1 {
            SINGLE_OBJECT_CROP_MIN_PERCENT
        } else {
            MULTI_OBJECT_CROP_MIN_PERCENT
        };
        writer.save_corner_crops(&scaled, &scaled_boxes, min_size_percent)?;
        if boxes.len() == 1 {
            writer.save_bounding_box(&image, &boxes)?;
        }
    } else {
        let cropped = crop_image_to_center(
            &scaled,
            region.center_x(),
            region.center_y(),
            writer.target_width_px(),
            writer.target_height_px(),
            &mut scaled_boxes,
            true,
        );
        writer.save_as_copy(&cropped, &scaled_boxes, DEFAULT_MIN_SIZE)?;
    }

    if boxes.len() > 1 {
        writer.save_zoomed_bounding_boxes(&image, scale, &boxes)?;
    }

    Ok(SmartResizeOutcome::Written(writer.counter))
}

/// Smart resize every image below `input_root`, mirroring the folder
/// structure into `output_root`. Both roots may be the same folder.
pub fn smart_resize_all(
    input_root: &Path,
    output_root: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<ProcessingStats> {
    fs::create_dir_all(output_root)?;

    // Collect first so files written during the run are not picked up again
    let images: Vec<PathBuf> = collect_image_files(input_root)
        .into_iter()
        .filter(|path| !is_nested_output(path, input_root, output_root))
        .collect();

    let pb = create_progress_bar(images.len() as u64, "Smart resize");
    let stats = images
        .par_iter()
        .map(|image_path| {
            let stats = smart_resize_one(
                image_path,
                input_root,
                output_root,
                target_width,
                target_height,
            );
            pb.inc(1);
            stats
        })
        .reduce(ProcessingStats::new, ProcessingStats::merge);
    pb.finish_with_message("Smart resize complete");

    Ok(stats)
}

fn smart_resize_one(
    image_path: &Path,
    input_root: &Path,
    output_root: &Path,
    target_width: u32,
    target_height: u32,
) -> ProcessingStats {
    let mut stats = ProcessingStats::new();
    stats.increment_total();

    let parent = image_path.parent().unwrap_or(input_root);
    let output_dir = mirror_path(parent, input_root, output_root);
    let result = fs::create_dir_all(&output_dir)
        .map_err(VocError::from)
        .and_then(|_| smart_resize(image_path, target_width, target_height, &output_dir));

    match result {
        Ok(SmartResizeOutcome::Written(count)) => {
            stats.increment_successful();
            stats.add_outputs(count);
        }
        Ok(SmartResizeOutcome::MissingAnnotation) => stats.increment_skipped_missing_annotation(),
        Ok(SmartResizeOutcome::NoObjects) => stats.increment_skipped_no_objects(),
        Err(e) => {
            error!("Failed to resize {}: {}", image_path.display(), e);
            stats.increment_failed();
        }
    }
    stats
}
