//! Pixel operations that keep a set of bounding boxes in sync with the image
//!
//! Every function taking `boxes` applies the same geometric change to the
//! boxes that it applies to the pixels, so the annotations stay valid for the
//! returned image.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageResult, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::bbox::{clamp, BoundingBox};

const FILL: Rgb<u8> = Rgb([0, 0, 0]);

const JPEG_QUALITY: u8 = 95;

/// Load any supported image as 8-bit RGB
pub fn open_rgb(path: &Path) -> ImageResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Write an image, choosing the encoder from the file extension
pub fn save_image(image: &RgbImage, path: &Path) -> ImageResult<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    if is_jpeg {
        let writer = BufWriter::new(File::create(path)?);
        image.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))
    } else {
        image.save(path)
    }
}

/// Interpolation filter for a resize by (`scale_x`, `scale_y`)
pub fn filter_for_scale(scale_x: f64, scale_y: f64) -> FilterType {
    if scale_x * scale_y > 1.0 {
        FilterType::Triangle
    } else {
        FilterType::Lanczos3
    }
}

/// Resize the whole image by the given factors
pub fn scale_image(
    image: &RgbImage,
    scale_x: f64,
    scale_y: f64,
    boxes: &mut [BoundingBox],
) -> RgbImage {
    for bbox in boxes.iter_mut() {
        bbox.scale(scale_x, scale_y);
    }
    let new_width = scaled_extent(image.width(), scale_x);
    let new_height = scaled_extent(image.height(), scale_y);
    imageops::resize(
        image,
        new_width,
        new_height,
        filter_for_scale(scale_x, scale_y),
    )
}

fn scaled_extent(extent: u32, scale: f64) -> u32 {
    (f64::from(extent) * scale).round().max(1.0) as u32
}

/// Zoom around (`center_x`, `center_y`) keeping the canvas size.
/// Uncovered pixels are filled with black.
pub fn scale_image_to_center(
    image: &RgbImage,
    scale_x: f64,
    scale_y: f64,
    center_x: f64,
    center_y: f64,
    boxes: &mut [BoundingBox],
) -> RgbImage {
    for bbox in boxes.iter_mut() {
        bbox.scale_to_center(scale_x, scale_y, center_x, center_y);
    }
    let matrix = [
        scale_x as f32,
        0.0,
        (center_x * (1.0 - scale_x)) as f32,
        0.0,
        scale_y as f32,
        (center_y * (1.0 - scale_y)) as f32,
        0.0,
        0.0,
        1.0,
    ];
    match Projection::from_matrix(matrix) {
        Some(projection) => warp(image, &projection, Interpolation::Bilinear, FILL),
        None => image.clone(),
    }
}

/// Pad the image with black so that the window (`x`, `y`, `width`, `height`) fits
pub fn enlarge_image(image: &RgbImage, x: i64, y: i64, width: i64, height: i64) -> RgbImage {
    let image_width = i64::from(image.width());
    let image_height = i64::from(image.height());

    let top = if y < 0 { -y } else { 0 };
    let bottom = (y + height - image_height).max(0);
    let left = if x < 0 { -x } else { 0 };
    let right = (x + width - image_width).max(0);

    let mut canvas = RgbImage::from_pixel(
        (image_width + left + right) as u32,
        (image_height + top + bottom) as u32,
        FILL,
    );
    imageops::replace(&mut canvas, image, left, top);
    canvas
}

/// Cut the window (`x`, `y`, `width`, `height`) out of the image.
///
/// A window reaching outside the image is padded with black first. The
/// result is truncated at the (padded) image edge.
pub fn crop_image(
    image: &RgbImage,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    boxes: &mut [BoundingBox],
) -> RgbImage {
    let image_width = i64::from(image.width());
    let image_height = i64::from(image.height());

    let padded = if x < 0 || y < 0 || x + width > image_width || y + height > image_height {
        for bbox in boxes.iter_mut() {
            bbox.translate(x.min(0) as f64, y.min(0) as f64);
        }
        Some(enlarge_image(image, x, y, width, height))
    } else {
        None
    };
    let source = padded.as_ref().unwrap_or(image);

    let x = x.max(0);
    let y = y.max(0);
    for bbox in boxes.iter_mut() {
        bbox.translate(x as f64, y as f64);
    }

    imageops::crop_imm(
        source,
        x as u32,
        y as u32,
        width.max(0) as u32,
        height.max(0) as u32,
    )
    .to_image()
}

/// Cut a `width` x `height` window centred on (`center_x`, `center_y`).
///
/// With `clamp_values` the window is pushed back inside the image instead
/// of being padded.
pub fn crop_image_to_center(
    image: &RgbImage,
    center_x: f64,
    center_y: f64,
    width: i64,
    height: i64,
    boxes: &mut [BoundingBox],
    clamp_values: bool,
) -> RgbImage {
    let image_width = i64::from(image.width());
    let image_height = i64::from(image.height());

    let mut x = (center_x - width as f64 / 2.0) as i64;
    let mut y = (center_y - height as f64 / 2.0) as i64;
    let mut width = width;
    let mut height = height;
    if clamp_values {
        x = clamp(x, 0, image_width - width);
        y = clamp(y, 0, image_height - height);
        width = clamp(width, 0, image_width - x);
        height = clamp(height, 0, image_height - y);
    }
    crop_image(image, x, y, width, height, boxes)
}
