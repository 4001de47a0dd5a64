//! Pascal VOC dataset preparation tools
//!
//! This library backs a set of small command-line programs that convert,
//! clean, resize and split object-detection datasets stored as images with
//! Pascal VOC XML annotations.

pub mod bbox;
pub mod coco;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod group;
pub mod images;
pub mod labels;
pub mod layout;
pub mod prepare;
pub mod raster;
pub mod rename;
pub mod resize;
pub mod smart_resize;
pub mod split;
pub mod types;
pub mod utils;
pub mod voc;
pub mod yolo;

// Re-export commonly used types and functions
pub use bbox::BoundingBox;
pub use config::{ResizeMode, TransferMode};
pub use error::{Result, VocError};
pub use smart_resize::{smart_resize, smart_resize_all, SmartResizeOutcome};
pub use types::{ConversionStats, ProcessingStats};
pub use voc::{read_annotation, write_annotation, VocAnnotation, VocObject};
