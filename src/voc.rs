//! Pascal VOC annotation model
//!
//! One XML file describes the bounding boxes of one image. The XML lives next
//! to the image and shares its stem (`img_001.jpg` + `img_001.xml`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VocError};

/// Root `<annotation>` element of a VOC file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "annotation")]
pub struct VocAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmented: Option<u8>,
    #[serde(default)]
    pub object: Vec<VocObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// One labeled rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocObject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficult: Option<u8>,
    pub bndbox: BndBox,
}

// Coordinates are kept as floats, some tools export fractional pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BndBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl VocAnnotation {
    /// Annotation skeleton for an RGB image without objects
    pub fn new(folder: &str, filename: &str, path: &str, width: u32, height: u32) -> Self {
        Self {
            folder: Some(folder.to_string()),
            filename: Some(filename.to_string()),
            path: Some(path.to_string()),
            source: Some(Source {
                database: Some("Unknown".to_string()),
            }),
            size: Some(Size {
                width,
                height,
                depth: Some(3),
            }),
            segmented: Some(0),
            object: Vec::new(),
        }
    }

    /// Replace the image size, keeping the depth if one was recorded
    pub fn set_size(&mut self, width: u32, height: u32) {
        let depth = self.size.as_ref().and_then(|size| size.depth);
        self.size = Some(Size {
            width,
            height,
            depth,
        });
    }

    /// Lowercase every object name, returning the number of names changed
    pub fn lowercase_labels(&mut self) -> usize {
        let mut changed = 0;
        for object in &mut self.object {
            let lower = object.name.to_lowercase();
            if lower != object.name {
                object.name = lower;
                changed += 1;
            }
        }
        changed
    }

    /// Distinct lowercase class names in order of first appearance
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for object in &self.object {
            let name = object.name.to_lowercase();
            if !classes.contains(&name) {
                classes.push(name);
            }
        }
        classes
    }
}

impl VocObject {
    pub fn new(name: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            name: name.to_string(),
            pose: Some("Unspecified".to_string()),
            truncated: Some(0),
            difficult: Some(0),
            bndbox: BndBox {
                xmin,
                ymin,
                xmax,
                ymax,
            },
        }
    }
}

/// Path of the XML file belonging to an image
pub fn annotation_path_for(image_path: &Path) -> PathBuf {
    image_path.with_extension("xml")
}

/// Parse a VOC XML file
pub fn read_annotation(path: &Path) -> Result<VocAnnotation> {
    let content = fs::read_to_string(path)?;
    parse_annotation(&content).map_err(|source| VocError::XmlParse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_annotation(content: &str) -> std::result::Result<VocAnnotation, quick_xml::DeError> {
    quick_xml::de::from_str(content)
}

/// Render an annotation as tab-indented XML
pub fn to_xml_string(annotation: &VocAnnotation) -> Result<String> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent('\t', 1);
    annotation.serialize(serializer)?;
    buffer.push('\n');
    Ok(buffer)
}

/// Write an annotation to disk, replacing any existing file
pub fn write_annotation(path: &Path, annotation: &VocAnnotation) -> Result<()> {
    let xml = to_xml_string(annotation)?;
    fs::write(path, xml)?;
    Ok(())
}
