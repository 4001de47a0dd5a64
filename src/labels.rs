//! Bulk edits of the class labels stored in XML annotations

use dashmap::DashSet;
use log::{error, warn};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

use crate::error::{Result, VocError};
use crate::utils::collect_annotation_files;
use crate::voc::{read_annotation, write_annotation};

/// Result of a class check over a dataset
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassReport {
    pub files_checked: usize,
    pub files_updated: usize,
    /// Sorted distinct class names
    pub classes: Vec<String>,
}

/// Result of removing a label from a dataset
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RemovalReport {
    pub files_processed: usize,
    pub objects_removed: usize,
    pub files_deleted: usize,
}

/// Set the label of every object below `root` to `label` (lowercased).
/// Returns the number of rewritten files.
pub fn change_label(root: &Path, label: &str) -> Result<usize> {
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return Err(VocError::InvalidArgument(
            "new class label must not be empty".to_string(),
        ));
    }

    let updated = AtomicUsize::new(0);
    collect_annotation_files(root).par_iter().for_each(|xml_file| {
        let result = read_annotation(xml_file).and_then(|mut annotation| {
            for object in annotation.object.iter_mut() {
                object.name = label.clone();
            }
            write_annotation(xml_file, &annotation)
        });
        match result {
            Ok(()) => {
                updated.fetch_add(1, Relaxed);
            }
            Err(e) => error!("{}", e),
        }
    });
    Ok(updated.into_inner())
}

/// Lowercase all class names below `root` and list the classes found
pub fn check_classes(root: &Path) -> Result<ClassReport> {
    let xml_files = collect_annotation_files(root);
    let classes: DashSet<String> = DashSet::new();
    let updated = AtomicUsize::new(0);

    xml_files.par_iter().for_each(|xml_file| {
        let mut annotation = match read_annotation(xml_file) {
            Ok(annotation) => annotation,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };
        for object in &annotation.object {
            if object.name != object.name.to_lowercase() {
                warn!(
                    "Uppercase class name found in {} --> {}",
                    xml_file.display(),
                    object.name
                );
            }
        }
        if annotation.lowercase_labels() > 0 {
            match write_annotation(xml_file, &annotation) {
                Ok(()) => {
                    updated.fetch_add(1, Relaxed);
                }
                Err(e) => error!("{}", e),
            }
        }
        for class in annotation.classes() {
            classes.insert(class);
        }
    });

    let mut classes: Vec<String> = classes.into_iter().collect();
    classes.sort();
    Ok(ClassReport {
        files_checked: xml_files.len(),
        files_updated: updated.into_inner(),
        classes,
    })
}

/// Remove every object labelled `label` (compared in lower case).
/// Annotation files left without objects are deleted.
pub fn remove_label(root: &Path, label: &str) -> Result<RemovalReport> {
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return Err(VocError::InvalidArgument(
            "class label to remove must not be empty".to_string(),
        ));
    }

    let mut report = RemovalReport::default();
    for xml_file in collect_annotation_files(root) {
        match remove_label_from_file(&xml_file, &label) {
            Ok((0, false)) => {}
            Ok((removed, deleted)) => {
                report.files_processed += 1;
                report.objects_removed += removed;
                if deleted {
                    report.files_deleted += 1;
                }
            }
            Err(e) => error!("Error while processing XML file {}: {}", xml_file.display(), e),
        }
    }
    Ok(report)
}

fn remove_label_from_file(xml_file: &Path, label: &str) -> Result<(usize, bool)> {
    let mut annotation = read_annotation(xml_file)?;
    let before = annotation.object.len();
    annotation
        .object
        .retain(|object| object.name.to_lowercase() != label);
    let removed = before - annotation.object.len();

    if annotation.object.is_empty() {
        fs::remove_file(xml_file)?;
        return Ok((removed, true));
    }
    if removed > 0 {
        write_annotation(xml_file, &annotation)?;
    }
    Ok((removed, false))
}
