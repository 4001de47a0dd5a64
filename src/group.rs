use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rename::capitalize;
use crate::types::SPLIT_IMG_FORMATS;
use crate::utils::{collect_annotation_files, folder_name};
use crate::voc::{read_annotation, write_annotation, VocAnnotation};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupingReport {
    pub files_grouped: usize,
    pub classes: Vec<String>,
    pub multi_class_files: Vec<PathBuf>,
}

/// Image described by `annotation`: its `<filename>` if present, else a
/// sibling with the XML stem
fn image_for_annotation(xml_file: &Path, annotation: &VocAnnotation) -> Option<PathBuf> {
    let folder = xml_file.parent()?;
    if let Some(filename) = &annotation.filename {
        let candidate = folder.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    SPLIT_IMG_FORMATS
        .iter()
        .map(|ext| xml_file.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Move one single-class annotated image into its class folder
fn group_file(xml_file: &Path, report: &mut GroupingReport) -> Result<()> {
    let mut annotation = read_annotation(xml_file)?;
    let classes = annotation.classes();
    let [class_name] = classes.as_slice() else {
        warn!(
            "Found {} classes in {}: {:?}",
            classes.len(),
            xml_file.display(),
            classes
        );
        report.multi_class_files.push(xml_file.to_path_buf());
        return Ok(());
    };
    if !report.classes.contains(class_name) {
        report.classes.push(class_name.clone());
    }
    annotation.lowercase_labels();

    let current_folder = xml_file.parent().unwrap_or(Path::new(""));
    if folder_name(current_folder).to_lowercase() == *class_name {
        return Ok(());
    }
    let Some(image_file) = image_for_annotation(xml_file, &annotation) else {
        warn!("No image found for {}", xml_file.display());
        return Ok(());
    };

    let new_folder_name = capitalize(class_name);
    let new_folder = current_folder.join(&new_folder_name);
    fs::create_dir_all(&new_folder)?;

    let Some(image_name) = image_file.file_name() else {
        return Ok(());
    };
    let new_image = new_folder.join(image_name);
    annotation.folder = Some(new_folder_name);
    annotation.filename = Some(image_name.to_string_lossy().into_owned());
    annotation.path = Some(new_image.to_string_lossy().into_owned());

    let Some(xml_name) = xml_file.file_name() else {
        return Ok(());
    };
    // The image moves first, the annotation only follows once it is in place
    fs::rename(&image_file, &new_image)?;
    write_annotation(&new_folder.join(xml_name), &annotation)?;
    fs::remove_file(xml_file)?;
    report.files_grouped += 1;
    Ok(())
}

/// Move every single-class annotated image below `root` into a sub-folder
/// named after its class
pub fn group_files_per_class(root: &Path) -> Result<GroupingReport> {
    let xml_files = collect_annotation_files(root);
    if xml_files.is_empty() {
        info!("No XML annotation files found in folder.");
    } else {
        info!("Trying to group {} XML annotation files...", xml_files.len());
    }

    let mut report = GroupingReport::default();
    for xml_file in &xml_files {
        if let Err(e) = group_file(xml_file, &mut report) {
            error!("Error occurred in file {}: {}", xml_file.display(), e);
        }
    }
    Ok(report)
}
