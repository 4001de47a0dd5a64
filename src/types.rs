use std::collections::HashSet;
use std::sync::OnceLock;

// Image extensions picked up by the dataset tools (compared case-insensitively)
pub const IMG_FORMATS: &[&str] = &["jpeg", "jpg", "png"];

// Extensions accepted when splitting a dataset or moving it into a layout
pub const SPLIT_IMG_FORMATS: &[&str] = &["jpeg", "jpg", "png", "bmp"];

// Precomputed HashSet of image extensions for fast lookup
pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Get the image extensions set
pub fn get_image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

// Struct to hold processing statistics of a batch run over many files
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    pub total_files_processed: usize,
    pub successful_files: usize,
    pub outputs_written: usize,
    pub skipped_missing_annotation: usize,
    pub skipped_no_objects: usize,
    pub failed_files: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_total(&mut self) {
        self.total_files_processed += 1;
    }

    pub fn increment_successful(&mut self) {
        self.successful_files += 1;
    }

    pub fn add_outputs(&mut self, count: usize) {
        self.outputs_written += count;
    }

    pub fn increment_skipped_missing_annotation(&mut self) {
        self.skipped_missing_annotation += 1;
    }

    pub fn increment_skipped_no_objects(&mut self) {
        self.skipped_no_objects += 1;
    }

    pub fn increment_failed(&mut self) {
        self.failed_files += 1;
    }

    /// Combine the counters of two partial runs
    pub fn merge(mut self, other: ProcessingStats) -> ProcessingStats {
        self.total_files_processed += other.total_files_processed;
        self.successful_files += other.successful_files;
        self.outputs_written += other.outputs_written;
        self.skipped_missing_annotation += other.skipped_missing_annotation;
        self.skipped_no_objects += other.skipped_no_objects;
        self.failed_files += other.failed_files;
        self
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total files processed: {}", self.total_files_processed);
        log::info!("Successful files: {}", self.successful_files);
        log::info!("Output files written: {}", self.outputs_written);
        log::info!(
            "Skipped (missing annotation file): {}",
            self.skipped_missing_annotation
        );
        log::info!(
            "Skipped (no objects in annotation): {}",
            self.skipped_no_objects
        );
        log::info!("Failed files: {}", self.failed_files);

        let total_skipped = self.skipped_missing_annotation + self.skipped_no_objects;
        if total_skipped > 0 {
            log::warn!(
                "Total skipped images: {} (missing annotation: {}, no objects: {})",
                total_skipped,
                self.skipped_missing_annotation,
                self.skipped_no_objects
            );
        }
    }
}

// Counters of a format conversion run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionStats {
    pub files_written: usize,
    pub errors: usize,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(mut self, other: ConversionStats) -> ConversionStats {
        self.files_written += other.files_written;
        self.errors += other.errors;
        self
    }
}
