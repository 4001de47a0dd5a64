use clap::Parser;
use log::{error, info};

use voc_tools::config::LabelArgs;
use voc_tools::labels::remove_label;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = LabelArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}, label to remove: {:?}", root.display(), args.label.to_lowercase());
    match remove_label(root, &args.label) {
        Ok(report) if report.files_processed == 0 => {
            info!("No objects with the specified label were found in any XML files.")
        }
        Ok(report) => info!(
            "{} XML files processed, {} objects removed, {} files deleted.",
            report.files_processed, report.objects_removed, report.files_deleted
        ),
        Err(e) => {
            error!("Failed to remove label: {}", e);
            std::process::exit(1);
        }
    }
}
