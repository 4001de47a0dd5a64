use clap::Parser;
use log::{error, info, warn};

use voc_tools::config::GroupArgs;
use voc_tools::group::group_files_per_class;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = GroupArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match group_files_per_class(root) {
        Ok(report) => {
            if !report.multi_class_files.is_empty() {
                warn!(
                    "{} files contain more than one class and were left in place.",
                    report.multi_class_files.len()
                );
            }
            info!(
                "Grouping complete. {} files were grouped. {} classes found: {:?}",
                report.files_grouped,
                report.classes.len(),
                report.classes
            );
        }
        Err(e) => {
            error!("Failed to group files: {}", e);
            std::process::exit(1);
        }
    }
}
