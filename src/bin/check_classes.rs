use clap::Parser;
use log::{error, info};

use voc_tools::config::CheckClassesArgs;
use voc_tools::labels::check_classes;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CheckClassesArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match check_classes(root) {
        Ok(report) => {
            if report.files_checked == 0 {
                info!("No XML annotation files found in folder.");
            }
            if report.files_updated > 0 {
                info!("{} XML files were updated.", report.files_updated);
            }
            info!(
                "Check complete. {} classes found: {:?}",
                report.classes.len(),
                report.classes
            );
        }
        Err(e) => {
            error!("Failed to check classes: {}", e);
            std::process::exit(1);
        }
    }
}
