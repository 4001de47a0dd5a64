use clap::Parser;
use log::{error, info};

use voc_tools::config::Yolo2VocArgs;
use voc_tools::yolo::convert_yolo_dir;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Yolo2VocArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match convert_yolo_dir(root, &args.classes) {
        Ok((stats, classes)) => {
            info!(
                "Conversion complete. {} files converted, {} errors.",
                stats.files_written, stats.errors
            );
            info!("{} classes found during conversion: {:?}", classes.len(), classes);
        }
        Err(e) => {
            error!("Failed to convert YOLO labels: {}", e);
            std::process::exit(1);
        }
    }
}
