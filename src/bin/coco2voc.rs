use clap::Parser;
use log::{error, info};

use voc_tools::coco::convert_coco_dir;
use voc_tools::config::Coco2VocArgs;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Coco2VocArgs::parse();

    if !args.path.is_dir() {
        error!("The specified path does not exist: {}", args.path.display());
        std::process::exit(1);
    }

    info!("Folder: {}", args.path.display());
    match convert_coco_dir(&args.path, &args.output) {
        Ok(stats) => info!(
            "Conversion complete. {} XML files written, {} errors.",
            stats.files_written, stats.errors
        ),
        Err(e) => {
            error!("Failed to convert COCO files: {}", e);
            std::process::exit(1);
        }
    }
}
