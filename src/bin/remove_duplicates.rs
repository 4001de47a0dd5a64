use clap::Parser;
use log::{error, info};

use voc_tools::config::DedupArgs;
use voc_tools::dedup::remove_duplicates;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DedupArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match remove_duplicates(root) {
        Ok(count) => info!("Detecting identical duplicates complete. {} images were removed.", count),
        Err(e) => {
            error!("Failed to remove duplicates: {}", e);
            std::process::exit(1);
        }
    }
}
