use clap::Parser;
use log::{error, info};

use voc_tools::config::RenameArgs;
use voc_tools::rename::rename_images;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = RenameArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match rename_images(root) {
        Ok(count) => info!("Renaming complete. {} images were renamed.", count),
        Err(e) => {
            error!("Failed to rename images: {}", e);
            std::process::exit(1);
        }
    }
}
