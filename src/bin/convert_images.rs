use clap::Parser;
use log::{error, info};

use voc_tools::config::ConvertImagesArgs;
use voc_tools::images::convert_images;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ConvertImagesArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}", root.display());
    match convert_images(root) {
        Ok((converted, renamed)) => info!(
            "Complete. {} PNG images converted, {} JPEG images renamed.",
            converted, renamed
        ),
        Err(e) => {
            error!("Failed to convert images: {}", e);
            std::process::exit(1);
        }
    }
}
