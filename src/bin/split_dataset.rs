use clap::Parser;
use log::{error, info};

use voc_tools::config::SplitArgs;
use voc_tools::split::{collect_image_files, distribute_images, SplitDirs, SplitRatios};
use voc_tools::types::SPLIT_IMG_FORMATS;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = SplitArgs::parse();

    if !args.path.is_dir() {
        error!("The specified path does not exist: {}", args.path.display());
        std::process::exit(1);
    }

    let images = collect_image_files(&args.path, SPLIT_IMG_FORMATS);
    info!("Total images: {}", images.len());

    let dirs = SplitDirs::new(&args.train_dir, &args.val_dir, &args.test_dir);
    let ratios = SplitRatios {
        train: args.train_size,
        val: args.val_size,
    };
    match distribute_images(images, &dirs, ratios, args.mode, args.seed) {
        Ok(counts) => info!(
            "Split complete. {} training, {} validation, {} test images.",
            counts.train, counts.val, counts.test
        ),
        Err(e) => {
            error!("Failed to split dataset: {}", e);
            std::process::exit(1);
        }
    }
}
