use clap::Parser;
use log::{error, info};

use voc_tools::config::PrepareArgs;
use voc_tools::prepare::{prepare_dataset, PrepareConfig};
use voc_tools::split::SplitRatios;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = PrepareArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    let config = PrepareConfig {
        dataset_root: root.clone(),
        labels: args.labels.clone(),
        limit_per_label: args.limit_per_label,
        temp_dir: args.temp.clone(),
        target_width: args.new_x,
        target_height: args.new_y,
        ratios: SplitRatios {
            train: args.train_size,
            val: args.val_size,
        },
        seed: args.seed,
    };

    info!("Preparing dataset for labels {:?}", config.labels);
    match prepare_dataset(&config) {
        Ok(prepared) => {
            info!(
                "Dataset ready. {} training images in {}",
                prepared.counts.train,
                prepared.dirs.train.display()
            );
            info!(
                "{} validation images in {}",
                prepared.counts.val,
                prepared.dirs.val.display()
            );
            info!(
                "{} test images in {}",
                prepared.counts.test,
                prepared.dirs.test.display()
            );
            info!("Label map written to {}", prepared.labelmap.display());
        }
        Err(e) => {
            error!("Failed to prepare dataset: {}", e);
            std::process::exit(1);
        }
    }
}
