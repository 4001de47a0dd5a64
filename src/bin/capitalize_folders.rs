use clap::Parser;
use log::{error, info};

use voc_tools::config::CapitalizeArgs;
use voc_tools::rename::capitalize_folder_names;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CapitalizeArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Searching for folders in {}", root.display());
    match capitalize_folder_names(root) {
        Ok(count) => info!("Complete. {} folders renamed.", count),
        Err(e) => {
            error!("Failed to rename folders: {}", e);
            std::process::exit(1);
        }
    }
}
