use clap::Parser;
use log::{error, info};

use voc_tools::config::LabelArgs;
use voc_tools::labels::change_label;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = LabelArgs::parse();

    let root = &args.dataset.path;
    if !root.is_dir() {
        error!("The specified path does not exist: {}", root.display());
        std::process::exit(1);
    }

    info!("Folder: {}, new label: {:?}", root.display(), args.label.to_lowercase());
    match change_label(root, &args.label) {
        Ok(count) => info!("Conversion complete. {} XML files updated.", count),
        Err(e) => {
            error!("Failed to change labels: {}", e);
            std::process::exit(1);
        }
    }
}
