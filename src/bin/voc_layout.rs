use clap::Parser;
use log::{error, info};

use voc_tools::config::LayoutArgs;
use voc_tools::layout::to_pascal_voc_layout;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = LayoutArgs::parse();

    info!("Creating Pascal VOC layout in {}", args.output.display());
    match to_pascal_voc_layout(
        &args.train_dir,
        &args.val_dir,
        &args.test_dir,
        &args.output,
        args.mode,
    ) {
        Ok(count) => info!("Layout complete. {} files transferred.", count),
        Err(e) => {
            error!("Failed to create layout: {}", e);
            std::process::exit(1);
        }
    }
}
