use clap::Parser;
use log::{error, info};

use voc_tools::config::SmartResizeArgs;
use voc_tools::smart_resize_all;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = SmartResizeArgs::parse();

    let input = &args.dataset.path;
    if !input.is_dir() {
        error!("The specified path does not exist: {}", input.display());
        std::process::exit(1);
    }
    let output = args.output.as_ref().unwrap_or(input);

    info!(
        "Smart resizing images in {} to {}x{} into {}",
        input.display(),
        args.new_x,
        args.new_y,
        output.display()
    );
    match smart_resize_all(input, output, args.new_x, args.new_y) {
        Ok(stats) => stats.print_summary(),
        Err(e) => {
            error!("Failed to resize images: {}", e);
            std::process::exit(1);
        }
    }
}
