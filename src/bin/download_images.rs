use clap::Parser;
use log::{error, info};

use voc_tools::config::DownloadArgs;
use voc_tools::download::{build_agent, download, read_url_file, search_images};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DownloadArgs::parse();

    let agent = build_agent();
    let urls = match (&args.urls_file, &args.query) {
        (Some(file), _) => read_url_file(file).map(|mut urls| {
            urls.truncate(args.limit);
            urls
        }),
        (None, Some(query)) if !query.trim().is_empty() => {
            info!("Starting download with following parameters:");
            info!("    Query  = {}", query.trim());
            info!("    Output = {}", args.output.display());
            info!("    Limit  = {}", args.limit);
            search_images(&agent, query.trim(), args.limit)
        }
        _ => {
            error!("A search query must be defined.");
            std::process::exit(1);
        }
    };

    let urls = match urls {
        Ok(urls) => urls,
        Err(e) => {
            error!("Failed to collect image URLs: {}", e);
            std::process::exit(1);
        }
    };

    match download(&agent, &urls, &args.output, args.parallel) {
        Ok(count) => info!("{} images downloaded.", count),
        Err(e) => {
            error!("Failed to download images: {}", e);
            std::process::exit(1);
        }
    }
}
