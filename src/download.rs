//! Image search and download
//!
//! The search talks to the DuckDuckGo image endpoint: a first request to the
//! HTML page yields a `vqd` token, which then authorises the JSON result pages.

use log::{debug, error, info};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ureq::{Agent, AgentBuilder};

use crate::error::{Result, VocError};
use crate::utils::{create_progress_bar, unique_random_path};

const SEARCH_URL: &str = "https://duckduckgo.com/";
const IMAGES_URL: &str = "https://duckduckgo.com/i.js";
// Photos that may be modified and used commercially
const IMAGE_FILTERS: &str = ",,,type:photo,,license:ModifyCommercially";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const DEFAULT_EXTENSION: &str = "jpg";

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    image: String,
}

/// HTTP agent shared by search and download
pub fn build_agent() -> Agent {
    AgentBuilder::new()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
}

fn http_error(e: ureq::Error) -> VocError {
    VocError::Http(Box::new(e))
}

/// Extract the search token from the HTML search page
pub fn extract_vqd(html: &str) -> Option<String> {
    let re = Regex::new(r#"vqd=["']?([0-9-]+)"#).ok()?;
    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// URLs of up to `limit` images found for `query`
pub fn search_images(agent: &Agent, query: &str, limit: usize) -> Result<Vec<String>> {
    let html = agent
        .get(SEARCH_URL)
        .query("q", query)
        .query("iax", "images")
        .query("ia", "images")
        .call()
        .map_err(http_error)?
        .into_string()?;
    let vqd = extract_vqd(&html)
        .ok_or_else(|| VocError::Search(format!("no search token returned for {:?}", query)))?;
    debug!("Search token: {}", vqd);

    let mut urls: Vec<String> = Vec::new();
    let mut request = agent
        .get(IMAGES_URL)
        .query("l", "wt-wt")
        .query("o", "json")
        .query("q", query)
        .query("vqd", &vqd)
        .query("f", IMAGE_FILTERS)
        .query("p", "-1");
    loop {
        let page: SearchPage = request
            .set("Referer", SEARCH_URL)
            .call()
            .map_err(http_error)?
            .into_json()?;
        for result in page.results {
            if urls.len() >= limit {
                return Ok(urls);
            }
            if !urls.contains(&result.image) {
                urls.push(result.image);
            }
        }
        match page.next {
            Some(next) if urls.len() < limit => {
                request = agent
                    .get(&format!("{}{}", SEARCH_URL, next))
                    .query("vqd", &vqd);
            }
            _ => return Ok(urls),
        }
    }
}

/// File extension (without dot) for an HTTP content type
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => DEFAULT_EXTENSION,
    }
}

/// Download one URL into `folder` under a random unique name
pub fn download_one(agent: &Agent, url: &str, folder: &Path) -> Result<PathBuf> {
    let response = agent.get(url).call().map_err(http_error)?;
    let extension = extension_for_content_type(response.content_type());
    let path = unique_random_path(folder, extension);
    let mut writer = BufWriter::new(File::create(&path)?);
    if let Err(e) = io::copy(&mut response.into_reader(), &mut writer) {
        drop(writer);
        let _ = fs::remove_file(&path);
        return Err(e.into());
    }
    Ok(path)
}

/// Download all `urls` into `folder`, returning the number of files written
pub fn download(agent: &Agent, urls: &[String], folder: &Path, parallel: bool) -> Result<usize> {
    fs::create_dir_all(folder)?;
    let pb = create_progress_bar(urls.len() as u64, "Download");
    let fetch = |url: &String| -> bool {
        let result = download_one(agent, url, folder);
        pb.inc(1);
        match result {
            Ok(path) => {
                debug!("{} -> {}", url, path.display());
                true
            }
            Err(e) => {
                error!("Failed to download {}: {}", url, e);
                false
            }
        }
    };
    let downloaded = if parallel {
        urls.par_iter().filter(|url| fetch(url)).count()
    } else {
        urls.iter().filter(|url| fetch(url)).count()
    };
    pb.finish_with_message("Download complete");
    info!("{} of {} images downloaded.", downloaded, urls.len());
    Ok(downloaded)
}

/// Non-empty lines of a URL list file
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("image/jpeg"), "jpg");
        assert_eq!(extension_for_content_type("image/PNG; charset=binary"), "png");
        assert_eq!(extension_for_content_type("text/html"), "jpg");
        assert_eq!(extension_for_content_type(""), "jpg");
    }

    #[test]
    fn test_extract_vqd() {
        let html = r#"<script>nrj('/d.js?q=fox&vqd="4-1234567890-98765"&kl=wt-wt')</script>"#;
        assert_eq!(extract_vqd(html).as_deref(), Some("4-1234567890-98765"));
        assert_eq!(extract_vqd("<html></html>"), None);
    }

    #[test]
    fn test_search_page_decoding() {
        let body = r#"{
            "results": [
                {"image": "https://a.example/1.jpg", "title": "fox", "width": 640},
                {"image": "https://a.example/2.png", "thumbnail": "t.jpg"}
            ],
            "next": "i.js?q=fox&s=100"
        }"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].image, "https://a.example/2.png");
        assert_eq!(page.next.as_deref(), Some("i.js?q=fox&s=100"));

        let last: SearchPage = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(last.results.is_empty() && last.next.is_none());
    }
}
