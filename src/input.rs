//! Loads a channel definition from a TOML or JSON file.
//!
//! The file holds the channel fields plus an `items` array, using either the
//! snake_case names or the camelCase names common in site generators
//! (`feedUrl`, `customData`, `pubDate`). Dates inside TOML must be quoted
//! strings or Unix seconds.
use std::path::Path;
use thiserror::Error;

use crate::feed::FeedChannel;
use crate::util::validate_feed_url;

/// Maximum input file size (32 MB).
const MAX_INPUT_SIZE: u64 = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in input file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON in input file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported input format '{0}': expected .toml or .json")]
    UnsupportedFormat(String),

    #[error("Input file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Input file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Toml,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(InputFormat::Toml),
            "json" => Ok(InputFormat::Json),
            _ => Err(InputError::UnsupportedFormat(ext)),
        }
    }
}

/// Reads and parses a channel file.
///
/// URL fields that are not absolute http(s) URLs are logged as warnings;
/// they are still rendered as given.
pub fn load_channel(path: &Path) -> Result<FeedChannel, InputError> {
    let format = InputFormat::from_path(path)?;

    let size = std::fs::metadata(path)?.len();
    if size > MAX_INPUT_SIZE {
        return Err(InputError::TooLarge {
            size,
            max: MAX_INPUT_SIZE,
        });
    }

    let content = std::fs::read_to_string(path)?;
    let channel = parse_channel(&content, format)?;
    tracing::debug!(
        path = %path.display(),
        items = channel.items.len(),
        "Loaded channel definition"
    );
    Ok(channel)
}

/// Parses channel text in the given format and warns about suspicious URLs.
pub fn parse_channel(content: &str, format: InputFormat) -> Result<FeedChannel, InputError> {
    let channel: FeedChannel = match format {
        InputFormat::Toml => toml::from_str(content)?,
        InputFormat::Json => serde_json::from_str(content)?,
    };
    warn_on_relative_urls(&channel);
    Ok(channel)
}

fn warn_on_relative_urls(channel: &FeedChannel) {
    let channel_urls = [("site", &channel.site), ("feedUrl", &channel.feed_url)];
    for (field, url) in channel_urls {
        if url.is_empty() {
            continue;
        }
        if let Err(e) = validate_feed_url(url) {
            tracing::warn!(field, url = %url, error = %e, "Channel URL is not an absolute http(s) URL");
        }
    }

    for item in &channel.items {
        if item.link.is_empty() {
            continue;
        }
        if let Err(e) = validate_feed_url(&item.link) {
            tracing::warn!(
                title = %item.title,
                link = %item.link,
                error = %e,
                "Item link is not an absolute http(s) URL"
            );
        }
    }
}
