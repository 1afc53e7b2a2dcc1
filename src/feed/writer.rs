use chrono::{DateTime, Utc};

use super::date::format_rfc822;
use super::escape::Escaper;
use super::item::render_item;
use super::types::{non_empty, FeedChannel, FeedError};

/// Language written when the channel does not set one.
pub const DEFAULT_LANGUAGE: &str = "en";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const RSS_OPEN: &str = r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:atom="http://www.w3.org/2005/Atom">"#;

/// Assembles complete RSS 2.0 documents.
///
/// A writer borrows the [`Escaper`] it escapes through, so the cache's
/// lifetime is the caller's choice: [`FeedWriter::new`] uses the
/// process-wide cache, [`FeedWriter::with_escaper`] a scoped one.
#[derive(Debug, Clone)]
pub struct FeedWriter<'e> {
    escaper: &'e Escaper,
    default_language: String,
}

impl FeedWriter<'static> {
    /// A writer using the process-wide escape cache.
    pub fn new() -> Self {
        Self::with_escaper(Escaper::global())
    }
}

impl Default for FeedWriter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'e> FeedWriter<'e> {
    pub fn with_escaper(escaper: &'e Escaper) -> Self {
        Self {
            escaper,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language used for channels that leave `language` empty.
    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Renders the channel with the current time as `lastBuildDate`.
    pub fn render(&self, channel: &FeedChannel) -> Result<String, FeedError> {
        self.render_at(channel, Utc::now())
    }

    /// Renders the channel as of `now`.
    ///
    /// `now` becomes `lastBuildDate` and the `pubDate` of items without one.
    ///
    /// # Errors
    ///
    /// - [`FeedError::MissingRequiredField`] if `title`, `description`, `site`
    ///   or `feed_url` is empty. Checked before anything is rendered.
    /// - [`FeedError::InvalidDate`] if any item's `pub_date` is unusable.
    pub fn render_at(
        &self,
        channel: &FeedChannel,
        now: DateTime<Utc>,
    ) -> Result<String, FeedError> {
        let missing = channel.missing_fields();
        if !missing.is_empty() {
            return Err(FeedError::MissingRequiredField { fields: missing });
        }

        let valid_items: Vec<_> = channel
            .items
            .iter()
            .filter(|item| item.is_renderable())
            .collect();
        let skipped = channel.items.len() - valid_items.len();
        if skipped > 0 {
            tracing::debug!(skipped, "Skipping items without title or link");
        }

        let mut rendered = Vec::with_capacity(valid_items.len());
        for item in valid_items {
            if let Some(xml) = render_item(item, self.escaper, now)? {
                rendered.push(xml);
            }
        }
        let items_xml = rendered.join("\n\n");

        let language = non_empty(channel.language.as_deref()).unwrap_or(&self.default_language);
        let custom_data = non_empty(channel.custom_data.as_deref().map(str::trim))
            .map(|xml| format!("    {xml}\n"))
            .unwrap_or_default();

        let esc = |s: &str| self.escaper.escape(s);
        let document = format!(
            "{XML_DECLARATION}\n\
             {RSS_OPEN}\n\
             \x20 <channel>\n\
             \x20   <title>{title}</title>\n\
             \x20   <link>{site}</link>\n\
             \x20   <description>{description}</description>\n\
             \x20   <language>{language}</language>\n\
             \x20   <lastBuildDate>{last_build_date}</lastBuildDate>\n\
             \x20   <atom:link href=\"{feed_url}\" rel=\"self\" type=\"application/rss+xml\" />\n\
             {custom_data}{items_xml}\n\
             \x20 </channel>\n\
             </rss>",
            title = esc(&channel.title),
            site = esc(&channel.site),
            description = esc(&channel.description),
            language = esc(language),
            last_build_date = format_rfc822(&now),
            feed_url = esc(&channel.feed_url),
        );

        tracing::debug!(
            title = %channel.title,
            items = rendered.len(),
            skipped,
            bytes = document.len(),
            "Rendered RSS feed"
        );
        Ok(document)
    }
}

/// Renders a channel through the process-wide escape cache.
///
/// Shorthand for `FeedWriter::new().render(channel)`.
pub fn generate_rss(channel: &FeedChannel) -> Result<String, FeedError> {
    FeedWriter::new().render(channel)
}
