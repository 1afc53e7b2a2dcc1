//! Maps arbitrary entry collections onto feed items.
//!
//! A site generator holds its posts in whatever shape suits it. Implementing
//! [`EntryMapper`] for that shape supplies the per-field extraction, and
//! [`render_collection`] turns the collection into a finished document.

use super::types::{Category, Enclosure, FeedChannel, FeedError, FeedItem, Timestamp};
use super::writer::generate_rss;

/// Per-field extraction from a source entry.
///
/// The first five methods are required. `category`, `guid` and `enclosure`
/// are optional hooks that extract nothing unless overridden.
pub trait EntryMapper<T> {
    fn title(&self, entry: &T) -> String;
    fn link(&self, entry: &T) -> String;
    fn description(&self, entry: &T) -> String;
    fn content(&self, entry: &T) -> String;
    fn pub_date(&self, entry: &T) -> Timestamp;

    fn category(&self, _entry: &T) -> Option<Category> {
        None
    }

    fn guid(&self, _entry: &T) -> Option<String> {
        None
    }

    fn enclosure(&self, _entry: &T) -> Option<Enclosure> {
        None
    }
}

/// Channel-level fields for a mapped collection.
#[derive(Debug, Clone, Default)]
pub struct FeedMeta {
    pub title: String,
    pub description: String,
    pub site: String,
    pub feed_url: String,
    pub language: Option<String>,
    /// Passed through unescaped; see [`FeedChannel::custom_data`].
    pub custom_data: Option<String>,
}

impl FeedMeta {
    /// Builds the channel for the given items.
    pub fn into_channel(self, items: Vec<FeedItem>) -> FeedChannel {
        FeedChannel {
            title: self.title,
            description: self.description,
            site: self.site,
            feed_url: self.feed_url,
            items,
            language: self.language.filter(|l| !l.is_empty()),
            custom_data: self.custom_data.filter(|c| !c.is_empty()),
        }
    }
}

/// Extracts one feed item from an entry.
///
/// The guid is the mapper's guid when it returns a non-empty value, else the
/// link. Empty content, categories and enclosures are left unset.
pub fn map_entry<T, M>(entry: &T, mapper: &M) -> FeedItem
where
    M: EntryMapper<T> + ?Sized,
{
    let link = mapper.link(entry);
    let guid = mapper
        .guid(entry)
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| link.clone());

    FeedItem {
        title: mapper.title(entry),
        pub_date: Some(mapper.pub_date(entry)),
        guid: Some(guid),
        description: Some(mapper.description(entry)),
        content: Some(mapper.content(entry)).filter(|c| !c.is_empty()),
        category: mapper.category(entry),
        enclosure: mapper.enclosure(entry),
        link,
    }
}

/// Maps every entry and renders the resulting feed.
///
/// # Errors
///
/// Same as [`generate_rss`].
pub fn render_collection<'a, T, M, I>(
    entries: I,
    meta: FeedMeta,
    mapper: &M,
) -> Result<String, FeedError>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    M: EntryMapper<T> + ?Sized,
{
    let items: Vec<FeedItem> = entries
        .into_iter()
        .map(|entry| map_entry(entry, mapper))
        .collect();
    tracing::debug!(entries = items.len(), "Mapped collection entries");

    generate_rss(&meta.into_channel(items))
}
