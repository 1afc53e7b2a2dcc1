use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that abort a feed render. No partial document is produced.
#[derive(Debug, Error)]
pub enum FeedError {
    /// One or more mandatory channel fields are empty.
    ///
    /// Field names use the feed vocabulary (`feedUrl`, not `feed_url`) and are
    /// listed in declaration order.
    #[error("Missing required RSS options: {}", .fields.join(", "))]
    MissingRequiredField { fields: Vec<&'static str> },

    /// A timestamp could not be resolved to a point in time.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

// ============================================================================
// Timestamps
// ============================================================================

/// Any value that can be resolved to a point in time for `pubDate`.
///
/// Text and Unix-second forms come from input files; the `DateTime` forms are
/// for callers that already hold parsed values. Resolution lives in
/// [`Timestamp::to_utc`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Seconds since the Unix epoch.
    Unix(i64),
    /// Textual date, e.g. `2024-06-15T14:30:45Z` or `Sat, 15 Jun 2024 14:30:45 GMT`.
    Text(String),
    #[serde(skip)]
    Utc(DateTime<Utc>),
    #[serde(skip)]
    Fixed(DateTime<FixedOffset>),
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Utc(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Fixed(dt)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Timestamp::Text(s.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(s: String) -> Self {
        Timestamp::Text(s)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp::Unix(secs)
    }
}

// ============================================================================
// Item Parts
// ============================================================================

/// One category or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Category {
    One(String),
    Many(Vec<String>),
}

impl Category {
    /// Non-empty values in input order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Category::One(value) => std::slice::from_ref(value),
            Category::Many(values) => values,
        };
        values.iter().map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::One(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::One(s)
    }
}

impl From<Vec<String>> for Category {
    fn from(values: Vec<String>) -> Self {
        Category::Many(values)
    }
}

impl From<Vec<&str>> for Category {
    fn from(values: Vec<&str>) -> Self {
        Category::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// A linked media attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Enclosure {
    /// The enclosure is skipped when this is empty.
    #[serde(default)]
    pub url: String,
    /// Size in bytes. `None` and negative values render as `0`.
    #[serde(default, deserialize_with = "lenient_length")]
    pub length: Option<i64>,
    /// MIME type; `image/jpeg` when absent or empty.
    #[serde(default, rename = "type", alias = "mime_type")]
    pub mime_type: Option<String>,
}

impl Enclosure {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Accepts any value for `length`, keeping only non-negative numbers.
///
/// Strings such as `"1024"` are deliberately not parsed: only a real number
/// counts as a byte size.
fn lenient_length<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};

    struct LengthVisitor;

    impl<'de> Visitor<'de> for LengthVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an enclosure length")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok((v >= 0).then_some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_finite() && v >= 0.0 {
                // Saturating float-to-int cast truncates the fraction
                Ok(Some(v as i64))
            } else {
                Ok(None)
            }
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(LengthVisitor)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LengthVisitor)
}

// ============================================================================
// Item & Channel
// ============================================================================

/// One `<item>` of the feed.
///
/// `title` and `link` are required for the item to render; an item missing
/// either is dropped from the document without failing the render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Render time is used when absent.
    #[serde(alias = "pubDate")]
    pub pub_date: Option<Timestamp>,
    /// Falls back to `link` when absent or empty.
    pub guid: Option<String>,
    pub description: Option<String>,
    /// Rich content, embedded in `<content:encoded>` as CDATA.
    pub content: Option<String>,
    pub category: Option<Category>,
    pub enclosure: Option<Enclosure>,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    /// True when both `title` and `link` are present.
    pub fn is_renderable(&self) -> bool {
        !self.title.is_empty() && !self.link.is_empty()
    }

    /// The guid value written to the document: `guid` if non-empty, else `link`.
    pub fn resolved_guid(&self) -> &str {
        non_empty(self.guid.as_deref()).unwrap_or(&self.link)
    }
}

/// The `<channel>`: feed metadata plus its items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    /// Base site URL, written as the channel `<link>`.
    pub site: String,
    /// Canonical URL of the feed itself, written as the self `atom:link`.
    #[serde(alias = "feedUrl")]
    pub feed_url: String,
    pub items: Vec<FeedItem>,
    /// Defaults to `en`.
    pub language: Option<String>,
    /// Pre-formed XML inserted verbatim before the items.
    ///
    /// This is a trust boundary: the value is NOT escaped. Callers must make
    /// sure it is well-formed and free of untrusted input before setting it.
    #[serde(alias = "customData")]
    pub custom_data: Option<String>,
}

impl FeedChannel {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        site: impl Into<String>,
        feed_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            site: site.into(),
            feed_url: feed_url.into(),
            ..Self::default()
        }
    }

    /// Names of mandatory fields that are empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("site", &self.site),
            ("feedUrl", &self.feed_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Treats `Some("")` the same as `None`.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_values_skip_empty() {
        let cat = Category::from(vec!["Tech", "", "News"]);
        assert_eq!(cat.values().collect::<Vec<_>>(), vec!["Tech", "News"]);

        assert_eq!(Category::from("").values().count(), 0);
        assert_eq!(Category::from("Solo").values().collect::<Vec<_>>(), vec!["Solo"]);
    }

    #[test]
    fn test_resolved_guid_falls_back_to_link() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        assert_eq!(item.resolved_guid(), "https://example.com/a");

        item.guid = Some(String::new());
        assert_eq!(item.resolved_guid(), "https://example.com/a");

        item.guid = Some("urn:uuid:1234".to_string());
        assert_eq!(item.resolved_guid(), "urn:uuid:1234");
    }

    #[test]
    fn test_is_renderable() {
        assert!(FeedItem::new("T", "https://x").is_renderable());
        assert!(!FeedItem::new("", "https://x").is_renderable());
        assert!(!FeedItem::new("T", "").is_renderable());
    }

    #[test]
    fn test_missing_fields_in_order() {
        let channel = FeedChannel::new("", "D", "", "");
        assert_eq!(channel.missing_fields(), vec!["title", "site", "feedUrl"]);

        let channel = FeedChannel::new("T", "D", "https://s", "https://s/f.xml");
        assert!(channel.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_field_error_message() {
        let err = FeedError::MissingRequiredField {
            fields: vec!["description", "feedUrl"],
        };
        assert_eq!(
            err.to_string(),
            "Missing required RSS options: description, feedUrl"
        );
    }

    #[test]
    fn test_deserialize_item_camel_case() {
        let item: FeedItem = serde_json::from_str(
            r#"{
                "title": "Episode 1",
                "link": "https://example.com/ep1",
                "pubDate": "2024-06-15T14:30:45Z",
                "category": ["Podcast", "Tech"],
                "enclosure": {"url": "https://example.com/ep1.mp3", "length": 123456, "type": "audio/mpeg"}
            }"#,
        )
        .unwrap();

        assert_eq!(
            item.pub_date,
            Some(Timestamp::Text("2024-06-15T14:30:45Z".to_string()))
        );
        assert_eq!(item.category, Some(Category::from(vec!["Podcast", "Tech"])));
        let enclosure = item.enclosure.unwrap();
        assert_eq!(enclosure.length, Some(123456));
        assert_eq!(enclosure.mime_type.as_deref(), Some("audio/mpeg"));
    }

    #[test]
    fn test_deserialize_unix_pub_date() {
        let item: FeedItem =
            serde_json::from_str(r#"{"title": "T", "link": "L", "pubDate": 1700000000}"#).unwrap();
        assert_eq!(item.pub_date, Some(Timestamp::Unix(1700000000)));
    }

    #[test]
    fn test_enclosure_length_lenient() {
        let parse = |json: &str| serde_json::from_str::<Enclosure>(json).unwrap().length;

        assert_eq!(parse(r#"{"url": "u", "length": 42}"#), Some(42));
        assert_eq!(parse(r#"{"url": "u", "length": -5}"#), None);
        assert_eq!(parse(r#"{"url": "u", "length": "1024"}"#), None);
        assert_eq!(parse(r#"{"url": "u", "length": 12.9}"#), Some(12));
        assert_eq!(parse(r#"{"url": "u", "length": null}"#), None);
        assert_eq!(parse(r#"{"url": "u", "length": [1]}"#), None);
        assert_eq!(parse(r#"{"url": "u"}"#), None);
    }

    #[test]
    fn test_deserialize_channel_from_toml() {
        let channel: FeedChannel = toml::from_str(
            r#"
title = "My Podcast"
description = "Latest episodes"
site = "https://example.com"
feedUrl = "https://example.com/feed.xml"
language = "en-GB"

[[items]]
title = "Episode 1"
link = "https://example.com/ep1"
category = "Podcast"
"#,
        )
        .unwrap();

        assert_eq!(channel.feed_url, "https://example.com/feed.xml");
        assert_eq!(channel.language.as_deref(), Some("en-GB"));
        assert_eq!(channel.items.len(), 1);
        assert_eq!(channel.items[0].category, Some(Category::from("Podcast")));
    }

    #[test]
    fn test_deserialize_channel_missing_fields_default_empty() {
        let channel: FeedChannel = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert_eq!(channel.missing_fields(), vec!["description", "site", "feedUrl"]);
    }
}
