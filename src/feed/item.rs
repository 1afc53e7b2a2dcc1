use chrono::{DateTime, Utc};

use super::category::render_categories;
use super::cdata::wrap_cdata;
use super::date::{format_rfc822, format_timestamp};
use super::escape::Escaper;
use super::types::{non_empty, FeedError, FeedItem};

/// MIME type written when an enclosure does not name one.
pub const DEFAULT_ENCLOSURE_TYPE: &str = "image/jpeg";

/// Renders one `<item>` element.
///
/// Returns `Ok(None)` for an item without `title` or `link`. The assembler
/// filters those out already; the check is repeated here so any other caller
/// gets the same exclusion rule.
///
/// `now` stands in for a missing `pubDate`.
///
/// # Errors
///
/// [`FeedError::InvalidDate`] when `pubDate` cannot be resolved.
pub fn render_item(
    item: &FeedItem,
    escaper: &Escaper,
    now: DateTime<Utc>,
) -> Result<Option<String>, FeedError> {
    if !item.is_renderable() {
        return Ok(None);
    }

    let guid = item.resolved_guid();
    let is_permalink = guid == item.link;
    let pub_date = match &item.pub_date {
        Some(ts) => format_timestamp(ts)?,
        None => format_rfc822(&now),
    };

    let mut parts = vec![
        "  <item>".to_string(),
        format!("    <title>{}</title>", escaper.escape(&item.title)),
        format!("    <link>{}</link>", escaper.escape(&item.link)),
        format!("    <pubDate>{pub_date}</pubDate>"),
        format!(
            "    <guid isPermaLink=\"{is_permalink}\">{}</guid>",
            escaper.escape(guid)
        ),
    ];

    if let Some(description) = non_empty(item.description.as_deref()) {
        parts.push(format!(
            "    <description>{}</description>",
            escaper.escape(description)
        ));
    }

    if let Some(content) = non_empty(item.content.as_deref()) {
        parts.push(format!(
            "    <content:encoded>{}</content:encoded>",
            wrap_cdata(content)
        ));
    }

    let categories = render_categories(item.category.as_ref(), escaper);
    if !categories.is_empty() {
        parts.push(categories);
    }

    if let Some(enclosure) = item.enclosure.as_ref().filter(|e| !e.url.is_empty()) {
        let mime_type =
            non_empty(enclosure.mime_type.as_deref()).unwrap_or(DEFAULT_ENCLOSURE_TYPE);
        let length = enclosure.length.filter(|len| *len >= 0).unwrap_or(0);
        parts.push(format!(
            "    <enclosure url=\"{}\" length=\"{length}\" type=\"{}\" />",
            escaper.escape(&enclosure.url),
            escaper.escape(mime_type)
        ));
    }

    parts.push("  </item>".to_string());
    Ok(Some(parts.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::{Category, Enclosure, Timestamp};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 45).unwrap()
    }

    fn render(item: &FeedItem) -> Option<String> {
        render_item(item, &Escaper::unbounded(), now()).unwrap()
    }

    #[test]
    fn test_minimal_item() {
        let item = FeedItem::new("Hello", "https://example.com/hello");
        assert_eq!(
            render(&item).unwrap(),
            "  <item>\n\
             \x20   <title>Hello</title>\n\
             \x20   <link>https://example.com/hello</link>\n\
             \x20   <pubDate>Sat, 15 Jun 2024 14:30:45 GMT</pubDate>\n\
             \x20   <guid isPermaLink=\"true\">https://example.com/hello</guid>\n\
             \x20 </item>"
        );
    }

    #[test]
    fn test_full_item_field_order() {
        let item = FeedItem {
            title: "Episode <1>".to_string(),
            link: "https://example.com/ep1?a=1&b=2".to_string(),
            pub_date: Some(Timestamp::from("2024-01-02T03:04:05Z")),
            guid: Some("ep-1".to_string()),
            description: Some("It's \"great\"".to_string()),
            content: Some("<p>Show notes</p>".to_string()),
            category: Some(Category::from(vec!["Podcast", "Tech"])),
            enclosure: Some(Enclosure {
                url: "https://example.com/ep1.mp3".to_string(),
                length: Some(123456),
                mime_type: Some("audio/mpeg".to_string()),
            }),
        };

        let expected = [
            "  <item>",
            "    <title>Episode &lt;1&gt;</title>",
            "    <link>https://example.com/ep1?a=1&amp;b=2</link>",
            "    <pubDate>Tue, 02 Jan 2024 03:04:05 GMT</pubDate>",
            "    <guid isPermaLink=\"false\">ep-1</guid>",
            "    <description>It&apos;s &quot;great&quot;</description>",
            "    <content:encoded><![CDATA[<p>Show notes</p>]]></content:encoded>",
            "    <category>Podcast</category>",
            "    <category>Tech</category>",
            "    <enclosure url=\"https://example.com/ep1.mp3\" length=\"123456\" type=\"audio/mpeg\" />",
            "  </item>",
        ]
        .join("\n");

        assert_eq!(render(&item).unwrap(), expected);
    }

    #[test]
    fn test_missing_title_or_link_excluded() {
        assert_eq!(render(&FeedItem::new("", "https://example.com/x")), None);
        assert_eq!(render(&FeedItem::new("Title", "")), None);
    }

    #[test]
    fn test_guid_equal_to_link_is_permalink() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.guid = Some("https://example.com/a".to_string());
        assert!(render(&item)
            .unwrap()
            .contains("<guid isPermaLink=\"true\">https://example.com/a</guid>"));
    }

    #[test]
    fn test_empty_guid_falls_back_to_link() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.guid = Some(String::new());
        assert!(render(&item)
            .unwrap()
            .contains("<guid isPermaLink=\"true\">https://example.com/a</guid>"));
    }

    #[test]
    fn test_empty_optional_fields_skipped() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.description = Some(String::new());
        item.content = Some(String::new());
        item.category = Some(Category::from(vec!["", ""]));
        item.enclosure = Some(Enclosure::new(""));

        let xml = render(&item).unwrap();
        assert!(!xml.contains("<description>"));
        assert!(!xml.contains("<content:encoded>"));
        assert!(!xml.contains("<category>"));
        assert!(!xml.contains("<enclosure"));
    }

    #[test]
    fn test_enclosure_defaults() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.enclosure = Some(Enclosure {
            url: "https://example.com/a.jpg".to_string(),
            length: Some(-5),
            mime_type: None,
        });
        assert!(render(&item).unwrap().contains(
            "<enclosure url=\"https://example.com/a.jpg\" length=\"0\" type=\"image/jpeg\" />"
        ));

        item.enclosure = Some(Enclosure::new("https://example.com/b.png"));
        assert!(render(&item).unwrap().contains("length=\"0\" type=\"image/jpeg\""));
    }

    #[test]
    fn test_content_terminator_escaped() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.content = Some("code: a[b[0]]>c".to_string());
        assert!(render(&item)
            .unwrap()
            .contains("<content:encoded><![CDATA[code: a[b[0]]&gt;c]]></content:encoded>"));
    }

    #[test]
    fn test_invalid_pub_date_is_error() {
        let mut item = FeedItem::new("T", "https://example.com/a");
        item.pub_date = Some(Timestamp::from("not a date"));
        let err = render_item(&item, &Escaper::unbounded(), now()).unwrap_err();
        assert!(matches!(err, FeedError::InvalidDate(_)));
    }
}
