use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Problems found when re-reading a generated document.
#[derive(Debug, Error)]
pub enum WellFormedError {
    /// The XML tokenizer or entity decoder rejected the input.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// The document element is missing or is not `<rss>`.
    #[error("Document root must be <rss>, found {0}")]
    UnexpectedRoot(String),

    /// Content after the root element was closed.
    #[error("Content after the document root at byte {0}")]
    TrailingContent(u64),

    /// End of input with elements still open.
    #[error("{0} element(s) left unclosed")]
    Unclosed(usize),

    /// Text, CDATA or an attribute value holds a character XML 1.0 forbids.
    #[error("Character not allowed in XML at byte {position}")]
    IllegalChar { position: u64 },
}

/// XML 1.0 `Char` production, restricted to what a Rust `char` can hold.
fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

fn check_chars(text: &str, position: u64) -> Result<(), WellFormedError> {
    if text.chars().all(is_xml_char) {
        Ok(())
    } else {
        Err(WellFormedError::IllegalChar { position })
    }
}

/// Re-reads a feed document and checks that it is well-formed.
///
/// Checks balanced and matching tags, a single `<rss>` root, attribute
/// syntax, that every entity in text and attributes decodes, and that no
/// decoded text holds a character outside the XML 1.0 `Char` range. This is
/// a syntax check only; RSS vocabulary is not validated.
///
/// Returns the number of `<item>` elements found.
pub fn check_well_formed(document: &str) -> Result<usize, WellFormedError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().check_end_names = true;

    let mut depth: usize = 0;
    let mut root_seen = false;
    let mut items = 0;

    loop {
        let position = reader.buffer_position() as u64;
        let syntax = |e: &dyn std::fmt::Display| WellFormedError::Syntax {
            position,
            message: e.to_string(),
        };

        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    if root_seen {
                        return Err(WellFormedError::TrailingContent(position));
                    }
                    if e.name().as_ref() != b"rss" {
                        return Err(WellFormedError::UnexpectedRoot(
                            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        ));
                    }
                    root_seen = true;
                }
                if e.name().as_ref() == b"item" {
                    items += 1;
                }
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| syntax(&err))?;
                    let value = attr
                        .decode_and_unescape_value(reader.decoder())
                        .map_err(|err| syntax(&err))?;
                    check_chars(&value, position)?;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    return Err(if root_seen {
                        WellFormedError::TrailingContent(position)
                    } else {
                        WellFormedError::UnexpectedRoot(
                            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        )
                    });
                }
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| syntax(&err))?;
                    let value = attr
                        .decode_and_unescape_value(reader.decoder())
                        .map_err(|err| syntax(&err))?;
                    check_chars(&value, position)?;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) => {
                if depth == 0 {
                    if !e.iter().all(u8::is_ascii_whitespace) {
                        return Err(WellFormedError::TrailingContent(position));
                    }
                } else {
                    let text = e.unescape().map_err(|err| syntax(&err))?;
                    check_chars(&text, position)?;
                }
            }
            Ok(Event::CData(_)) if depth == 0 => {
                return Err(WellFormedError::TrailingContent(position));
            }
            Ok(Event::CData(e)) => {
                check_chars(&String::from_utf8_lossy(&e), position)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(syntax(&e)),
            _ => {}
        }
    }

    if depth > 0 {
        return Err(WellFormedError::Unclosed(depth));
    }
    if !root_seen {
        return Err(WellFormedError::UnexpectedRoot("nothing".to_string()));
    }

    tracing::trace!(items, "Document is well-formed");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_rss_accepted() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>a &amp; b</title>
<item><title>x</title></item>
<item><title>y</title><enclosure url="u?a=1&amp;b=2" length="0" type="image/jpeg" /></item>
</channel></rss>"#;
        assert_eq!(check_well_formed(doc).unwrap(), 2);
    }

    #[test]
    fn test_cdata_content_accepted() {
        let doc = "<rss><channel><item><content:encoded><![CDATA[<p>a]]&gt;b</p>]]></content:encoded></item></channel></rss>";
        assert_eq!(check_well_formed(doc).unwrap(), 1);
    }

    #[test]
    fn test_mismatched_end_tag_rejected() {
        let err = check_well_formed("<rss><channel></item></rss>").unwrap_err();
        assert!(matches!(err, WellFormedError::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_rejected() {
        assert!(check_well_formed("<rss><channel>").is_err());
    }

    #[test]
    fn test_bare_ampersand_rejected() {
        let err = check_well_formed("<rss><title>a & b</title></rss>").unwrap_err();
        assert!(matches!(err, WellFormedError::Syntax { .. }));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = check_well_formed("<feed></feed>").unwrap_err();
        assert!(matches!(err, WellFormedError::UnexpectedRoot(ref name) if name == "feed"));
    }

    #[test]
    fn test_trailing_element_rejected() {
        let err = check_well_formed("<rss></rss><rss></rss>").unwrap_err();
        assert!(matches!(err, WellFormedError::TrailingContent(_)));
    }

    #[test]
    fn test_nul_in_text_rejected() {
        let err = check_well_formed("<rss><title>a\u{0}b</title></rss>").unwrap_err();
        assert!(matches!(err, WellFormedError::IllegalChar { .. }));
    }

    #[test]
    fn test_control_char_reference_rejected() {
        let err = check_well_formed("<rss><title>a&#27;b</title></rss>").unwrap_err();
        assert!(matches!(err, WellFormedError::IllegalChar { .. }));
    }

    #[test]
    fn test_control_char_in_attribute_rejected() {
        let doc = "<rss><channel><enclosure url=\"u\u{1b}\" /></channel></rss>";
        let err = check_well_formed(doc).unwrap_err();
        assert!(matches!(err, WellFormedError::IllegalChar { .. }));
    }

    #[test]
    fn test_control_char_in_cdata_rejected() {
        let doc = "<rss><item><content:encoded><![CDATA[a\u{7}b]]></content:encoded></item></rss>";
        let err = check_well_formed(doc).unwrap_err();
        assert!(matches!(err, WellFormedError::IllegalChar { .. }));
    }

    #[test]
    fn test_allowed_whitespace_and_c1_accepted() {
        let doc = "<rss><title>a\tb\r\nc\u{85}d&#x9;</title></rss>";
        assert_eq!(check_well_formed(doc).unwrap(), 0);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(check_well_formed("").is_err());
    }
}
