use std::borrow::Cow;

use crate::util::strip_control_chars;

/// The sequence that closes a CDATA section.
const CDATA_END: &str = "]]>";
/// How a literal terminator is written inside the section.
const CDATA_END_ESCAPED: &str = "]]&gt;";

/// Prepares text for embedding inside `<![CDATA[ ... ]]>`.
///
/// 1. Previously escaped terminators (`]]&gt;`) are restored to `]]>`.
/// 2. Control characters are stripped (tab, newline and CR survive).
/// 3. Every remaining `]]>` is written as `]]&gt;`.
///
/// Step 1 makes the function idempotent: sanitizing already-sanitized text
/// returns it unchanged instead of escaping the escape.
pub fn sanitize_cdata(content: &str) -> Cow<'_, str> {
    // Fast path: checked after stripping, since removing a control char can join "]]"
    let clean = strip_control_chars(content);
    if !clean.contains("]]") {
        return clean;
    }

    let restored = content.replace(CDATA_END_ESCAPED, CDATA_END);
    let stripped = strip_control_chars(&restored);
    Cow::Owned(stripped.replace(CDATA_END, CDATA_END_ESCAPED))
}

/// Wraps sanitized content in a CDATA section.
pub fn wrap_cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", sanitize_cdata(content))
}
