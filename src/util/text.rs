use std::borrow::Cow;

/// Returns true for characters that must not survive into XML character data.
///
/// Covers the C0 range (except tab, newline and carriage return), DEL, and the
/// C1 range U+0080..=U+009F.
#[inline]
fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Strip control characters that are illegal or meaningless in XML text.
///
/// Removes:
/// - C0 controls: U+0000-U+0008, U+000B-U+000C, U+000E-U+001F
/// - DEL (U+007F) and the C1 block U+0080-U+009F
///
/// Preserves: tab (U+0009), newline (U+000A), carriage return (U+000D).
///
/// Unlike a terminal sanitizer this never looks at what follows an ESC byte;
/// only the control character itself is dropped, the surrounding text stays.
///
/// Returns `Cow::Borrowed` when the input contains no control characters (common case).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    // Fast path: C0 and DEL are single bytes, C1 chars always start with 0xC2.
    let needs_strip = s.as_bytes().iter().any(|&b| b < 0x20 || b == 0x7f || b == 0xc2)
        && s.chars().any(is_stripped_control);

    if !needs_strip {
        return Cow::Borrowed(s);
    }

    Cow::Owned(s.chars().filter(|&c| !is_stripped_control(c)).collect())
}
