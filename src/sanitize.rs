/*!
 * Removal of characters that XML 1.0 does not allow in text
 */

/// Whether `c` may appear in an XML 1.0 text node or attribute value
#[inline]
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drop every character that is not legal in XML text.
///
/// Characters are removed, never escaped or replaced, so the rest of the
/// text comes through untouched.
pub fn sanitize_for_xml(text: &str) -> String {
    if text.chars().all(is_xml_char) {
        return text.to_string();
    }
    text.chars().filter(|&c| is_xml_char(c)).collect()
}
