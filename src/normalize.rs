//! Text cleanup applied to every value that enters a KBART row.
//!
//! MARC subfield values routinely carry decomposed diacritics, stray line
//! breaks from record editors and invisible control or formatting
//! characters. [`normalize`] folds all of that into a single clean line.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n\t]+").expect("valid line break pattern");

    /// Controls, format characters, private use, unassigned code points and
    /// every separator other than ASCII space.
    static ref NON_PRINTABLE: Regex =
        Regex::new(r"[\p{Cc}\p{Cf}\p{Co}\p{Cn}\p{Zl}\p{Zp}\p{Zs}--\x20]")
            .expect("valid non-printable pattern");
}

/// Clean a text value for output.
///
/// - `None` or empty input gives an empty string
/// - Unicode canonical composition (NFC)
/// - Surrounding whitespace trimmed
/// - Each run of CR, LF or tab collapsed into one space
/// - Non-printable characters removed
///
/// The result is stable: normalizing it again returns it unchanged.
///
/// # Examples
///
/// ```
/// use marc_kbart::normalize;
///
/// assert_eq!(normalize(Some("  Cafe\u{301}\r\n\tMenu ")), "Café Menu");
/// assert_eq!(normalize(None), "");
/// ```
#[must_use]
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return String::new();
    };

    let composed: String = text.nfc().collect();
    let collapsed = LINE_BREAKS.replace_all(composed.trim(), " ");
    let printable = NON_PRINTABLE.replace_all(&collapsed, "");

    // Stripping may expose edge whitespace or leave combining marks next to
    // their base character.
    printable.trim().nfc().collect()
}
