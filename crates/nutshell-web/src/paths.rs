//! Page URLs built from document ids.
//!
//! Ids are free text (a log id embeds the log name), so each one is
//! percent-encoded as a single path segment. axum's `Path` extractor decodes
//! it again on the way in.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes that may not appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode `id` for use as one path segment.
pub fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

pub fn show_log(id: &str) -> String {
    format!("/logs/show/{}", segment(id))
}
