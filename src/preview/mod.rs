//! File preview pipeline
//!
//! - [`format`]: classify a file name into a [`FileKind`]
//! - [`render`]: turn downloaded text into display markup, per [`Format`]
//! - [`markdown`] and [`notebook`]: the two structured renderers
//!
//! Rendering never fails: every format has a textual fallback for malformed
//! input, so callers always get a [`Markup`] back.

pub mod format;
pub mod markdown;
pub mod notebook;
pub mod render;

pub use format::{
    detect_kind, extension, is_previewable_file, is_renderable_file, is_text_file,
    language_for, FileKind,
};
pub use render::{render, Format, Markup};

use pulldown_cmark_escape::FmtWriter;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(FmtWriter(&mut out), text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
