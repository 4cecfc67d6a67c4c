//! Markdown rendering for previews.
//!
//! Parsing is done by pulldown-cmark with no extensions enabled. The event
//! stream is narrowed to headers, emphasis, code spans and fences, links,
//! lists, blockquotes and line breaks before it reaches the HTML writer.
//! Raw HTML in the source is shown as text, and links with a scheme other
//! than http, https or mailto lose their anchor.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

pub fn render(source: &str) -> String {
    let mut dropped_link = false;
    let events = Parser::new_ext(source, Options::empty())
        .filter_map(move |event| narrow(event, &mut dropped_link));

    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, events);
    out
}

fn narrow<'a>(event: Event<'a>, dropped_link: &mut bool) -> Option<Event<'a>> {
    match event {
        Event::Start(Tag::Link { ref dest_url, .. }) if !is_safe_url(dest_url) => {
            *dropped_link = true;
            None
        }
        Event::End(TagEnd::Link) if *dropped_link => {
            *dropped_link = false;
            None
        }
        Event::Start(Tag::HtmlBlock) => Some(Event::Start(Tag::Paragraph)),
        Event::End(TagEnd::HtmlBlock) => Some(Event::End(TagEnd::Paragraph)),
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        // Every source line break is kept.
        Event::SoftBreak => Some(Event::HardBreak),
        // Images keep their alt text only.
        Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) | Event::Rule => None,
        other => Some(other),
    }
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    match lower.split_once(':') {
        Some((scheme, _)) if !scheme.contains('/') => {
            matches!(scheme, "http" | "https" | "mailto")
        }
        _ => true,
    }
}
