//! UI Rendering
//!
//! Main layout and rendering for the browser: breadcrumbs, entry list,
//! preview pane, status bar and help overlay.

use crate::client::PreviewContent;
use crate::navigation::{PreviewState, RenderMode};
use crate::preview::{is_previewable_file, language_for};
use crate::tui::app::{App, View};
use crate::tui::theme::{Icons, Theme};
use crate::utils::{format_date, format_file_size};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + breadcrumbs
            Constraint::Min(5),    // Listing or preview
            Constraint::Length(1), // Notification
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    match app.view {
        View::Preview => render_preview(frame, chunks[1], app),
        View::Browser | View::Help => render_browser(frame, chunks[1], app),
    }
    render_notification(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    if app.view == View::Help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let crumbs = app.navigator.breadcrumbs();
    let last = crumbs.len() - 1;

    let mut spans = vec![
        Span::raw("🪣 "),
        Span::styled("S3 Explorer", Theme::title()),
        Span::raw("  "),
    ];
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(format!(" {} ", Icons::SEPARATOR), Theme::text_dim()));
        }
        let style = if i == last {
            Theme::breadcrumb_current()
        } else {
            Theme::text_secondary()
        };
        spans.push(Span::styled(format!("[{}] ", i), Theme::text_dim()));
        spans.push(Span::styled(crumb.label.clone(), style));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );
    frame.render_widget(header, area);
}

fn render_browser(frame: &mut Frame, area: Rect, app: &App) {
    let nav = &app.navigator;
    let title = if nav.location().is_root() {
        " Buckets ".to_string()
    } else {
        format!(" {} item(s) ", nav.entries().len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    if nav.is_loading() {
        let loading = Paragraph::new(Line::from(vec![
            Span::styled(Icons::spinner(app.tick), Theme::active()),
            Span::styled(" Loading...", Theme::text_secondary()),
        ]))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if let Some(error) = nav.error() {
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", Icons::ERROR), Theme::error()),
                Span::styled(error.to_string(), Theme::error()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("[R]", Theme::shortcut_key()),
                Span::styled(" Retry", Theme::shortcut_desc()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    if nav.entries().is_empty() {
        let empty = if nav.location().is_root() {
            "No buckets available"
        } else {
            "This folder is empty"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(empty, Theme::text_dim())).block(block),
            area,
        );
        return;
    }

    let name_width = area.width.saturating_sub(34).max(12) as usize;
    let items: Vec<ListItem> = nav
        .entries()
        .iter()
        .map(|entry| {
            let icon = Icons::for_entry(entry.kind, entry.file_kind());
            let size = entry.size.map(format_file_size).unwrap_or_default();
            let date = entry
                .last_modified
                .as_deref()
                .map(format_date)
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", icon)),
                Span::styled(
                    format!("{:<width$}", truncate(&entry.name, name_width), width = name_width),
                    Theme::entry(entry.kind),
                ),
                Span::styled(format!("{:>10}  ", size), Theme::text_secondary()),
                Span::styled(date, Theme::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Theme::selected())
        .highlight_symbol(Icons::SELECTED);
    let mut state = ListState::default();
    state.select(nav.selected());
    frame.render_stateful_widget(list, area, &mut state);
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

fn render_preview(frame: &mut Frame, area: Rect, app: &App) {
    let Some(preview) = app.navigator.preview() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let entry = &preview.entry;
    let mut meta = vec![
        Span::styled(
            entry.size.map(format_file_size).unwrap_or_default(),
            Theme::text_secondary(),
        ),
        Span::raw("  "),
        Span::styled(language_for(&entry.name), Theme::text_dim()),
    ];
    if preview.text().is_some() {
        meta.push(Span::styled(
            format!(
                "  {} lines · {} chars",
                preview.line_count(),
                preview.char_count()
            ),
            Theme::text_dim(),
        ));
    }
    if preview.is_renderable() {
        let label = match preview.mode {
            RenderMode::Rendered => " RENDERED ",
            RenderMode::Source => " SOURCE ",
        };
        meta.push(Span::raw("  "));
        meta.push(Span::styled(label, Theme::badge_primary()));
    }

    let url_line = match &preview.url {
        Some(url) => Line::from(Span::styled(url.clone(), Theme::text_dim())),
        None => Line::from(""),
    };
    let header = Paragraph::new(vec![Line::from(meta), url_line])
        .block(
            Block::default()
                .title(format!(" {} ", entry.name))
                .title_style(Theme::title())
                .borders(Borders::ALL)
                .border_style(Theme::border_focused()),
        );
    frame.render_widget(header, chunks[0]);

    let body_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let body = match preview_body(preview) {
        PreviewBody::Loading => Paragraph::new(Line::from(vec![
            Span::styled(Icons::spinner(app.tick), Theme::active()),
            Span::styled(" Loading preview...", Theme::text_secondary()),
        ])),
        PreviewBody::Message(message, style) => {
            Paragraph::new(Span::styled(message, style)).alignment(Alignment::Center)
        }
        PreviewBody::Text(text) => Paragraph::new(text)
            .style(Theme::text())
            .wrap(Wrap { trim: false })
            .scroll((app.scroll_offset, 0)),
    };
    frame.render_widget(body.block(body_block), chunks[1]);
}

enum PreviewBody {
    Loading,
    Message(String, ratatui::style::Style),
    Text(String),
}

fn preview_body(preview: &PreviewState) -> PreviewBody {
    if preview.loading {
        return PreviewBody::Loading;
    }
    if let Some(error) = &preview.error {
        return PreviewBody::Message(error.to_string(), Theme::error());
    }
    match &preview.content {
        Some(PreviewContent::Text(text)) => match preview.rendered() {
            Some(markup) => PreviewBody::Text(markup_to_text(markup.as_str())),
            None => PreviewBody::Text(text.clone()),
        },
        Some(PreviewContent::TooLarge { limit }) => PreviewBody::Message(
            format!(
                "File is larger than {}; press d to download it.",
                format_file_size(*limit)
            ),
            Theme::warning(),
        ),
        Some(PreviewContent::Unavailable) => PreviewBody::Message(
            "Preview unavailable; press d to download the file or c to copy its link."
                .to_string(),
            Theme::warning(),
        ),
        Some(PreviewContent::NotText) | None if is_previewable_file(&preview.entry.name) => {
            PreviewBody::Message(
                "Images, video and PDF open in a browser. Press c to copy the link or d to download."
                    .to_string(),
                Theme::text_secondary(),
            )
        }
        Some(PreviewContent::NotText) | None => PreviewBody::Message(
            "No preview for this file type. Press d to download it.".to_string(),
            Theme::text_secondary(),
        ),
    }
}

/// Number of text lines the preview body will show, for scroll bounds.
pub fn preview_line_count(preview: &PreviewState) -> u16 {
    match preview_body(preview) {
        PreviewBody::Text(text) => text.lines().count().min(u16::MAX as usize) as u16,
        _ => 0,
    }
}

/// Flatten rendered markup into terminal text: block elements become line
/// breaks, list items get bullets, table cells are space separated.
pub fn markup_to_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    let mut pre_depth = 0usize;

    while let Some(start) = rest.find('<') {
        let between = &rest[..start];
        // Layout newlines between block tags carry no content outside <pre>.
        if pre_depth > 0 || !between.trim().is_empty() || !between.contains('\n') {
            out.push_str(between);
        }
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let (name, closing) = tag_name(&rest[start + 1..start + len]);
        if name == "pre" {
            pre_depth = if closing { pre_depth.saturating_sub(1) } else { pre_depth + 1 };
        }
        apply_tag(&mut out, &name, closing);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);

    let text = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    let text = text.split('\n').map(str::trim_end).collect::<Vec<_>>().join("\n");

    let mut collapsed = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        collapsed.push(ch);
    }
    collapsed.trim_end_matches('\n').to_string()
}

fn tag_name(tag: &str) -> (String, bool) {
    let closing = tag.starts_with('/');
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    (name, closing)
}

fn apply_tag(out: &mut String, name: &str, closing: bool) {
    match (name, closing) {
        ("br", _) => out.push('\n'),
        ("li", false) => {
            ensure_newline(out);
            out.push_str("• ");
        }
        ("td" | "th", true) => out.push_str("  "),
        ("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre" | "blockquote" | "table", false) => {
            ensure_newline(out)
        }
        ("div" | "tr" | "li", true) => out.push('\n'),
        (
            "p" | "pre" | "blockquote" | "ul" | "ol" | "table" | "h1" | "h2" | "h3" | "h4" | "h5"
            | "h6",
            true,
        ) => out.push_str("\n\n"),
        _ => {}
    }
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn render_notification(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(notification) = &app.notification {
        let style = if notification.is_error {
            Theme::error()
        } else {
            Theme::success()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", notification.message), style)),
            area,
        );
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.navigator.is_loading() {
        Span::styled(format!("{} Loading", Icons::spinner(app.tick)), Theme::active())
    } else {
        Span::styled("Ready", Theme::text_secondary())
    };

    let shortcuts = match app.view {
        View::Preview => vec![
            Span::styled(" [r]", Theme::shortcut_key()),
            Span::styled(" Source/Rendered ", Theme::shortcut_desc()),
            Span::styled("[↑/↓]", Theme::shortcut_key()),
            Span::styled(" Scroll ", Theme::shortcut_desc()),
            Span::styled("[d]", Theme::shortcut_key()),
            Span::styled(" Download ", Theme::shortcut_desc()),
            Span::styled("[c]", Theme::shortcut_key()),
            Span::styled(" Copy link ", Theme::shortcut_desc()),
            Span::styled("[Esc]", Theme::shortcut_key()),
            Span::styled(" Close ", Theme::shortcut_desc()),
            Span::styled("[?]", Theme::shortcut_key()),
            Span::styled(" Help", Theme::shortcut_desc()),
        ],
        _ => vec![
            Span::styled(" [Enter]", Theme::shortcut_key()),
            Span::styled(" Open ", Theme::shortcut_desc()),
            Span::styled("[Backspace]", Theme::shortcut_key()),
            Span::styled(" Up ", Theme::shortcut_desc()),
            Span::styled("[0-9]", Theme::shortcut_key()),
            Span::styled(" Jump ", Theme::shortcut_desc()),
            Span::styled("[q]", Theme::shortcut_key()),
            Span::styled(" Quit ", Theme::shortcut_desc()),
            Span::styled("[?]", Theme::shortcut_key()),
            Span::styled(" Help", Theme::shortcut_desc()),
        ],
    };

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let shortcut = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<13}", key), Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        shortcut("Enter / →", "Open bucket, folder or file"),
        shortcut("Backspace / ←", "Up one level / close preview"),
        shortcut("↑/↓  j/k", "Move selection / scroll preview"),
        shortcut("PageUp/Down", "Move by a page"),
        shortcut("0-9", "Jump to breadcrumb (0 = all buckets)"),
        shortcut("r / Tab", "Toggle source / rendered preview"),
        shortcut("R / F5", "Reload current listing"),
        shortcut("d", "Download file to DOWNLOAD_DIR"),
        shortcut("c / y", "Copy the open file's link"),
        shortcut("Esc", "Close preview / dismiss message"),
        shortcut("q / Ctrl+Q", "Quit"),
        shortcut("Ctrl+C", "Force quit"),
        shortcut("? / F1", "Show this help"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );
    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Entry, EntryKind};
    use crate::preview::render as render_markup;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_markup_to_text_markdown() {
        let markup = render_markup("# Title\n\n- one\n- two\n\nsome **bold** text", "n.md");
        assert_eq!(
            markup_to_text(markup.as_str()),
            "Title\n\n• one\n• two\n\nsome bold text"
        );
    }

    #[test]
    fn test_markup_to_text_table_and_entities() {
        let markup = render_markup("a,b\n<x>,&y", "t.csv");
        assert_eq!(markup_to_text(markup.as_str()), "a  b\n<x>  &y");
    }

    #[test]
    fn test_markup_to_text_pre_keeps_lines() {
        let markup = render_markup("{\"k\": [1]}", "d.json");
        assert_eq!(markup_to_text(markup.as_str()), "{\n  \"k\": [\n    1\n  ]\n}");
    }

    fn finished_preview(name: &str, content: PreviewContent) -> PreviewState {
        PreviewState {
            entry: Entry {
                name: name.to_string(),
                key: name.to_string(),
                kind: EntryKind::File,
                size: Some(10),
                last_modified: None,
                container: Some("reports".to_string()),
            },
            generation: 1,
            loading: false,
            url: Some("https://signed".to_string()),
            content: Some(content),
            error: None,
            mode: RenderMode::Source,
        }
    }

    fn message(body: PreviewBody) -> String {
        match body {
            PreviewBody::Message(text, _) => text,
            _ => panic!("expected a message"),
        }
    }

    #[test]
    fn test_media_and_binary_files_get_different_prompts() {
        let media = message(preview_body(&finished_preview("photo.png", PreviewContent::NotText)));
        assert!(media.contains("copy the link"));
        let binary = message(preview_body(&finished_preview("data.bin", PreviewContent::NotText)));
        assert_eq!(binary, "No preview for this file type. Press d to download it.");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-name", 6), "a-ver…");
    }

    #[tokio::test]
    async fn test_draws_without_panicking() {
        let mut config = crate::config::Config::default();
        config.client.api_base_url = "http://127.0.0.1:9".to_string();
        let mut app = App::new(config);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();
        app.view = View::Help;
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
