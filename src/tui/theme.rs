//! Theme and Styling
//!
//! Colors, styles and glyphs for the browser.

use ratatui::style::{Color, Modifier, Style};

use crate::client::EntryKind;
use crate::preview::FileKind;

/// Application theme
pub struct Theme;

impl Theme {
    // === Primary Colors ===

    /// Primary accent color (cyan/teal)
    pub const ACCENT: Color = Color::Rgb(0, 212, 255);

    /// Completed actions (green)
    pub const SUCCESS: Color = Color::Rgb(34, 197, 94);

    /// Oversized or unavailable previews (amber)
    pub const WARNING: Color = Color::Rgb(251, 191, 36);

    /// Failed requests (red)
    pub const ERROR: Color = Color::Rgb(239, 68, 68);

    // === Text Colors ===

    /// Primary text color
    pub const TEXT_PRIMARY: Color = Color::Rgb(229, 229, 229);

    /// Secondary text color (muted)
    pub const TEXT_SECONDARY: Color = Color::Rgb(161, 161, 161);

    /// Dimmed text, hints and metadata
    pub const TEXT_DIM: Color = Color::Rgb(82, 82, 82);

    // === Background Colors ===

    /// Highlighted/selected background
    pub const BG_HIGHLIGHT: Color = Color::Rgb(38, 38, 38);

    // === Border Colors ===

    /// Unfocused pane border
    pub const BORDER: Color = Color::Rgb(51, 51, 51);

    /// Border of the pane that takes input
    pub const BORDER_FOCUSED: Color = Color::Rgb(59, 130, 246);

    // === Entry Colors ===

    /// Buckets (orange)
    pub const CONTAINER: Color = Color::Rgb(251, 146, 60);

    /// Folders (blue)
    pub const FOLDER: Color = Color::Rgb(96, 165, 250);

    // === Styles ===

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::TEXT_DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn heading() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::ERROR)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::BORDER_FOCUSED)
    }

    /// Selected row in the entry list
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .bg(Self::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Name style for a listing row
    pub fn entry(kind: EntryKind) -> Style {
        match kind {
            EntryKind::Container => Style::default()
                .fg(Self::CONTAINER)
                .add_modifier(Modifier::BOLD),
            EntryKind::Folder => Style::default()
                .fg(Self::FOLDER)
                .add_modifier(Modifier::BOLD),
            EntryKind::File => Self::text(),
        }
    }

    /// Current (last) breadcrumb
    pub fn breadcrumb_current() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Loading indicator
    pub fn active() -> Style {
        Style::default()
            .fg(Self::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    /// Badge for the current render mode
    pub fn badge_primary() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }
}

pub struct Icons;

impl Icons {
    pub const SEPARATOR: &'static str = "›";
    pub const SELECTED: &'static str = "▶";
    pub const ERROR: &'static str = "✗";
    pub const SPINNER: [&'static str; 4] = ["◐", "◓", "◑", "◒"];

    pub fn for_entry(kind: EntryKind, file_kind: Option<FileKind>) -> &'static str {
        match kind {
            EntryKind::Container => "🪣",
            EntryKind::Folder => "📁",
            EntryKind::File => match file_kind.unwrap_or(FileKind::Other) {
                FileKind::Image => "🖼",
                FileKind::Video => "🎬",
                FileKind::Document => "📄",
                FileKind::Spreadsheet => "📊",
                FileKind::Presentation => "📽",
                FileKind::Archive => "📦",
                FileKind::Audio => "🎵",
                FileKind::Code => "📝",
                FileKind::Notebook => "📓",
                FileKind::Other => "📃",
            },
        }
    }

    pub fn spinner(tick: u64) -> &'static str {
        Self::SPINNER[(tick % Self::SPINNER.len() as u64) as usize]
    }
}
