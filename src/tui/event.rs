//! Event Handling
//!
//! Maps keyboard and timer events to browser actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Quit immediately (Ctrl+C)
    ForceQuit,
    /// Open the selected container, folder or file
    Open,
    /// Go up one level, or close the preview
    Back,
    /// Close overlays and the preview
    Escape,
    /// Jump to a breadcrumb; `None` is the root
    NavigateTo(Option<usize>),
    /// Re-issue the current listing
    Refresh,
    /// Switch between source and rendered preview
    ToggleRender,
    /// Save the open or selected file to the download directory
    Download,
    /// Put the open file's signed link on the clipboard
    CopyLink,
    ToggleHelp,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Timer tick for the loading spinner
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Try to get the next action without blocking
    pub fn try_next(&mut self) -> Option<AppAction> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }
}

fn map_event(event: Event) -> Option<AppAction> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key_event(key),
        _ => None,
    }
}

/// Map a key event to an app action
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::Refresh),

        (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Esc => Some(AppAction::Escape),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(AppAction::Open),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Some(AppAction::Back),
            KeyCode::Up | KeyCode::Char('k') => Some(AppAction::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(AppAction::Down),
            KeyCode::PageUp => Some(AppAction::PageUp),
            KeyCode::PageDown => Some(AppAction::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(AppAction::Home),
            KeyCode::End | KeyCode::Char('G') => Some(AppAction::End),
            KeyCode::Char('r') | KeyCode::Tab => Some(AppAction::ToggleRender),
            KeyCode::Char('R') | KeyCode::F(5) => Some(AppAction::Refresh),
            KeyCode::Char('d') => Some(AppAction::Download),
            KeyCode::Char('c') | KeyCode::Char('y') => Some(AppAction::CopyLink),
            KeyCode::Char('?') | KeyCode::F(1) => Some(AppAction::ToggleHelp),
            // `0` is the root, `1` the container, `2` its first folder...
            KeyCode::Char(c @ '0'..='9') => {
                let depth = c as usize - '0' as usize;
                Some(AppAction::NavigateTo(depth.checked_sub(1)))
            }
            _ => None,
        },

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppAction::ForceQuit)
        );
        assert_eq!(map_key_event(key(KeyCode::Char('q'))), Some(AppAction::Quit));
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_key_event(key(KeyCode::Enter)), Some(AppAction::Open));
        assert_eq!(map_key_event(key(KeyCode::Backspace)), Some(AppAction::Back));
        assert_eq!(map_key_event(key(KeyCode::Char('j'))), Some(AppAction::Down));
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(AppAction::End)
        );
    }

    #[test]
    fn test_file_action_keys() {
        assert_eq!(map_key_event(key(KeyCode::Char('d'))), Some(AppAction::Download));
        assert_eq!(map_key_event(key(KeyCode::Char('c'))), Some(AppAction::CopyLink));
        assert_eq!(map_key_event(key(KeyCode::Char('y'))), Some(AppAction::CopyLink));
    }

    #[test]
    fn test_breadcrumb_digits() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('0'))),
            Some(AppAction::NavigateTo(None))
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('3'))),
            Some(AppAction::NavigateTo(Some(2)))
        );
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(map_key_event(key(KeyCode::Char('x'))), None);
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)),
            None
        );
    }
}
