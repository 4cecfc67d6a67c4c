//! Application State
//!
//! Wraps the [`Navigator`] with the pieces a terminal front-end needs: the
//! current view, scrolling, a notification line, and a channel through which
//! spawned network tasks report back.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client::{
    default_file_name, ApiClient, ClientError, ClientResult, ContentFetcher, Downloaded, Entry,
    FetchedPreview,
};
use crate::config::Config;
use crate::navigation::{self, Action, ListingRequest, Navigator, PreviewRequest};
use crate::tui::event::AppAction;
use crate::utils::format_file_size;

/// Current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Browser,
    Preview,
    Help,
}

/// Results from spawned network tasks
#[derive(Debug)]
pub enum AppEvent {
    ListingLoaded {
        generation: u64,
        result: ClientResult<Vec<Entry>>,
    },
    PreviewLoaded {
        generation: u64,
        result: ClientResult<FetchedPreview>,
    },
    DownloadFinished {
        name: String,
        result: ClientResult<Downloaded>,
    },
}

/// A one-line message shown above the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn failure(error: &ClientError) -> Self {
        // Retrying cannot fix a missing or expired token.
        let message = if error.is_auth() {
            format!("{} Set ID_TOKEN to a current identity token and restart.", error)
        } else {
            error.to_string()
        };
        Self {
            message,
            is_error: true,
        }
    }
}

pub struct App {
    pub config: Config,
    pub view: View,
    pub should_quit: bool,
    pub navigator: Navigator,
    pub notification: Option<Notification>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub tick: u64,

    api: ApiClient,
    fetcher: ContentFetcher,
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let api = ApiClient::from_config(&config.client);
        let fetcher = ContentFetcher::new(api.clone(), config.client.preview_max_bytes);
        let (event_tx, event_rx) = mpsc::channel(100);

        Self {
            config,
            view: View::Browser,
            should_quit: false,
            navigator: Navigator::new(),
            notification: None,
            scroll_offset: 0,
            max_scroll: 0,
            tick: 0,
            api,
            fetcher,
            event_rx,
            event_tx,
        }
    }

    /// Load the container list.
    pub fn start(&mut self) {
        info!("Browsing {}", self.api.base_url());
        let request = self.navigator.refresh();
        self.spawn_listing(request);
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Listing(request) => {
                self.view = self.content_view();
                self.spawn_listing(request);
            }
            Action::Preview(request) => {
                self.view = View::Preview;
                self.scroll_offset = 0;
                self.spawn_preview(request);
            }
            Action::None => {}
        }
    }

    fn spawn_listing(&self, request: ListingRequest) {
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = navigation::fetch_listing(&api, &request).await;
            tx.send(AppEvent::ListingLoaded {
                generation: request.generation,
                result,
            })
            .await
            .ok();
        });
    }

    fn spawn_preview(&self, request: PreviewRequest) {
        let fetcher = self.fetcher.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = navigation::fetch_preview(&fetcher, &request).await;
            tx.send(AppEvent::PreviewLoaded {
                generation: request.generation,
                result,
            })
            .await
            .ok();
        });
    }

    /// Drain results reported by network tasks
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ListingLoaded { generation, result } => {
                let failure = result.as_ref().err().cloned();
                if self.navigator.apply_listing(generation, result) {
                    self.notification = failure.map(|e| {
                        warn!("Listing failed: {}", e);
                        Notification::failure(&e)
                    });
                }
            }
            AppEvent::PreviewLoaded { generation, result } => {
                let failure = result.as_ref().err().cloned();
                if self.navigator.apply_preview(generation, result) {
                    if let Some(e) = failure {
                        warn!("Preview failed: {}", e);
                        self.notification = Some(Notification::failure(&e));
                    }
                }
            }
            AppEvent::DownloadFinished { name, result } => {
                self.notification = Some(match result {
                    Ok(done) => Notification::info(format!(
                        "Saved {} to {} ({})",
                        name,
                        done.path.display(),
                        format_file_size(done.bytes)
                    )),
                    Err(e) => {
                        warn!("Download of {} failed: {}", name, e);
                        Notification::failure(&e)
                    }
                });
            }
        }
    }

    pub fn handle_action(&mut self, action: AppAction) {
        if self.view == View::Help && !matches!(action, AppAction::Tick | AppAction::ForceQuit) {
            self.view = self.content_view();
            return;
        }

        match action {
            AppAction::Quit | AppAction::ForceQuit => self.should_quit = true,
            AppAction::Tick => self.tick = self.tick.wrapping_add(1),
            AppAction::ToggleHelp => self.view = View::Help,
            AppAction::Escape => {
                if self.view == View::Preview {
                    self.close_preview();
                } else {
                    self.notification = None;
                }
            }
            AppAction::Open => {
                if self.view == View::Browser {
                    if let Some(index) = self.navigator.selected() {
                        self.notification = None;
                        let action = self.navigator.open(index);
                        self.dispatch(action);
                    }
                }
            }
            AppAction::Back => {
                if self.view == View::Preview {
                    self.close_preview();
                } else if !self.navigator.location().is_root() {
                    let request = self.navigator.navigate_up();
                    self.dispatch(Action::Listing(request));
                }
            }
            AppAction::NavigateTo(index) => {
                let request = match index {
                    None => self.navigator.navigate_root(),
                    Some(i) if i < self.navigator.location().segments().len() => {
                        self.navigator.navigate_to(i)
                    }
                    Some(_) => return,
                };
                self.dispatch(Action::Listing(request));
            }
            AppAction::Refresh => {
                let request = self.navigator.retry();
                self.notification = None;
                self.dispatch(Action::Listing(request));
            }
            AppAction::Download => self.start_download(),
            AppAction::CopyLink => self.copy_link(),
            AppAction::ToggleRender => {
                self.navigator.toggle_render_mode();
                self.scroll_offset = 0;
            }
            AppAction::Up => self.move_by(-1),
            AppAction::Down => self.move_by(1),
            AppAction::PageUp => self.move_by(-10),
            AppAction::PageDown => self.move_by(10),
            AppAction::Home => self.move_by(i32::MIN),
            AppAction::End => self.move_by(i32::MAX),
        }
    }

    /// The file a download or copy applies to: the open preview, or the
    /// selected file in the listing.
    fn target_file(&self) -> Option<Entry> {
        match self.navigator.preview() {
            Some(preview) => Some(preview.entry.clone()),
            None => self.navigator.selected_entry().filter(|e| e.is_file()).cloned(),
        }
    }

    fn start_download(&mut self) {
        let Some(entry) = self.target_file() else {
            return;
        };
        let container = entry
            .container
            .clone()
            .or_else(|| self.navigator.location().container().map(str::to_string))
            .unwrap_or_default();
        let dest = self
            .config
            .client
            .download_dir
            .join(default_file_name(&entry.key));
        self.notification = Some(Notification::info(format!("Downloading {}...", entry.name)));

        let fetcher = self.fetcher.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.download(&container, &entry.key, &dest).await;
            tx.send(AppEvent::DownloadFinished {
                name: entry.name,
                result,
            })
            .await
            .ok();
        });
    }

    fn copy_link(&mut self) {
        let Some(url) = self.navigator.preview().and_then(|p| p.url.clone()) else {
            self.notification = Some(Notification::info("Open a file to get its download link"));
            return;
        };
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url));
        self.notification = Some(match copied {
            Ok(()) => Notification::info("Download link copied to clipboard"),
            Err(e) => {
                warn!("Clipboard unavailable: {}", e);
                Notification {
                    message: format!("Failed to copy link to clipboard: {}", e),
                    is_error: true,
                }
            }
        });
    }

    fn content_view(&self) -> View {
        if self.navigator.preview().is_some() {
            View::Preview
        } else {
            View::Browser
        }
    }

    fn close_preview(&mut self) {
        self.navigator.close_preview();
        self.view = View::Browser;
        self.scroll_offset = 0;
    }

    /// Move the selection in the browser, or scroll the preview.
    fn move_by(&mut self, delta: i32) {
        if self.view == View::Preview {
            let target = (self.scroll_offset as i64 + delta as i64).clamp(0, self.max_scroll as i64);
            self.scroll_offset = target as u16;
            return;
        }

        match delta {
            1 => self.navigator.select_next(),
            -1 => self.navigator.select_previous(),
            _ => {
                let len = self.navigator.entries().len();
                if len == 0 {
                    return;
                }
                let current = self.navigator.selected().unwrap_or(0) as i64;
                let target = (current + delta as i64).clamp(0, len as i64 - 1);
                self.navigator.select(target as usize);
            }
        }
    }

    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}
