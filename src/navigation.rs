//! Browsing state: where the user is, what is listed, what is previewed.
//!
//! The [`Navigator`] is a plain state machine. Transitions return the request
//! that must be issued (a listing or a preview) tagged with a generation
//! number; results are handed back with that number and only the latest
//! generation is applied, so a slow response for an abandoned path never
//! overwrites a newer one.

use tracing::debug;

use crate::client::{
    containers_to_entries, normalize_listing, ApiClient, ClientError, ClientResult,
    ContentFetcher, Entry, EntryKind, FetchedPreview, PreviewContent,
};
use crate::preview::{is_renderable_file, render, Markup};
use crate::storage::DELIMITER;

/// Path from the root: empty at the root, otherwise `[container, folder...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn container(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Key prefix inside the container, with a trailing delimiter unless empty.
    pub fn prefix(&self) -> String {
        match self.segments.get(1..) {
            Some(folders) if !folders.is_empty() => {
                format!("{}{}", folders.join(DELIMITER), DELIMITER)
            }
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub generation: u64,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub generation: u64,
    pub container: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Listing(ListingRequest),
    Preview(PreviewRequest),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Source,
    Rendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Target for [`Navigator::navigate_to`]; `None` is the root control.
    pub index: Option<usize>,
}

/// The file currently open in the preview pane.
#[derive(Debug, Clone)]
pub struct PreviewState {
    pub entry: Entry,
    pub generation: u64,
    pub loading: bool,
    pub url: Option<String>,
    pub content: Option<PreviewContent>,
    pub error: Option<ClientError>,
    pub mode: RenderMode,
}

impl PreviewState {
    fn new(entry: Entry, generation: u64) -> Self {
        let mode = if is_renderable_file(&entry.name) {
            RenderMode::Rendered
        } else {
            RenderMode::Source
        };
        Self {
            entry,
            generation,
            loading: true,
            url: None,
            content: None,
            error: None,
            mode,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(PreviewContent::text)
    }

    pub fn is_renderable(&self) -> bool {
        is_renderable_file(&self.entry.name)
    }

    /// Lines of the loaded text, counting a trailing newline as opening a line.
    pub fn line_count(&self) -> usize {
        match self.text() {
            Some(text) if !text.is_empty() => text.split('\n').count(),
            _ => 0,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text().map_or(0, |text| text.chars().count())
    }

    /// Markup for the rendered view; `None` in source mode or without text.
    pub fn rendered(&self) -> Option<Markup> {
        if self.mode != RenderMode::Rendered || !self.is_renderable() {
            return None;
        }
        self.text().map(|text| render(text, &self.entry.name))
    }
}

#[derive(Debug, Default)]
pub struct Navigator {
    location: Location,
    entries: Vec<Entry>,
    selected: Option<usize>,
    loading: bool,
    error: Option<ClientError>,
    listing_generation: u64,
    preview: Option<PreviewState>,
    preview_generation: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    /// Listing request for the current location.
    pub fn refresh(&mut self) -> ListingRequest {
        self.listing_generation += 1;
        self.loading = true;
        self.error = None;
        ListingRequest {
            generation: self.listing_generation,
            location: self.location.clone(),
        }
    }

    /// Re-issue the listing after a failure.
    pub fn retry(&mut self) -> ListingRequest {
        self.refresh()
    }

    pub fn enter_container(&mut self, name: &str) -> ListingRequest {
        self.change_location(vec![name.to_string()])
    }

    pub fn enter_folder(&mut self, name: &str) -> ListingRequest {
        let mut segments = self.location.segments.clone();
        segments.push(name.to_string());
        self.change_location(segments)
    }

    /// Truncate the path to `index + 1` segments.
    pub fn navigate_to(&mut self, index: usize) -> ListingRequest {
        let mut segments = self.location.segments.clone();
        segments.truncate(index + 1);
        self.change_location(segments)
    }

    pub fn navigate_root(&mut self) -> ListingRequest {
        self.change_location(Vec::new())
    }

    /// Go up one level; at the root this just refreshes.
    pub fn navigate_up(&mut self) -> ListingRequest {
        let mut segments = self.location.segments.clone();
        segments.pop();
        self.change_location(segments)
    }

    fn change_location(&mut self, segments: Vec<String>) -> ListingRequest {
        debug!("Navigating to /{}", segments.join(DELIMITER));
        self.location = Location { segments };
        self.entries.clear();
        self.selected = None;
        self.close_preview();
        self.refresh()
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let next = self.selected.map_or(0, |i| (i + 1).min(self.entries.len() - 1));
        self.selected = Some(next);
    }

    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Activate the entry at `index`: descend into containers and folders,
    /// open files in the preview pane.
    pub fn open(&mut self, index: usize) -> Action {
        let Some(entry) = self.entries.get(index).cloned() else {
            return Action::None;
        };
        match entry.kind {
            EntryKind::Container => Action::Listing(self.enter_container(&entry.name)),
            EntryKind::Folder => Action::Listing(self.enter_folder(&entry.name)),
            EntryKind::File => {
                self.selected = Some(index);
                Action::Preview(self.begin_preview(entry))
            }
        }
    }

    fn begin_preview(&mut self, entry: Entry) -> PreviewRequest {
        self.preview_generation += 1;
        let container = entry
            .container
            .clone()
            .or_else(|| self.location.container().map(str::to_string))
            .unwrap_or_default();
        let request = PreviewRequest {
            generation: self.preview_generation,
            container,
            key: entry.key.clone(),
        };
        self.preview = Some(PreviewState::new(entry, self.preview_generation));
        request
    }

    /// Apply a listing result. Returns `false` when it was superseded.
    pub fn apply_listing(&mut self, generation: u64, result: ClientResult<Vec<Entry>>) -> bool {
        if generation != self.listing_generation {
            debug!(
                "Discarding stale listing (generation {}, current {})",
                generation, self.listing_generation
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                self.entries.clear();
                self.error = Some(e);
            }
        }
        self.selected = (!self.entries.is_empty()).then_some(0);
        true
    }

    /// Apply a preview result. Returns `false` when the preview was closed or
    /// replaced in the meantime.
    pub fn apply_preview(&mut self, generation: u64, result: ClientResult<FetchedPreview>) -> bool {
        let Some(preview) = self.preview.as_mut().filter(|p| p.generation == generation) else {
            debug!("Discarding stale preview (generation {})", generation);
            return false;
        };
        preview.loading = false;
        match result {
            Ok(fetched) => {
                preview.url = Some(fetched.url);
                preview.content = Some(fetched.content);
            }
            Err(e) => preview.error = Some(e),
        }
        true
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn toggle_render_mode(&mut self) {
        if let Some(preview) = self.preview.as_mut().filter(|p| p.is_renderable()) {
            preview.mode = match preview.mode {
                RenderMode::Source => RenderMode::Rendered,
                RenderMode::Rendered => RenderMode::Source,
            };
        }
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        std::iter::once(Breadcrumb {
            label: "All Buckets".to_string(),
            index: None,
        })
        .chain(
            self.location
                .segments
                .iter()
                .enumerate()
                .map(|(i, segment)| Breadcrumb {
                    label: segment.clone(),
                    index: Some(i),
                }),
        )
        .collect()
    }
}

/// Issue the listing for `request` and normalize it into entries.
pub async fn fetch_listing(api: &ApiClient, request: &ListingRequest) -> ClientResult<Vec<Entry>> {
    match request.location.container() {
        None => Ok(containers_to_entries(&api.fetch_buckets().await?)),
        Some(container) => {
            let prefix = request.location.prefix();
            let listing = api.fetch_objects(container, &prefix).await?;
            Ok(normalize_listing(container, &prefix, &listing))
        }
    }
}

pub async fn fetch_preview(
    fetcher: &ContentFetcher,
    request: &PreviewRequest,
) -> ClientResult<FetchedPreview> {
    fetcher.preview(&request.container, &request.key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind) -> Entry {
        Entry {
            name: name.to_string(),
            key: name.to_string(),
            kind,
            size: None,
            last_modified: None,
            container: Some("a".to_string()),
        }
    }

    fn file(key: &str) -> Entry {
        Entry {
            name: key.rsplit('/').next().unwrap().to_string(),
            key: key.to_string(),
            kind: EntryKind::File,
            size: Some(10),
            last_modified: None,
            container: Some("a".to_string()),
        }
    }

    fn loaded(nav: &mut Navigator, entries: Vec<Entry>) {
        let request = nav.refresh();
        assert!(nav.apply_listing(request.generation, Ok(entries)));
    }

    #[test]
    fn test_location_prefix() {
        let mut nav = Navigator::new();
        assert_eq!(nav.location().prefix(), "");
        assert_eq!(nav.location().container(), None);
        nav.enter_container("a");
        assert_eq!(nav.location().prefix(), "");
        nav.enter_folder("b");
        nav.enter_folder("c");
        assert_eq!(nav.location().container(), Some("a"));
        assert_eq!(nav.location().prefix(), "b/c/");
    }

    #[test]
    fn test_root_to_folder_and_back() {
        let mut nav = Navigator::new();
        loaded(&mut nav, vec![entry("a", EntryKind::Container)]);

        let Action::Listing(req) = nav.open(0) else {
            panic!("expected listing");
        };
        assert_eq!(req.location.segments(), ["a"]);
        assert!(nav.apply_listing(req.generation, Ok(vec![entry("b", EntryKind::Folder), file("x.md")])));
        assert!(nav.preview().is_none());

        nav.open(1);
        assert!(nav.preview().is_some());

        let Action::Listing(req) = nav.open(0) else {
            panic!("expected listing");
        };
        assert_eq!(req.location.segments(), ["a", "b"]);
        assert_eq!(req.location.prefix(), "b/");
        assert!(nav.preview().is_none());
        assert_eq!(nav.selected(), None);
        nav.apply_listing(req.generation, Ok(vec![file("b/y.txt")]));

        let req = nav.navigate_root();
        assert!(req.location.is_root());
        assert!(nav.location().is_root());
        assert!(nav.entries().is_empty());
        assert!(nav.is_loading());
        assert!(nav.preview().is_none());
        assert_eq!(nav.selected(), None);
    }

    #[test]
    fn test_each_transition_issues_one_request() {
        let mut nav = Navigator::new();
        let first = nav.enter_container("a");
        let second = nav.enter_folder("b");
        let third = nav.navigate_to(0);
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(third.generation, second.generation + 1);
        assert_eq!(third.location.segments(), ["a"]);
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let mut nav = Navigator::new();
        let slow = nav.enter_container("a");
        let fast = nav.enter_container("b");

        assert!(nav.apply_listing(fast.generation, Ok(vec![file("new.txt")])));
        assert!(!nav.apply_listing(slow.generation, Ok(vec![file("old.txt")])));
        assert_eq!(nav.entries()[0].name, "new.txt");
        assert_eq!(nav.location().container(), Some("b"));
    }

    #[test]
    fn test_listing_error_and_retry() {
        let mut nav = Navigator::new();
        let req = nav.enter_container("a");
        nav.apply_listing(req.generation, Err(ClientError::Server(500)));
        assert_eq!(nav.error(), Some(&ClientError::Server(500)));
        assert!(!nav.is_loading());

        let retry = nav.retry();
        assert_eq!(retry.location, req.location);
        assert!(nav.error().is_none());
        assert!(nav.is_loading());
    }

    #[test]
    fn test_preview_flow() {
        let mut nav = Navigator::new();
        nav.enter_container("a");
        loaded(&mut nav, vec![file("notes.md"), file("main.rs")]);

        let Action::Preview(req) = nav.open(0) else {
            panic!("expected preview");
        };
        assert_eq!(req.container, "a");
        assert_eq!(req.key, "notes.md");
        assert_eq!(nav.selected(), Some(0));
        let preview = nav.preview().unwrap();
        assert!(preview.loading);
        assert_eq!(preview.mode, RenderMode::Rendered);

        assert!(nav.apply_preview(
            req.generation,
            Ok(FetchedPreview {
                url: "https://signed/notes.md".to_string(),
                content: PreviewContent::Text("# T\nline\n".to_string()),
            })
        ));
        let preview = nav.preview().unwrap();
        assert!(!preview.loading);
        assert_eq!(preview.line_count(), 3);
        assert_eq!(preview.char_count(), 9);
        assert_eq!(preview.rendered().unwrap().as_str(), "<h1>T</h1>\n<p>line</p>\n");

        nav.toggle_render_mode();
        assert_eq!(nav.preview().unwrap().mode, RenderMode::Source);
        assert!(nav.preview().unwrap().rendered().is_none());
    }

    #[test]
    fn test_source_only_files_do_not_toggle() {
        let mut nav = Navigator::new();
        nav.enter_container("a");
        loaded(&mut nav, vec![file("main.rs")]);
        nav.open(0);
        assert_eq!(nav.preview().unwrap().mode, RenderMode::Source);
        nav.toggle_render_mode();
        assert_eq!(nav.preview().unwrap().mode, RenderMode::Source);
    }

    #[test]
    fn test_stale_preview_is_discarded() {
        let mut nav = Navigator::new();
        nav.enter_container("a");
        loaded(&mut nav, vec![file("one.txt"), file("two.txt")]);

        let Action::Preview(first) = nav.open(0) else {
            panic!("expected preview");
        };
        let Action::Preview(second) = nav.open(1) else {
            panic!("expected preview");
        };
        let late = FetchedPreview {
            url: "u1".to_string(),
            content: PreviewContent::Text("one".to_string()),
        };
        assert!(!nav.apply_preview(first.generation, Ok(late)));
        assert_eq!(nav.preview().unwrap().entry.name, "two.txt");
        assert!(nav.preview().unwrap().loading);

        nav.close_preview();
        assert!(!nav.apply_preview(second.generation, Err(ClientError::AccessDenied)));
    }

    #[test]
    fn test_breadcrumbs() {
        let mut nav = Navigator::new();
        nav.enter_container("a");
        nav.enter_folder("b");
        let crumbs = nav.breadcrumbs();
        let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["All Buckets", "a", "b"]);
        assert_eq!(crumbs[0].index, None);
        assert_eq!(crumbs[2].index, Some(1));
    }

    #[test]
    fn test_selection_bounds() {
        let mut nav = Navigator::new();
        nav.select_next();
        assert_eq!(nav.selected(), None);
        loaded(&mut nav, vec![file("a.txt"), file("b.txt")]);
        assert_eq!(nav.selected(), Some(0));
        nav.select_next();
        nav.select_next();
        assert_eq!(nav.selected(), Some(1));
        nav.select_previous();
        nav.select_previous();
        assert_eq!(nav.selected(), Some(0));
        nav.select(7);
        assert_eq!(nav.selected(), Some(0));
    }

    #[test]
    fn test_open_out_of_range() {
        let mut nav = Navigator::new();
        assert_eq!(nav.open(3), Action::None);
    }
}
