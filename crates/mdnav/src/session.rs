//! Loading documents: resolve a location, read it, build it.

use std::path::Path;
use std::path::PathBuf;

use mdnav_markdown::BuildOptions;
use mdnav_markdown::Document;
use mdnav_markdown::parse_document;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::LoadError;
use crate::navigator::Navigator;
use crate::source::DocumentSource;
use crate::source::FsSource;

/// A pending load for one location.
///
/// Only the most recently issued request may mount its document; completing an older one yields
/// [`LoadOutcome::Superseded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    location: PathBuf,
    generation: u64,
}

impl LoadRequest {
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
pub struct LoadedDocument {
    pub location: PathBuf,
    pub document: Document,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadedDocument),
    Failed { location: PathBuf, error: LoadError },
    Superseded,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Ties a [`Navigator`] to a [`DocumentSource`] and the document builder.
///
/// Navigation always updates history before reading, so a location that fails to load stays in
/// history and can be reloaded or navigated away from.
#[derive(Debug)]
pub struct DocumentSession<S = FsSource> {
    navigator: Navigator,
    source: S,
    options: BuildOptions,
    generation: u64,
}

impl DocumentSession<FsSource> {
    pub fn from_fs(options: BuildOptions) -> Self {
        Self::new(Navigator::new(), FsSource, options)
    }
}

impl<S: DocumentSource> DocumentSession<S> {
    pub fn new(navigator: Navigator, source: S, options: BuildOptions) -> Self {
        Self {
            navigator,
            source,
            options,
            generation: 0,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BuildOptions) {
        self.options = options;
    }

    pub fn go(&mut self, target: &str) -> LoadOutcome {
        let request = self.begin_go(target);
        self.load(request)
    }

    /// `None` when already at the oldest entry.
    pub fn back(&mut self) -> Option<LoadOutcome> {
        let request = self.begin_back()?;
        Some(self.load(request))
    }

    /// `None` when already at the newest entry.
    pub fn forward(&mut self) -> Option<LoadOutcome> {
        let request = self.begin_forward()?;
        Some(self.load(request))
    }

    /// Re-reads the current location. `None` before the first navigation.
    pub fn reload(&mut self) -> Option<LoadOutcome> {
        let request = self.begin_reload()?;
        Some(self.load(request))
    }

    pub fn begin_go(&mut self, target: &str) -> LoadRequest {
        let location = self.navigator.go(target);
        debug!(link = target, location = %location.display(), "navigate");
        self.issue(location)
    }

    pub fn begin_back(&mut self) -> Option<LoadRequest> {
        if !self.navigator.back() {
            return None;
        }
        let location = self.navigator.location();
        debug!(location = %location.display(), "back");
        Some(self.issue(location))
    }

    pub fn begin_forward(&mut self) -> Option<LoadRequest> {
        if !self.navigator.forward() {
            return None;
        }
        let location = self.navigator.location();
        debug!(location = %location.display(), "forward");
        Some(self.issue(location))
    }

    pub fn begin_reload(&mut self) -> Option<LoadRequest> {
        let location = self.navigator.current()?.to_path_buf();
        debug!(location = %location.display(), "reload");
        Some(self.issue(location))
    }

    /// Reads the text a request points at.
    pub fn fetch(&self, request: &LoadRequest) -> Result<String, LoadError> {
        self.source.read(&request.location)
    }

    /// Builds fetched text into a document, unless a newer request was issued meanwhile.
    pub fn complete(&self, request: LoadRequest, text: Result<String, LoadError>) -> LoadOutcome {
        if request.generation != self.generation {
            debug!(
                location = %request.location.display(),
                generation = request.generation,
                latest = self.generation,
                "dropping superseded load"
            );
            return LoadOutcome::Superseded;
        }

        let LoadRequest { location, .. } = request;
        let built = text.and_then(|markdown| {
            parse_document(&markdown, &self.options).map_err(|source| LoadError::Malformed {
                path: location.clone(),
                source,
            })
        });
        match built {
            Ok(document) => {
                info!(
                    location = %location.display(),
                    nodes = document.node_count(),
                    headings = document.toc.len(),
                    "loaded document"
                );
                LoadOutcome::Loaded(LoadedDocument { location, document })
            }
            Err(error) => {
                warn!(location = %location.display(), error = %error.chain(), "load failed");
                LoadOutcome::Failed { location, error }
            }
        }
    }

    fn issue(&mut self, location: PathBuf) -> LoadRequest {
        self.generation += 1;
        LoadRequest {
            location,
            generation: self.generation,
        }
    }

    fn load(&self, request: LoadRequest) -> LoadOutcome {
        let text = self.fetch(&request);
        self.complete(request, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySource {
        files: HashMap<PathBuf, String>,
    }

    impl MemorySource {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.files.insert(PathBuf::from(path), text.to_string());
            self
        }
    }

    impl DocumentSource for MemorySource {
        fn read(&self, path: &Path) -> Result<String, LoadError> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound {
                    path: path.to_path_buf(),
                })
        }
    }

    fn session(source: MemorySource) -> DocumentSession<MemorySource> {
        DocumentSession::new(
            Navigator::with_base_dir("/docs"),
            source,
            BuildOptions::default(),
        )
    }

    fn loaded(outcome: LoadOutcome) -> LoadedDocument {
        match outcome {
            LoadOutcome::Loaded(doc) => doc,
            other => panic!("expected a loaded document, got {other:?}"),
        }
    }

    #[test]
    fn go_resolves_reads_and_builds() {
        let mut s = session(MemorySource::default().with("/docs/a.md", "# Title\n\nBody\n"));
        let doc = loaded(s.go("a.md"));
        assert_eq!(doc.location, PathBuf::from("/docs/a.md"));
        assert_eq!(doc.document.toc.len(), 1);
        assert_eq!(doc.document.toc[0].text, "Title");
    }

    #[test]
    fn failed_load_keeps_history_entry() {
        let mut s = session(MemorySource::default().with("/docs/a.md", "a"));
        assert!(s.go("a.md").is_loaded());
        match s.go("missing.md") {
            LoadOutcome::Failed { location, error } => {
                assert_eq!(location, PathBuf::from("/docs/missing.md"));
                assert!(matches!(error, LoadError::NotFound { .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(s.navigator().history().len(), 2);
        let back = loaded(s.back().expect("can go back"));
        assert_eq!(back.location, PathBuf::from("/docs/a.md"));
    }

    #[test]
    fn back_and_forward_at_the_ends_do_not_load() {
        let mut s = session(MemorySource::default().with("/docs/a.md", "a"));
        assert!(s.back().is_none());
        assert!(s.reload().is_none());
        s.go("a.md");
        assert!(s.back().is_none());
        assert!(s.forward().is_none());
    }

    #[test]
    fn reload_reads_current_location_without_touching_history() {
        let mut s = session(MemorySource::default().with("/docs/a.md", "# A\n"));
        s.go("a.md");
        let doc = loaded(s.reload().expect("has a current location"));
        assert_eq!(doc.location, PathBuf::from("/docs/a.md"));
        assert_eq!(s.navigator().history().len(), 1);
    }

    #[test]
    fn stale_request_is_superseded() {
        let mut s = session(
            MemorySource::default()
                .with("/docs/a.md", "a")
                .with("/docs/b.md", "b"),
        );
        let first = s.begin_go("a.md");
        let second = s.begin_go("b.md");
        let first_text = s.fetch(&first);
        assert!(matches!(
            s.complete(first, first_text),
            LoadOutcome::Superseded
        ));
        let second_text = s.fetch(&second);
        let doc = loaded(s.complete(second, second_text));
        assert_eq!(doc.location, PathBuf::from("/docs/b.md"));
    }

    #[test]
    fn relative_links_resolve_against_current_document() {
        let mut s = session(
            MemorySource::default()
                .with("/docs/guide/intro.md", "intro")
                .with("/docs/faq.md", "faq"),
        );
        s.go("guide/intro.md");
        let doc = loaded(s.go("../faq.md"));
        assert_eq!(doc.location, PathBuf::from("/docs/faq.md"));
    }
}
