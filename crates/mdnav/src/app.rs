//! The browser: a document pane, a TOC pane, history commands and link routing.

use std::path::PathBuf;
use std::sync::Arc;

use mdnav_core::help::HelpBar;
use mdnav_core::help::HelpBarOptions;
use mdnav_core::input::InputEvent;
use mdnav_core::input::KeyCode;
use mdnav_core::input::KeyEvent;
use mdnav_core::input::MouseEvent;
use mdnav_core::keymap;
use mdnav_core::keymap::Binding;
use mdnav_core::keymap::Keymap;
use mdnav_core::text::CodeHighlighter;
use mdnav_core::theme::Theme;
use mdnav_markdown::HeadingId;
use mdnav_markdown::toc::TocAction;
use mdnav_markdown::toc::TocView;
use mdnav_markdown::view::DocumentView;
use mdnav_markdown::view::DocumentViewOptions;
use mdnav_markdown::view::ViewAction;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use tracing::debug;
use tracing::info;
use url::Url;

use crate::session::DocumentSession;
use crate::session::LoadOutcome;
use crate::source::DocumentSource;
use crate::source::FsSource;
use crate::ui;
use crate::ui::AppLayout;
use crate::ui::StatusLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleToc,
    Back,
    Forward,
    Reload,
    SwitchFocus,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Toc,
    Document,
}

#[derive(Clone, Debug)]
pub struct BrowserOptions {
    pub show_toc: bool,
    /// Upper bound for the TOC pane width, border included.
    pub toc_max_width: u16,
    pub theme: Theme,
    pub view: DocumentViewOptions,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            show_toc: true,
            toc_max_width: 40,
            theme: Theme::default(),
            view: DocumentViewOptions::default(),
        }
    }
}

/// A location that failed to load, shown in place of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorPanel {
    pub location: PathBuf,
    pub message: String,
}

pub fn default_keymap() -> Keymap<Command> {
    Keymap::new()
        .bind(
            Binding::new("t", "toc", vec![keymap::key_char('t')]),
            Command::ToggleToc,
        )
        .bind(
            Binding::new(
                "b",
                "back",
                vec![keymap::key_char('b'), keymap::key(KeyCode::Backspace)],
            ),
            Command::Back,
        )
        .bind(
            Binding::new("f", "forward", vec![keymap::key_char('f')]),
            Command::Forward,
        )
        .bind(
            Binding::new("r", "reload", vec![keymap::key_char('r')]),
            Command::Reload,
        )
        .bind(
            Binding::new("Tab", "focus", vec![keymap::key(KeyCode::Tab)]),
            Command::SwitchFocus,
        )
        .bind(
            Binding::new(
                "q",
                "quit",
                vec![keymap::key_char('q'), keymap::key(KeyCode::Esc)],
            ),
            Command::Quit,
        )
}

/// The browser application state. Feed it [`InputEvent`]s and render it into a buffer.
pub struct BrowserApp<S = FsSource> {
    session: DocumentSession<S>,
    view: DocumentView,
    toc: TocView,
    keymap: Keymap<Command>,
    help: HelpBar,
    theme: Theme,
    show_toc: bool,
    toc_max_width: u16,
    focus: Focus,
    error: Option<ErrorPanel>,
    status: Option<String>,
    quit: bool,
}

impl<S: DocumentSource> BrowserApp<S> {
    pub fn new(session: DocumentSession<S>, options: BrowserOptions) -> Self {
        let keymap = default_keymap();
        let help = HelpBar::with_options(
            keymap.bindings(),
            HelpBarOptions {
                style: options.theme.text_muted,
                key_style: options.theme.accent.add_modifier(Modifier::BOLD),
                disabled_style: options.theme.text_muted.add_modifier(Modifier::DIM),
                ..Default::default()
            },
        );
        let mut app = Self {
            session,
            view: DocumentView::with_options(options.view),
            toc: TocView::new(),
            keymap,
            help,
            theme: options.theme,
            show_toc: options.show_toc,
            toc_max_width: options.toc_max_width,
            focus: Focus::Document,
            error: None,
            status: None,
            quit: false,
        };
        app.sync_history_hints();
        app
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>) {
        self.view.set_highlighter(highlighter);
    }

    pub fn session(&self) -> &DocumentSession<S> {
        &self.session
    }

    pub fn view(&self) -> &DocumentView {
        &self.view
    }

    pub fn toc(&self) -> &TocView {
        &self.toc
    }

    pub fn help(&self) -> &HelpBar {
        &self.help
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn show_toc(&self) -> bool {
        self.show_toc
    }

    pub fn error(&self) -> Option<&ErrorPanel> {
        self.error.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Navigates to `target` (relative to the current document). Returns whether it loaded.
    pub fn open(&mut self, target: &str) -> bool {
        let outcome = self.session.go(target);
        self.apply(outcome)
    }

    /// Handles one event. Returns whether the screen needs a redraw.
    pub fn handle_event(&mut self, area: Rect, event: InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => self.handle_key(area, key),
            InputEvent::Mouse(mouse) => self.handle_mouse(area, mouse),
            InputEvent::Resize(_, _) => true,
        }
    }

    pub fn run(&mut self, command: Command) -> bool {
        match command {
            Command::ToggleToc => {
                self.show_toc = !self.show_toc;
                if !self.show_toc {
                    self.focus = Focus::Document;
                }
            }
            Command::Back => match self.session.back() {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => self.status = Some("Already at the first page".to_string()),
            },
            Command::Forward => match self.session.forward() {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => self.status = Some("Already at the last page".to_string()),
            },
            Command::Reload => {
                let y = self.view.state.y;
                if let Some(outcome) = self.session.reload()
                    && self.apply(outcome)
                {
                    self.view.scroll_to_offset(y);
                }
            }
            Command::SwitchFocus => {
                self.focus = match self.focus {
                    Focus::Toc => Focus::Document,
                    Focus::Document if self.show_toc => Focus::Toc,
                    Focus::Document => Focus::Document,
                };
            }
            Command::Quit => self.quit = true,
        }
        true
    }

    /// Routes an activated link: external URLs are reported, `#fragment` jumps within the page,
    /// anything else is a document path relative to the current one.
    pub fn follow_link(&mut self, target: &str) -> bool {
        if is_external(target) {
            info!(link = target, "not following external link");
            self.status = Some(format!("External link: {target}"));
            return true;
        }

        let (path, fragment) = match target.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (target, None),
        };
        if !path.is_empty() && !self.open(path) {
            return true;
        }
        match fragment {
            Some(fragment) if !fragment.is_empty() => {
                self.jump_to_fragment(fragment);
                true
            }
            _ => !path.is_empty(),
        }
    }

    /// Scrolls to the heading whose slug (or `block{n}` id) is `fragment`.
    pub fn jump_to_fragment(&mut self, fragment: &str) -> bool {
        let wanted = fragment.to_lowercase();
        let found = self
            .view
            .document()
            .toc
            .iter()
            .find(|entry| slug(&entry.text) == wanted || entry.id.to_string() == fragment)
            .map(|entry| entry.id);
        match found {
            Some(id) => self.select_heading(id),
            None => {
                debug!(fragment, "no heading for fragment");
                self.status = Some(format!("No heading matches #{fragment}"));
                false
            }
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let layout = self.layout(area);

        if let (Some(frame), Some(inner)) = (layout.toc_frame, layout.toc) {
            ui::render_toc_frame(frame, buf, &self.theme);
            self.toc
                .render_ref(inner, buf, &self.theme, self.focus == Focus::Toc);
        }

        match &self.error {
            Some(panel) => ui::render_error(
                layout.document,
                buf,
                &self.theme,
                &panel.location,
                &panel.message,
            ),
            None => self.view.render_ref(layout.document, buf, &self.theme),
        }

        let navigator = self.session.navigator();
        let location = navigator.location();
        StatusLine {
            location: &location,
            history: navigator
                .position()
                .map(|position| (position, navigator.history().len())),
            percent: self.error.is_none().then(|| self.view.state.percent_y()).flatten(),
            message: self.status.as_deref(),
        }
        .render_ref(layout.status, buf, &self.theme);

        self.help.render_ref(layout.help, buf);
    }

    pub fn layout(&self, area: Rect) -> AppLayout {
        let toc_width = self
            .show_toc
            .then(|| ui::toc_width(self.toc.preferred_width(), area.width, self.toc_max_width));
        ui::split(area, toc_width)
    }

    fn apply(&mut self, outcome: LoadOutcome) -> bool {
        self.sync_history_hints();
        match outcome {
            LoadOutcome::Loaded(loaded) => {
                self.toc.set_entries(loaded.document.toc.clone());
                self.view.set_document(loaded.document);
                self.error = None;
                self.status = None;
                true
            }
            LoadOutcome::Failed { location, error } => {
                self.toc.set_entries(Vec::new());
                self.view.clear();
                self.error = Some(ErrorPanel {
                    location,
                    message: error.chain(),
                });
                self.status = None;
                self.focus = Focus::Document;
                false
            }
            LoadOutcome::Superseded => false,
        }
    }

    /// Dims `back`/`forward` in the help bar at either end of history.
    fn sync_history_hints(&mut self) {
        let navigator = self.session.navigator();
        let (back, forward) = (navigator.can_go_back(), navigator.can_go_forward());
        self.help.set_enabled("b", back);
        self.help.set_enabled("f", forward);
    }

    fn handle_key(&mut self, area: Rect, key: KeyEvent) -> bool {
        let layout = self.layout(area);
        if let Some(command) = self.keymap.action_for(&key)
            && (command != Command::SwitchFocus || layout.toc.is_some())
        {
            return self.run(command);
        }
        if self.error.is_some() {
            return false;
        }

        match (self.focus, layout.toc) {
            (Focus::Toc, Some(toc_area)) => {
                let action = self.toc.handle_event(toc_area, InputEvent::Key(key));
                self.on_toc(action)
            }
            _ => {
                let action = self.view.handle_event(layout.document, InputEvent::Key(key));
                self.on_view(action)
            }
        }
    }

    fn handle_mouse(&mut self, area: Rect, mouse: MouseEvent) -> bool {
        let layout = self.layout(area);
        let position = (mouse.x, mouse.y).into();
        if let Some(toc_area) = layout.toc
            && toc_area.contains(position)
        {
            if mouse.is_left_click() {
                self.focus = Focus::Toc;
            }
            let action = self.toc.handle_event(toc_area, InputEvent::Mouse(mouse));
            return self.on_toc(action) || mouse.is_left_click();
        }
        if self.error.is_some() || !layout.document.contains(position) {
            return false;
        }
        if mouse.is_left_click() {
            self.focus = Focus::Document;
        }
        let action = self.view.handle_event(layout.document, InputEvent::Mouse(mouse));
        self.on_view(action)
    }

    fn on_view(&mut self, action: ViewAction) -> bool {
        match action {
            ViewAction::None => false,
            ViewAction::Redraw => true,
            ViewAction::FollowLink(target) => self.follow_link(&target),
        }
    }

    fn on_toc(&mut self, action: TocAction) -> bool {
        match action {
            TocAction::None => false,
            TocAction::Redraw => true,
            TocAction::Selected(id) => self.select_heading(id),
        }
    }

    fn select_heading(&mut self, id: HeadingId) -> bool {
        if let Some(index) = self.toc.entries().iter().position(|entry| entry.id == id) {
            self.toc.select(index);
        }
        self.view.scroll_to_heading(id)
    }
}

/// Whether `target` carries a URL scheme. Single-letter schemes are Windows drive letters.
pub fn is_external(target: &str) -> bool {
    Url::parse(target).is_ok_and(|url| url.scheme().len() > 1)
}

/// GitHub-style heading anchor: lowercase, spaces to `-`, punctuation dropped.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else if ch.is_whitespace() {
            out.push('-');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_follow_github_anchors() {
        assert_eq!(slug("Getting Started"), "getting-started");
        assert_eq!(slug("  What's new?  "), "whats-new");
        assert_eq!(slug("API v2_beta"), "api-v2_beta");
    }

    #[test]
    fn schemes_mark_external_links() {
        assert!(is_external("https://example.com/a.md"));
        assert!(is_external("mailto:someone@example.com"));
        assert!(!is_external("docs/intro.md"));
        assert!(!is_external("../up.md#top"));
        assert!(!is_external("#section"));
        assert!(!is_external("C:/notes/a.md"));
    }

    #[test]
    fn keymap_covers_browser_commands() {
        let keymap = default_keymap();
        assert_eq!(
            keymap.action_for(&keymap::key_char('t')),
            Some(Command::ToggleToc)
        );
        assert_eq!(
            keymap.action_for(&keymap::key(KeyCode::Backspace)),
            Some(Command::Back)
        );
        assert_eq!(
            keymap.action_for(&keymap::key_char('f')),
            Some(Command::Forward)
        );
        assert_eq!(
            keymap.action_for(&keymap::key_char('r')),
            Some(Command::Reload)
        );
        assert_eq!(
            keymap.action_for(&keymap::key(KeyCode::Esc)),
            Some(Command::Quit)
        );
        assert_eq!(keymap.action_for(&keymap::key_char('j')), None);
    }
}
