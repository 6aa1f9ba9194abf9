use std::sync::Arc;

use mdnav_core::input::InputEvent;
use mdnav_core::input::KeyCode;
use mdnav_core::input::KeyEvent;
use mdnav_core::input::MouseEvent;
use mdnav_core::input::MouseEventKind;
use mdnav_core::keymap;
use mdnav_core::render;
use mdnav_core::text::CodeHighlighter;
use mdnav_core::theme::Theme;
use mdnav_core::viewport::ScrollBindings;
use mdnav_core::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::layout::LaidOutDocument;
use crate::layout::LayoutOptions;
use crate::layout::LinkRegion;
use crate::layout::layout_document;
use crate::node::Document;
use crate::node::HeadingId;

/// Keys that move link focus and activate the focused link.
#[derive(Clone, Debug)]
pub struct LinkBindings {
    pub next: Vec<KeyEvent>,
    pub prev: Vec<KeyEvent>,
    pub follow: Vec<KeyEvent>,
}

impl Default for LinkBindings {
    fn default() -> Self {
        Self {
            next: vec![keymap::key(KeyCode::Tab), keymap::key_char('n')],
            prev: vec![keymap::key(KeyCode::BackTab), keymap::key_char('p')],
            follow: vec![keymap::key(KeyCode::Enter)],
        }
    }
}

#[derive(Clone, Debug)]
pub struct DocumentViewOptions {
    pub layout: LayoutOptions,
    pub show_scrollbar: bool,
    pub padding_left: u16,
    pub padding_right: u16,
    pub scroll: ScrollBindings,
    pub links: LinkBindings,
    /// Lines moved per mouse wheel notch.
    pub wheel_step: i32,
}

impl Default for DocumentViewOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            show_scrollbar: true,
            padding_left: 1,
            padding_right: 1,
            scroll: ScrollBindings::default(),
            links: LinkBindings::default(),
            wheel_step: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Redraw,
    /// A link or image was activated; carries its href/src verbatim.
    FollowLink(String),
}

/// Scrollable view over a built [`Document`].
///
/// Layout is cached per content width and recomputed lazily on the next render after the width,
/// the document or the highlighter changes. Heading jumps requested before the first layout are
/// applied once the layout exists.
#[derive(Default)]
pub struct DocumentView {
    document: Document,
    rendered: LaidOutDocument,
    cached_width: Option<u16>,
    pub state: ViewportState,
    options: DocumentViewOptions,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    focused_link: Option<usize>,
    pending_anchor: Option<HeadingId>,
    pending_offset: Option<u32>,
}

impl DocumentView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DocumentViewOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Replaces the document and scrolls back to the top.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.invalidate();
        self.focused_link = None;
        self.pending_anchor = None;
        self.pending_offset = None;
        self.state.to_top();
        self.state.x = 0;
    }

    pub fn clear(&mut self) {
        self.set_document(Document::default());
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>) {
        self.highlighter = highlighter;
        self.invalidate();
    }

    pub fn options(&self) -> &DocumentViewOptions {
        &self.options
    }

    /// Scrolls so the heading's first line is at the top of the viewport.
    ///
    /// Returns `false` when the document has no such heading.
    pub fn scroll_to_heading(&mut self, id: HeadingId) -> bool {
        if !self.document.toc.iter().any(|entry| entry.id == id) {
            return false;
        }
        match self.rendered.anchors.get(&id) {
            Some(line) if self.cached_width.is_some() => {
                self.state.scroll_to_line(*line as u32);
                self.pending_anchor = None;
            }
            _ => self.pending_anchor = Some(id),
        }
        true
    }

    /// Scrolls to line `y`, clamped to the content. Before the next layout exists the offset is
    /// held and applied once the line count is known.
    pub fn scroll_to_offset(&mut self, y: u32) {
        if self.cached_width.is_some() {
            self.state.scroll_to_line(y);
            self.pending_offset = None;
        } else {
            self.pending_offset = Some(y);
        }
    }

    /// The focused link, if any.
    pub fn focused_link(&self) -> Option<&LinkRegion> {
        self.focused_link.and_then(|i| self.rendered.links.get(i))
    }

    pub fn focus_next_link(&mut self) -> bool {
        let count = self.rendered.links.len();
        if count == 0 {
            return false;
        }
        let next = match self.focused_link {
            Some(i) => (i + 1) % count,
            None => self.first_link_from_viewport(),
        };
        self.focus_link(next);
        true
    }

    pub fn focus_prev_link(&mut self) -> bool {
        let count = self.rendered.links.len();
        if count == 0 {
            return false;
        }
        let prev = match self.focused_link {
            Some(i) => (i + count - 1) % count,
            None => count - 1,
        };
        self.focus_link(prev);
        true
    }

    /// Updates viewport size for `area` (minus scrollbar and padding).
    pub fn set_viewport(&mut self, area: Rect) {
        let inner = self.content_area(area);
        self.state.set_viewport(inner.width, inner.height);
    }

    pub fn handle_event(&mut self, area: Rect, event: InputEvent) -> ViewAction {
        match event {
            InputEvent::Key(key) => self.handle_key(&key),
            InputEvent::Mouse(mouse) => self.handle_mouse(area, mouse),
            InputEvent::Resize(_, _) => {
                self.set_viewport(area);
                ViewAction::Redraw
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ViewAction {
        let links = &self.options.links;
        if matches_any(&links.follow, key) {
            return match self.focused_link() {
                Some(region) => ViewAction::FollowLink(region.target.clone()),
                None => ViewAction::None,
            };
        }
        if matches_any(&links.next, key) {
            return redraw_if(self.focus_next_link());
        }
        if matches_any(&links.prev, key) {
            return redraw_if(self.focus_prev_link());
        }
        let Some(action) = self.options.scroll.action_for(key) else {
            return ViewAction::None;
        };
        self.options.scroll.apply(&mut self.state, action);
        ViewAction::Redraw
    }

    fn handle_mouse(&mut self, area: Rect, mouse: MouseEvent) -> ViewAction {
        if area.width == 0 || area.height == 0 {
            return ViewAction::None;
        }
        self.set_viewport(area);
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.state.scroll_y_by(-self.options.wheel_step);
                ViewAction::Redraw
            }
            MouseEventKind::ScrollDown => {
                self.state.scroll_y_by(self.options.wheel_step);
                ViewAction::Redraw
            }
            _ if mouse.is_left_click() => {
                let inner = self.content_area(area);
                if !inner.contains((mouse.x, mouse.y).into()) {
                    return ViewAction::None;
                }
                let line = self.state.y as usize + (mouse.y - inner.y) as usize;
                let col = self.state.x as usize + (mouse.x - inner.x) as usize;
                let hit = self
                    .rendered
                    .links
                    .iter()
                    .position(|region| region.contains(line, col));
                match hit {
                    Some(index) => {
                        self.focused_link = Some(index);
                        ViewAction::FollowLink(self.rendered.links[index].target.clone())
                    }
                    None => ViewAction::None,
                }
            }
            _ => ViewAction::None,
        }
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (body, scrollbar_x) = if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };

        self.set_viewport(area);
        let inner = self.content_area(area);
        self.ensure_layout(inner.width, theme);

        let focused = self.focused_link().cloned();
        for row in 0..body.height {
            let y = body.y + row;
            let idx = (self.state.y as usize).saturating_add(row as usize);
            buf.set_style(Rect::new(body.x, y, body.width, 1), theme.text_primary);
            let Some(line) = self.rendered.lines.get(idx) else {
                continue;
            };
            render::render_spans_clipped(
                inner.x,
                y,
                self.state.x,
                inner.width,
                buf,
                &line.spans,
                theme.text_primary,
            );
            if let Some(region) = focused.as_ref().filter(|r| r.line == idx) {
                highlight_cols(buf, inner, y, self.state.x as usize, region, theme);
            }
        }

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, area.y, 1, area.height),
                buf,
                &self.state,
                theme.text_muted,
            );
        }
    }

    /// All laid out lines for `width` columns, without padding.
    pub fn lines_for_width(&mut self, width: u16, theme: &Theme) -> Vec<Line<'static>> {
        let width = width
            .saturating_sub(self.options.padding_left)
            .saturating_sub(self.options.padding_right);
        self.ensure_layout(width, theme);
        self.rendered
            .lines
            .iter()
            .map(|l| Line::from(l.spans.clone()))
            .collect()
    }

    /// The current layout (empty until the first render).
    pub fn layout(&self) -> &LaidOutDocument {
        &self.rendered
    }

    fn ensure_layout(&mut self, width: u16, theme: &Theme) {
        if self.cached_width != Some(width) {
            self.cached_width = Some(width);
            let highlighter = self
                .highlighter
                .as_deref()
                .map(|h| h as &dyn CodeHighlighter);
            self.rendered = layout_document(
                &self.document.roots,
                width,
                theme,
                &self.options.layout,
                highlighter,
            );
            self.state.set_content(
                self.rendered.content_width as u32,
                self.rendered.lines.len() as u32,
            );
            if self
                .focused_link
                .is_some_and(|i| i >= self.rendered.links.len())
            {
                self.focused_link = None;
            }
        }
        if let Some(y) = self.pending_offset.take() {
            self.state.scroll_to_line(y);
        }
        if let Some(id) = self.pending_anchor.take()
            && let Some(line) = self.rendered.anchors.get(&id)
        {
            self.state.scroll_to_line(*line as u32);
        }
    }

    fn invalidate(&mut self) {
        self.cached_width = None;
        self.rendered = LaidOutDocument::default();
    }

    fn focus_link(&mut self, index: usize) {
        self.focused_link = Some(index);
        if let Some(region) = self.rendered.links.get(index) {
            self.state.reveal_line(region.line as u32);
        }
    }

    fn first_link_from_viewport(&self) -> usize {
        let top = self.state.y as usize;
        self.rendered
            .links
            .iter()
            .position(|region| region.line >= top)
            .unwrap_or(0)
    }

    fn content_area(&self, area: Rect) -> Rect {
        let body = if self.options.show_scrollbar && area.width >= 2 {
            Rect::new(area.x, area.y, area.width - 1, area.height)
        } else {
            area
        };
        inset_h(body, self.options.padding_left, self.options.padding_right)
    }
}

fn matches_any(patterns: &[KeyEvent], key: &KeyEvent) -> bool {
    patterns.iter().any(|p| keymap::key_event_matches(p, key))
}

fn redraw_if(changed: bool) -> ViewAction {
    if changed {
        ViewAction::Redraw
    } else {
        ViewAction::None
    }
}

fn highlight_cols(
    buf: &mut Buffer,
    inner: Rect,
    y: u16,
    scroll_x: usize,
    region: &LinkRegion,
    theme: &Theme,
) {
    let start = region.start_col.max(scroll_x) - scroll_x;
    let end = region.end_col.saturating_sub(scroll_x).min(inner.width as usize);
    if start >= end {
        return;
    }
    let rect = Rect::new(inner.x + start as u16, y, (end - start) as u16, 1);
    buf.set_style(rect, theme.link_focused);
}

fn inset_h(area: Rect, left: u16, right: u16) -> Rect {
    let left = left.min(area.width);
    let right = right.min(area.width.saturating_sub(left));
    Rect::new(
        area.x.saturating_add(left),
        area.y,
        area.width.saturating_sub(left).saturating_sub(right),
        area.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildOptions;
    use crate::parse_document;

    fn doc(markdown: &str) -> Document {
        parse_document(markdown, &BuildOptions::default()).unwrap()
    }

    fn plain_view(markdown: &str) -> DocumentView {
        let mut view = DocumentView::with_options(DocumentViewOptions {
            show_scrollbar: false,
            padding_left: 0,
            padding_right: 0,
            ..DocumentViewOptions::default()
        });
        view.set_document(doc(markdown));
        view
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn renders_lines_into_buffer() {
        let mut view = plain_view("# Title\n\nbody\n");
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());
        assert_eq!(row(&buf, 0), "Title     ");
        assert_eq!(row(&buf, 2), "body      ");
    }

    #[test]
    fn scroll_to_heading_before_first_render_is_deferred() {
        let markdown = "# A\n\n1\n\n2\n\n3\n\n## B\n\ntail\n";
        let mut view = plain_view(markdown);
        assert!(view.scroll_to_heading(HeadingId(2)));
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());
        assert_eq!(view.state.y, 8);
        assert_eq!(row(&buf, 0), "B         ");
    }

    #[test]
    fn offset_set_before_layout_is_clamped_to_new_content() {
        let long = (0..20).map(|i| format!("p{i}\n\n")).collect::<String>();
        let mut view = plain_view(&long);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());
        view.state.to_bottom();
        let y = view.state.y;
        assert!(y > 10);

        view.set_document(doc("a\n\nb\n\nc\n"));
        view.scroll_to_offset(y);
        assert_eq!(view.state.y, 0);
        view.render_ref(area, &mut buf, &Theme::default());
        assert_eq!(view.state.y, 2);
        assert_eq!(row(&buf, 0), "b         ");

        view.scroll_to_offset(0);
        assert_eq!(view.state.y, 0);
    }

    #[test]
    fn unknown_heading_is_rejected() {
        let mut view = plain_view("# A\n");
        assert!(!view.scroll_to_heading(HeadingId(7)));
    }

    #[test]
    fn tab_then_enter_follows_focused_link() {
        let mut view = plain_view("[a](a.md) and [b](b.md)\n");
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());

        let tab = InputEvent::Key(keymap::key(KeyCode::Tab));
        let enter = InputEvent::Key(keymap::key(KeyCode::Enter));
        assert_eq!(view.handle_event(area, tab.clone()), ViewAction::Redraw);
        assert_eq!(view.handle_event(area, tab), ViewAction::Redraw);
        assert_eq!(
            view.handle_event(area, enter),
            ViewAction::FollowLink("b.md".into())
        );
        let back = InputEvent::Key(keymap::key(KeyCode::BackTab));
        view.handle_event(area, back);
        assert_eq!(view.focused_link().map(|r| r.target.as_str()), Some("a.md"));
    }

    #[test]
    fn enter_without_focus_does_nothing() {
        let mut view = plain_view("[a](a.md)\n");
        let area = Rect::new(0, 0, 20, 2);
        let enter = InputEvent::Key(keymap::key(KeyCode::Enter));
        assert_eq!(view.handle_event(area, enter), ViewAction::None);
    }

    #[test]
    fn clicking_a_link_follows_it() {
        let mut view = plain_view("go [there](docs/there.md) now\n");
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());

        let hit = InputEvent::Mouse(MouseEvent::click(5, 0));
        assert_eq!(
            view.handle_event(area, hit),
            ViewAction::FollowLink("docs/there.md".into())
        );
        let miss = InputEvent::Mouse(MouseEvent::click(1, 0));
        assert_eq!(view.handle_event(area, miss), ViewAction::None);
    }

    #[test]
    fn wheel_scrolls() {
        let markdown = (0..20).map(|i| format!("line {i}\n\n")).collect::<String>();
        let mut view = plain_view(&markdown);
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());
        let wheel = InputEvent::Mouse(MouseEvent {
            x: 0,
            y: 0,
            kind: MouseEventKind::ScrollDown,
        });
        assert_eq!(view.handle_event(area, wheel), ViewAction::Redraw);
        assert_eq!(view.state.y, 3);
    }

    #[test]
    fn set_document_resets_scroll_and_focus() {
        let markdown = (0..20).map(|i| format!("[l{i}](x{i}.md)\n\n")).collect::<String>();
        let mut view = plain_view(&markdown);
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf, &Theme::default());
        view.state.to_bottom();
        view.focus_next_link();
        view.set_document(doc("fresh\n"));
        assert_eq!(view.state.y, 0);
        assert!(view.focused_link().is_none());
    }
}
