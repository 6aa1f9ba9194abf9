use mdnav_core::input::InputEvent;
use mdnav_core::input::KeyCode;
use mdnav_core::input::MouseEventKind;
use mdnav_core::render;
use mdnav_core::theme::Theme;
use mdnav_core::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use crate::node::HeadingId;
use crate::node::TocEntry;

/// Level markers, indexed by heading level (index 0 is unused).
pub const NUMERALS: [&str; 7] = [" ", "Ⅰ", "Ⅱ", "Ⅲ", "Ⅳ", "Ⅴ", "Ⅵ"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocAction {
    None,
    Redraw,
    Selected(HeadingId),
}

/// Table of contents pane: one row per heading, indented by level.
#[derive(Clone, Debug, Default)]
pub struct TocView {
    entries: Vec<TocEntry>,
    selected: usize,
    state: ViewportState,
}

impl TocView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entries(&mut self, entries: Vec<TocEntry>) {
        self.entries = entries;
        self.selected = 0;
        self.state = ViewportState::default();
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<&TocEntry> {
        self.entries.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = index.min(self.entries.len() - 1);
        self.state.reveal_line(self.selected as u32);
    }

    /// Columns needed to show every entry untruncated.
    pub fn preferred_width(&self) -> u16 {
        self.entries
            .iter()
            .map(|e| UnicodeWidthStr::width(entry_label(e).as_str()))
            .max()
            .unwrap_or(0)
            .min(u16::MAX as usize) as u16
    }

    pub fn handle_event(&mut self, area: Rect, event: InputEvent) -> TocAction {
        self.state.set_viewport(area.width, area.height);
        match event {
            InputEvent::Key(key) => {
                let last = self.entries.len().saturating_sub(1);
                let target = match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.selected.saturating_sub(1),
                    KeyCode::Down | KeyCode::Char('j') => (self.selected + 1).min(last),
                    KeyCode::Home | KeyCode::Char('g') => 0,
                    KeyCode::End | KeyCode::Char('G') => last,
                    KeyCode::Enter => {
                        return match self.selected() {
                            Some(entry) => TocAction::Selected(entry.id),
                            None => TocAction::None,
                        };
                    }
                    _ => return TocAction::None,
                };
                if self.entries.is_empty() || target == self.selected {
                    return TocAction::None;
                }
                self.select(target);
                TocAction::Redraw
            }
            InputEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.state.scroll_y_by(-1);
                    TocAction::Redraw
                }
                MouseEventKind::ScrollDown => {
                    self.state.scroll_y_by(1);
                    TocAction::Redraw
                }
                _ if mouse.is_left_click() && area.contains((mouse.x, mouse.y).into()) => {
                    let index = self.state.y as usize + (mouse.y - area.y) as usize;
                    match self.entries.get(index) {
                        Some(entry) => {
                            let id = entry.id;
                            self.select(index);
                            TocAction::Selected(id)
                        }
                        None => TocAction::None,
                    }
                }
                _ => TocAction::None,
            },
            InputEvent::Resize(_, _) => TocAction::Redraw,
        }
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.state.set_viewport(area.width, area.height);
        self.state.set_content(
            self.preferred_width() as u32,
            self.entries.len() as u32,
        );

        buf.set_style(area, theme.text_primary);
        for row in 0..area.height {
            let idx = self.state.y as usize + row as usize;
            let Some(entry) = self.entries.get(idx) else {
                break;
            };
            let style = if idx == self.selected && focused {
                theme.selection
            } else if idx == self.selected {
                theme.accent
            } else {
                theme.text_primary
            };
            let spans = render::truncate_spans_with_ellipsis(
                vec![Span::styled(entry_label(entry), style)],
                area.width as usize,
                theme.text_muted,
            );
            let y = area.y + row;
            if idx == self.selected {
                buf.set_style(Rect::new(area.x, y, area.width, 1), style);
            }
            render::render_spans_clipped(area.x, y, 0, area.width, buf, &spans, style);
        }
    }
}

/// `"  Ⅱ Install"` for a level-2 heading.
pub fn entry_label(entry: &TocEntry) -> String {
    let level = entry.level.clamp(1, 6) as usize;
    format!(
        "{}{} {}",
        "  ".repeat(level - 1),
        NUMERALS[level],
        entry.text
    )
}
