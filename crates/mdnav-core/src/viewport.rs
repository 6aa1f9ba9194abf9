use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;

/// Scroll position of a line-oriented viewport over `content_h` lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewportState {
    pub x: u32,
    pub y: u32,
    pub viewport_w: u16,
    pub viewport_h: u16,
    pub content_w: u32,
    pub content_h: u32,
}

impl ViewportState {
    pub fn set_viewport(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
        self.clamp();
    }

    pub fn set_content(&mut self, w: u32, h: u32) {
        self.content_w = w;
        self.content_h = h;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.y = self.y.min(self.max_y());
        self.x = self.x.min(self.max_x());
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        let next = self.y as i64 + delta as i64;
        self.y = next.clamp(0, self.max_y() as i64) as u32;
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        let next = self.x as i64 + delta as i64;
        self.x = next.clamp(0, self.max_x() as i64) as u32;
    }

    /// Puts `line` at the top of the viewport (as far as the content allows).
    pub fn scroll_to_line(&mut self, line: u32) {
        self.y = line.min(self.max_y());
    }

    /// Scrolls the minimum amount needed for `line` to be visible.
    pub fn reveal_line(&mut self, line: u32) {
        if line < self.y {
            self.y = line;
        } else if self.viewport_h > 0 && line >= self.y + self.viewport_h as u32 {
            self.y = line + 1 - self.viewport_h as u32;
        }
        self.clamp();
    }

    pub fn is_line_visible(&self, line: u32) -> bool {
        line >= self.y && line < self.y.saturating_add(self.viewport_h as u32)
    }

    pub fn page_down(&mut self) {
        self.scroll_y_by(self.viewport_h.saturating_sub(1) as i32);
    }

    pub fn page_up(&mut self) {
        self.scroll_y_by(-(self.viewport_h.saturating_sub(1) as i32));
    }

    pub fn to_top(&mut self) {
        self.y = 0;
    }

    pub fn to_bottom(&mut self) {
        self.y = self.max_y();
    }

    pub fn percent_y(&self) -> Option<u8> {
        if self.content_h == 0 || self.viewport_h == 0 || self.content_h <= self.viewport_h as u32 {
            return None;
        }
        let visible_bottom = self.y.saturating_add(self.viewport_h as u32) as f64;
        let pct = (visible_bottom / self.content_h as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }

    fn max_y(&self) -> u32 {
        self.content_h.saturating_sub(self.viewport_h as u32)
    }

    fn max_x(&self) -> u32 {
        self.content_w.saturating_sub(self.viewport_w as u32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Keys that scroll a [`ViewportState`]. Defaults are Vim-like plus the arrow/page keys.
#[derive(Clone, Debug)]
pub struct ScrollBindings {
    pub line_step: i32,
    pub horiz_step: i32,
    pub bindings: Vec<(Vec<KeyEvent>, ScrollAction)>,
}

impl Default for ScrollBindings {
    fn default() -> Self {
        Self {
            line_step: 1,
            horiz_step: 4,
            bindings: vec![
                (
                    vec![KeyEvent::new(KeyCode::Up), keymap::key_char('k')],
                    ScrollAction::Up,
                ),
                (
                    vec![KeyEvent::new(KeyCode::Down), keymap::key_char('j')],
                    ScrollAction::Down,
                ),
                (
                    vec![KeyEvent::new(KeyCode::Left), keymap::key_char('h')],
                    ScrollAction::Left,
                ),
                (
                    vec![KeyEvent::new(KeyCode::Right), keymap::key_char('l')],
                    ScrollAction::Right,
                ),
                (
                    vec![
                        KeyEvent::new(KeyCode::PageUp),
                        keymap::key_ctrl('u'),
                        keymap::key_ctrl('b'),
                    ],
                    ScrollAction::PageUp,
                ),
                (
                    vec![
                        KeyEvent::new(KeyCode::PageDown),
                        keymap::key_ctrl('d'),
                        keymap::key_char(' '),
                    ],
                    ScrollAction::PageDown,
                ),
                (
                    vec![KeyEvent::new(KeyCode::Home), keymap::key_char('g')],
                    ScrollAction::Top,
                ),
                (
                    vec![KeyEvent::new(KeyCode::End), keymap::key_char('G')],
                    ScrollAction::Bottom,
                ),
            ],
        }
    }
}

impl ScrollBindings {
    pub fn action_for(&self, key: &KeyEvent) -> Option<ScrollAction> {
        self.bindings
            .iter()
            .find(|(keys, _)| keys.iter().any(|p| keymap::key_event_matches(p, key)))
            .map(|(_, action)| *action)
    }

    pub fn apply(&self, state: &mut ViewportState, action: ScrollAction) {
        match action {
            ScrollAction::Up => state.scroll_y_by(-self.line_step),
            ScrollAction::Down => state.scroll_y_by(self.line_step),
            ScrollAction::Left => state.scroll_x_by(-self.horiz_step),
            ScrollAction::Right => state.scroll_x_by(self.horiz_step),
            ScrollAction::PageUp => state.page_up(),
            ScrollAction::PageDown => state.page_down(),
            ScrollAction::Top => state.to_top(),
            ScrollAction::Bottom => state.to_bottom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(viewport_h: u16, content_h: u32) -> ViewportState {
        let mut s = ViewportState::default();
        s.set_viewport(20, viewport_h);
        s.set_content(20, content_h);
        s
    }

    #[test]
    fn viewport_clamps_both_axes() {
        let mut s = ViewportState::default();
        s.set_viewport(10, 5);
        s.set_content(12, 6);
        s.x = 99;
        s.y = 99;
        s.clamp();
        assert_eq!(s.x, 2);
        assert_eq!(s.y, 1);
    }

    #[test]
    fn scroll_to_line_stops_at_last_page() {
        let mut s = state(10, 30);
        s.scroll_to_line(5);
        assert_eq!(s.y, 5);
        s.scroll_to_line(28);
        assert_eq!(s.y, 20);
    }

    #[test]
    fn reveal_line_scrolls_minimally() {
        let mut s = state(10, 100);
        s.reveal_line(3);
        assert_eq!(s.y, 0);
        s.reveal_line(15);
        assert_eq!(s.y, 6);
        assert!(s.is_line_visible(15));
        s.reveal_line(2);
        assert_eq!(s.y, 2);
    }

    #[test]
    fn bindings_map_keys_to_actions() {
        let bindings = ScrollBindings::default();
        let mut s = state(10, 100);
        let action = bindings.action_for(&keymap::key_char('G')).unwrap();
        bindings.apply(&mut s, action);
        assert_eq!(s.y, 90);
        let action = bindings.action_for(&keymap::key_char('g')).unwrap();
        bindings.apply(&mut s, action);
        assert_eq!(s.y, 0);
        assert_eq!(bindings.action_for(&keymap::key_char('z')), None);
    }
}
