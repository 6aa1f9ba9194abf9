//! The footer hint line: `b back • f forward • q quit`.
//!
//! Hints can be switched off while their command has nothing to act on, for example `back` at the
//! start of history. A disabled hint stays in place so the line does not shift, and is drawn with
//! [`HelpBarOptions::disabled_style`].

use crate::keymap::Binding;
use crate::render;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Clone, Debug)]
pub struct HelpBarOptions {
    pub style: Style,
    pub key_style: Style,
    pub disabled_style: Style,
    pub separator: String,
    pub space: String,
}

impl Default for HelpBarOptions {
    fn default() -> Self {
        Self {
            style: Style::default(),
            key_style: Style::default(),
            disabled_style: Style::default(),
            separator: " • ".to_string(),
            space: " ".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct Hint {
    key: String,
    desc: String,
    enabled: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HelpBar {
    hints: Vec<Hint>,
    options: HelpBarOptions,
}

impl HelpBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self::with_options(bindings, HelpBarOptions::default())
    }

    pub fn with_options(bindings: Vec<Binding>, options: HelpBarOptions) -> Self {
        let hints = bindings
            .into_iter()
            .map(|b| Hint {
                key: b.help_key,
                desc: b.help_desc,
                enabled: true,
            })
            .collect();
        Self { hints, options }
    }

    /// Enables or disables every hint shown under `help_key`. Returns whether any hint changed.
    pub fn set_enabled(&mut self, help_key: &str, enabled: bool) -> bool {
        let mut changed = false;
        for hint in self.hints.iter_mut().filter(|h| h.key == help_key) {
            changed |= hint.enabled != enabled;
            hint.enabled = enabled;
        }
        changed
    }

    /// `None` when no hint uses `help_key`.
    pub fn is_enabled(&self, help_key: &str) -> Option<bool> {
        self.hints
            .iter()
            .find(|h| h.key == help_key)
            .map(|h| h.enabled)
    }

    pub fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let spans = self.to_spans();
        buf.set_style(area, self.options.style);
        render::render_spans_clipped(
            area.x,
            area.y,
            0,
            area.width,
            buf,
            &spans,
            self.options.style,
        );
    }

    fn to_spans(&self) -> Vec<Span<'static>> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.options.separator.clone(),
                    self.options.style,
                ));
            }
            let (key_style, desc_style) = if hint.enabled {
                (self.options.key_style, self.options.style)
            } else {
                (self.options.disabled_style, self.options.disabled_style)
            };
            spans.push(Span::styled(hint.key.clone(), key_style));
            spans.push(Span::styled(self.options.space.clone(), desc_style));
            spans.push(Span::styled(hint.desc.clone(), desc_style));
        }
        spans
    }
}
