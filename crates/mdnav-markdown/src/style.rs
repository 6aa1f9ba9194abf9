//! Styled inline text.

use mdnav_core::theme::Theme;
use ratatui::style::Style;
use ratatui::text::Span;

/// Named inline style classes that the theme maps to concrete styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleClass {
    Emphasis,
    Strong,
    Strike,
    CodeInline,
}

impl StyleClass {
    pub fn name(self) -> &'static str {
        match self {
            StyleClass::Emphasis => "em",
            StyleClass::Strong => "strong",
            StyleClass::Strike => "s",
            StyleClass::CodeInline => "code_inline",
        }
    }

    pub fn style(self, theme: &Theme) -> Style {
        match self {
            StyleClass::Emphasis => theme.emphasis,
            StyleClass::Strong => theme.strong,
            StyleClass::Strike => theme.strike,
            StyleClass::CodeInline => theme.code_inline,
        }
    }
}

/// What happens when a styled fragment is clicked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClickAction {
    Link(String),
    Image(String),
}

impl ClickAction {
    /// The href (links) or src (images) to navigate to.
    pub fn target(&self) -> &str {
        match self {
            ClickAction::Link(target) | ClickAction::Image(target) => target,
        }
    }
}

/// The union of all inline modifiers open at some point in an inline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub style: Style,
    pub action: Option<ClickAction>,
}

impl InlineStyle {
    pub fn with_overlay(&self, overlay: Style) -> Self {
        Self {
            style: self.style.patch(overlay),
            action: self.action.clone(),
        }
    }

    pub fn with_action(&self, action: ClickAction) -> Self {
        Self {
            style: self.style,
            action: Some(action),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleFragment {
    pub text: String,
    pub style: InlineStyle,
}

/// An ordered sequence of `(text, style)` fragments.
///
/// Adjacent fragments with identical styles are merged as they are appended, so fragment
/// boundaries always mark a style change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleRun {
    fragments: Vec<StyleFragment>,
}

impl StyleRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut run = Self::new();
        run.push(text, InlineStyle::default());
        run
    }

    pub fn push(&mut self, text: impl Into<String>, style: InlineStyle) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.fragments.last_mut()
            && last.style == style
        {
            last.text.push_str(&text);
            return;
        }
        self.fragments.push(StyleFragment { text, style });
    }

    pub fn fragments(&self) -> &[StyleFragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The text with all styling discarded.
    pub fn to_plain(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Click targets in order of appearance (a target split over several fragments is reported
    /// once per fragment).
    pub fn actions(&self) -> impl Iterator<Item = &ClickAction> {
        self.fragments.iter().filter_map(|f| f.style.action.as_ref())
    }

    /// Spans with each fragment's style patched onto `base`. Click metadata is dropped.
    pub fn to_spans(&self, base: Style) -> Vec<Span<'static>> {
        self.fragments
            .iter()
            .map(|f| Span::styled(f.text.clone(), base.patch(f.style.style)))
            .collect()
    }
}
