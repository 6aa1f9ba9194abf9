use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    /// Overlay for `*emphasis*`.
    pub emphasis: Style,
    /// Overlay for `**strong**`.
    pub strong: Style,
    /// Overlay for `~~strike~~`.
    pub strike: Style,
    /// Overlay for `` `code` `` spans.
    pub code_inline: Style,
    pub code_block: Style,
    pub heading: Style,
    pub link: Style,
    pub link_focused: Style,
    pub quote: Style,
    pub selection: Style,
    pub status_bar: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strike: Style::default().add_modifier(Modifier::CROSSED_OUT),
            code_inline: Style::default().add_modifier(Modifier::BOLD | Modifier::DIM),
            code_block: Style::default().cyan(),
            heading: Style::default().add_modifier(Modifier::BOLD),
            link: Style::default().cyan().add_modifier(Modifier::UNDERLINED),
            link_focused: Style::default().black().on_cyan(),
            quote: Style::default().dark_gray(),
            selection: Style::default().add_modifier(Modifier::REVERSED),
            status_bar: Style::default().black().on_cyan(),
        }
    }
}
