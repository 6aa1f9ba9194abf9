//! Fenced code highlighting backed by syntect (feature `syntect`).

use mdnav_core::text::CodeHighlighter;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::FontStyle;
use syntect::highlighting::Style as SynStyle;
use syntect::highlighting::Theme;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;
use tracing::debug;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Uses one of syntect's bundled themes, falling back to any bundled theme when `name` is
    /// unknown.
    pub fn with_theme(name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(name) {
            Some(theme) => theme,
            None => {
                debug!(theme = name, "unknown syntect theme, using a bundled default");
                themes.into_values().next().unwrap_or_default()
            }
        };
        Self { syntax_set, theme }
    }

    fn syntax_for(&self, language: Option<&str>) -> &SyntaxReference {
        language
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        let mut highlighter = HighlightLines::new(self.syntax_for(language), &self.theme);
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            // The newline-aware syntaxes need the terminator to close line comments and strings.
            let source = format!("{line}\n");
            let spans: Vec<Span<'static>> = match highlighter.highlight_line(&source, &self.syntax_set)
            {
                Ok(regions) => regions
                    .into_iter()
                    .filter_map(|(style, text)| {
                        let text = text.trim_end_matches('\n');
                        (!text.is_empty()).then(|| Span::styled(text.to_string(), to_style(style)))
                    })
                    .collect(),
                Err(err) => {
                    debug!(%err, "syntect failed, leaving line unhighlighted");
                    vec![Span::raw((*line).to_string())]
                }
            };
            out.push(spans);
        }
        out
    }
}

fn to_style(style: SynStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    for (font, modifier) in [
        (FontStyle::BOLD, Modifier::BOLD),
        (FontStyle::ITALIC, Modifier::ITALIC),
        (FontStyle::UNDERLINE, Modifier::UNDERLINED),
    ] {
        if style.font_style.contains(font) {
            out = out.add_modifier(modifier);
        }
    }
    out
}
