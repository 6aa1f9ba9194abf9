use ratatui::style::Style;
use ratatui::text::Span;

/// Turns source lines of a fenced code block into styled spans, one `Vec` per input line.
pub trait CodeHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>>;

    fn highlight_text(&self, language: Option<&str>, text: &str) -> Vec<Vec<Span<'static>>> {
        let lines: Vec<&str> = text.split('\n').collect();
        self.highlight_lines(language, &lines)
    }
}

pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn highlight_lines(&self, _language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        lines
            .iter()
            .map(|l| vec![Span::styled((*l).to_string(), Style::default())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_text_keeps_one_entry_per_line() {
        let out = NoHighlight.highlight_text(Some("rs"), "fn main() {\n}\n");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0][0].content.as_ref(), "fn main() {");
    }
}
