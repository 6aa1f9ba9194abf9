//! Screen layout and the small widgets owned by the browser itself.

use std::path::Path;

use mdnav_core::render;
use mdnav_core::render::CellAlign;
use mdnav_core::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;

/// Narrowest TOC pane, border included.
pub const MIN_TOC_WIDTH: u16 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppLayout {
    /// TOC pane including its right border.
    pub toc_frame: Option<Rect>,
    /// TOC entries area inside the border.
    pub toc: Option<Rect>,
    pub document: Rect,
    pub status: Rect,
    pub help: Rect,
}

/// Splits the screen into TOC, document, status line and help bar.
pub fn split(area: Rect, toc_width: Option<u16>) -> AppLayout {
    let [body, status, help] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    let Some(width) = toc_width.filter(|w| *w > 0 && *w < body.width) else {
        return AppLayout {
            toc_frame: None,
            toc: None,
            document: body,
            status,
            help,
        };
    };

    let [toc_frame, document] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width), Constraint::Min(1)])
        .areas(body);
    let toc = Block::default().borders(Borders::RIGHT).inner(toc_frame);
    AppLayout {
        toc_frame: Some(toc_frame),
        toc: Some(toc),
        document,
        status,
        help,
    }
}

/// TOC pane width for entries needing `preferred` columns: a third of the screen at most, capped
/// at `max`.
pub fn toc_width(preferred: u16, screen_width: u16, max: u16) -> u16 {
    let limit = (screen_width / 3).min(max).max(MIN_TOC_WIDTH);
    preferred.saturating_add(2).clamp(MIN_TOC_WIDTH, limit)
}

pub fn render_toc_frame(area: Rect, buf: &mut Buffer, theme: &Theme) {
    Block::default()
        .borders(Borders::RIGHT)
        .border_style(theme.text_muted)
        .render(area, buf);
}

/// What the status line shows.
#[derive(Clone, Copy, Debug)]
pub struct StatusLine<'a> {
    pub location: &'a Path,
    /// `(position, len)` within history.
    pub history: Option<(usize, usize)>,
    pub percent: Option<u8>,
    /// Replaces the location when set.
    pub message: Option<&'a str>,
}

impl StatusLine<'_> {
    pub fn render_ref(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, theme.status_bar);

        let mut right = String::new();
        if let Some((position, len)) = self.history {
            right.push_str(&format!(" {}/{}", position + 1, len));
        }
        if let Some(percent) = self.percent {
            right.push_str(&format!(" {percent:>3}%"));
        }
        right.push(' ');
        let right_width =
            (render::spans_width(&[Span::raw(right.as_str())]) as u16).min(area.width);

        let left_text = match self.message {
            Some(message) => format!(" {message}"),
            None => format!(" {}", self.location.display()),
        };
        let left_width = area.width - right_width;
        let left = render::truncate_spans_with_ellipsis(
            vec![Span::styled(left_text, theme.status_bar)],
            left_width as usize,
            theme.status_bar,
        );
        let left = render::pad_spans(left, left_width, CellAlign::Left, theme.status_bar);

        let mut spans = left;
        spans.push(Span::styled(right, theme.status_bar));
        render::render_spans_clipped(
            area.x,
            area.y,
            0,
            area.width,
            buf,
            &spans,
            theme.status_bar,
        );
    }
}

/// Replaces the document pane when a location could not be loaded.
pub fn render_error(area: Rect, buf: &mut Buffer, theme: &Theme, location: &Path, message: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    buf.set_style(area, theme.text_primary);
    let lines = vec![
        Line::from(Span::styled(location.display().to_string(), theme.heading)),
        Line::default(),
        Line::from(Span::styled(message.to_string(), theme.danger)),
        Line::default(),
        Line::from(vec![
            Span::styled("b", theme.accent),
            Span::styled(" back • ", theme.text_muted),
            Span::styled("r", theme.accent),
            Span::styled(" reload", theme.text_muted),
        ]),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.danger)
                .title(Span::styled(" Unable to load ", theme.danger)),
        )
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn split_without_toc_gives_document_the_body() {
        let layout = split(Rect::new(0, 0, 80, 24), None);
        assert_eq!(layout.toc, None);
        assert_eq!(layout.document, Rect::new(0, 0, 80, 22));
        assert_eq!(layout.status, Rect::new(0, 22, 80, 1));
        assert_eq!(layout.help, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn split_with_toc_reserves_a_bordered_column() {
        let layout = split(Rect::new(0, 0, 80, 24), Some(20));
        assert_eq!(layout.toc_frame, Some(Rect::new(0, 0, 20, 22)));
        assert_eq!(layout.toc, Some(Rect::new(0, 0, 19, 22)));
        assert_eq!(layout.document, Rect::new(20, 0, 60, 22));
    }

    #[test]
    fn toc_width_stays_within_bounds() {
        assert_eq!(toc_width(4, 120, 40), MIN_TOC_WIDTH);
        assert_eq!(toc_width(20, 120, 40), 22);
        assert_eq!(toc_width(60, 120, 32), 32);
        assert_eq!(toc_width(60, 30, 40), MIN_TOC_WIDTH);
    }

    #[test]
    fn status_line_shows_location_and_history() {
        let area = Rect::new(0, 0, 24, 1);
        let mut buf = Buffer::empty(area);
        let location = PathBuf::from("/d/a.md");
        StatusLine {
            location: &location,
            history: Some((1, 3)),
            percent: None,
            message: None,
        }
        .render_ref(area, &mut buf, &Theme::default());
        assert_eq!(row(&buf, 0), " /d/a.md            2/3 ");
    }

    #[test]
    fn status_message_replaces_location() {
        let area = Rect::new(0, 0, 16, 1);
        let mut buf = Buffer::empty(area);
        let location = PathBuf::from("/d/a.md");
        StatusLine {
            location: &location,
            history: None,
            percent: None,
            message: Some("External link: https://example.com"),
        }
        .render_ref(area, &mut buf, &Theme::default());
        assert_eq!(row(&buf, 0), " External link… ");
    }

    #[test]
    fn error_panel_names_the_location() {
        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);
        render_error(
            area,
            &mut buf,
            &Theme::default(),
            Path::new("/d/missing.md"),
            "no document at /d/missing.md",
        );
        assert!(row(&buf, 0).contains("Unable to load"));
        assert!(row(&buf, 1).contains("/d/missing.md"));
    }
}
