//! Turns a block tree into wrapped, styled terminal lines.
//!
//! Layout is width dependent and pure: the same tree, width and options always produce the same
//! lines. Besides the lines it records where each heading landed ([`LaidOutDocument::anchors`])
//! and which cells belong to a link or image ([`LaidOutDocument::links`]) so views can scroll to
//! headings and map clicks back to targets.

use std::collections::HashMap;

use mdnav_core::render::CellAlign;
use mdnav_core::render::join_spans_plain;
use mdnav_core::text::CodeHighlighter;
use mdnav_core::theme::Theme;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::node::BlockKind;
use crate::node::BlockNode;
use crate::node::HeadingId;
use crate::node::TableGrid;
use crate::style::ClickAction;
use crate::style::StyleRun;

#[derive(Clone, Debug)]
pub struct LayoutOptions {
    /// Word-wrap prose to the available width. Code is never wrapped.
    pub wrap: bool,
    /// Prefix headings with `#` markers.
    pub show_heading_markers: bool,
    pub code_indent: u16,
    pub show_code_line_numbers: bool,
    pub blockquote_prefix: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            wrap: true,
            show_heading_markers: false,
            code_indent: 2,
            show_code_line_numbers: false,
            blockquote_prefix: "│ ".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedLine {
    pub spans: Vec<Span<'static>>,
    pub plain: String,
}

/// Cells `start_col..end_col` of `line` activate `target` when clicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRegion {
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub target: String,
}

impl LinkRegion {
    pub fn contains(&self, line: usize, col: usize) -> bool {
        self.line == line && col >= self.start_col && col < self.end_col
    }
}

#[derive(Clone, Debug, Default)]
pub struct LaidOutDocument {
    pub lines: Vec<RenderedLine>,
    /// First line of every heading.
    pub anchors: HashMap<HeadingId, usize>,
    /// Link and image regions in document order.
    pub links: Vec<LinkRegion>,
    /// Widest line in cells.
    pub content_width: usize,
}

impl LaidOutDocument {
    pub fn link_at(&self, line: usize, col: usize) -> Option<&LinkRegion> {
        self.links.iter().find(|region| region.contains(line, col))
    }

    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.plain.clone()).collect()
    }
}

/// Lays out `roots` for a viewport `width` cells wide.
pub fn layout_document(
    roots: &[BlockNode],
    width: u16,
    theme: &Theme,
    options: &LayoutOptions,
    highlighter: Option<&dyn CodeHighlighter>,
) -> LaidOutDocument {
    let mut layouter = Layouter {
        width: width.max(1) as usize,
        theme,
        options,
        highlighter,
        out: LaidOutDocument::default(),
    };
    layouter.blocks(roots, &[], &[], true);
    layouter.out
}

#[derive(Clone, Debug, PartialEq)]
struct Segment {
    text: String,
    style: Style,
    target: Option<String>,
}

impl Segment {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            target: None,
        }
    }

    fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }

    fn with_text(&self, text: String) -> Self {
        Self {
            text,
            style: self.style,
            target: self.target.clone(),
        }
    }
}

struct Layouter<'a> {
    width: usize,
    theme: &'a Theme,
    options: &'a LayoutOptions,
    highlighter: Option<&'a dyn CodeHighlighter>,
    out: LaidOutDocument,
}

impl Layouter<'_> {
    /// Lays out sibling blocks. The first line of the first block gets `first` as its prefix,
    /// every other line gets `rest`. With `separate`, siblings are split by a blank line.
    fn blocks(&mut self, nodes: &[BlockNode], first: &[Segment], rest: &[Segment], separate: bool) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 && separate {
                self.blank(rest);
            }
            let prefix = if i == 0 { first } else { rest };
            self.block(node, prefix, rest);
        }
    }

    fn block(&mut self, node: &BlockNode, first: &[Segment], rest: &[Segment]) {
        match &node.kind {
            BlockKind::Heading(level) => self.heading(node, *level, first, rest),
            BlockKind::Paragraph => {
                let segments = self.run_segments(node.content.as_ref(), self.theme.text_primary);
                self.prose(&segments, first, rest);
            }
            BlockKind::BlockQuote => {
                let bar = Segment::new(self.options.blockquote_prefix.clone(), self.theme.quote);
                let first = with_suffix(first, bar.clone());
                let rest = with_suffix(rest, bar);
                self.blocks(&node.children, &first, &rest, true);
            }
            BlockKind::BulletList | BlockKind::OrderedList => {
                for (i, item) in node.children.iter().enumerate() {
                    let prefix = if i == 0 { first } else { rest };
                    self.block(item, prefix, rest);
                }
            }
            BlockKind::ListItem { marker } => {
                let hang = " ".repeat(UnicodeWidthStr::width(marker.as_str()));
                let item_first = with_suffix(first, Segment::new(marker.clone(), self.theme.accent));
                let item_rest = with_suffix(rest, Segment::new(hang, Style::default()));
                if node.children.is_empty() {
                    self.push_line(item_first);
                } else {
                    self.blocks(&node.children, &item_first, &item_rest, false);
                }
            }
            BlockKind::Table(grid) => self.table(grid, first, rest),
            BlockKind::FencedCode { language, code } => {
                self.code(language.as_deref(), code, first, rest)
            }
            BlockKind::Rule => {
                let mut line = first.to_vec();
                let used = segments_width(&line);
                let len = self.width.saturating_sub(used).max(1);
                line.push(Segment::new("─".repeat(len), self.theme.text_muted));
                self.push_line(line);
            }
            BlockKind::TableHead
            | BlockKind::TableBody
            | BlockKind::TableRow
            | BlockKind::TableHeaderCell { .. }
            | BlockKind::TableDataCell { .. } => {
                // Only reachable for table parts outside a table.
                if let Some(content) = node.content.as_ref() {
                    let segments = self.run_segments(Some(content), self.theme.text_primary);
                    self.prose(&segments, first, rest);
                }
                self.blocks(&node.children, first, rest, false);
            }
        }
    }

    fn heading(&mut self, node: &BlockNode, level: u8, first: &[Segment], rest: &[Segment]) {
        let mut style = self.theme.text_primary.patch(self.theme.heading);
        if level == 1 {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        let mut segments = Vec::new();
        if self.options.show_heading_markers {
            let marker = format!("{} ", "#".repeat(level as usize));
            segments.push(Segment::new(marker, self.theme.text_muted.patch(self.theme.heading)));
        }
        segments.extend(self.run_segments(node.content.as_ref(), style));
        if let Some(id) = node.id {
            self.out.anchors.insert(id, self.out.lines.len());
        }
        self.prose(&segments, first, rest);
    }

    /// Wraps inline segments; `\n` in the text forces a line break.
    fn prose(&mut self, segments: &[Segment], first: &[Segment], rest: &[Segment]) {
        for (i, logical) in split_hard_breaks(segments).iter().enumerate() {
            let prefix = if i == 0 { first } else { rest };
            let lines = if self.options.wrap {
                wrap_segments(prefix, rest, logical, self.width)
            } else {
                let mut line = prefix.to_vec();
                line.extend(logical.iter().cloned());
                vec![line]
            };
            for line in lines {
                self.push_line(line);
            }
        }
    }

    fn code(&mut self, language: Option<&str>, code: &str, first: &[Segment], rest: &[Segment]) {
        let code = code.replace('\t', "    ");
        let base = self.theme.code_block;
        let highlighted: Vec<Vec<Span<'static>>> = match self.highlighter {
            Some(highlighter) => highlighter.highlight_text(language, &code),
            None => code
                .split('\n')
                .map(|line| vec![Span::raw(line.to_string())])
                .collect(),
        };
        let number_w = digits(highlighted.len());
        let indent = " ".repeat(self.options.code_indent as usize);

        for (idx, spans) in highlighted.into_iter().enumerate() {
            let mut line = (if idx == 0 { first } else { rest }).to_vec();
            if !indent.is_empty() {
                line.push(Segment::new(indent.clone(), Style::default()));
            }
            if self.options.show_code_line_numbers {
                let gutter = format!("{:>number_w$} │ ", idx + 1);
                line.push(Segment::new(gutter, self.theme.text_muted));
            }
            for span in spans {
                line.push(Segment::new(span.content.into_owned(), base.patch(span.style)));
            }
            self.push_line(line);
        }
    }

    /// Glow-style grid: `│` between columns, a `─┼─` rule under the header row.
    fn table(&mut self, grid: &TableGrid, first: &[Segment], rest: &[Segment]) {
        let cols = grid.column_count();
        let prefix_w = segments_width(rest).max(segments_width(first));
        let width = self.width.saturating_sub(prefix_w).saturating_sub(2);
        let chrome = cols.saturating_sub(1) + 2 * cols;
        if cols == 0 {
            return;
        }
        if chrome + cols > width {
            self.stacked_table(grid, first, rest);
            return;
        }

        let header: Vec<Vec<Segment>> = grid
            .headers
            .iter()
            .map(|cell| self.run_segments(Some(cell), self.theme.text_primary))
            .collect();
        let body: Vec<Vec<Vec<Segment>>> = grid
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.run_segments(Some(cell), self.theme.text_primary))
                    .collect()
            })
            .collect();
        let (head_rows, body_rows): (&[Vec<Vec<Segment>>], &[Vec<Vec<Segment>>]) =
            if !header.is_empty() {
                (std::slice::from_ref(&header), body.as_slice())
            } else {
                body.split_at(1.min(body.len()))
            };

        let mut col_w = vec![1usize; cols];
        for row in head_rows.iter().chain(body_rows) {
            for (ci, cell) in row.iter().enumerate() {
                col_w[ci] = col_w[ci].max(segments_width(cell));
            }
        }
        let available = width - chrome;
        let mut total: usize = col_w.iter().sum();
        while total > available {
            let Some((idx, _)) = col_w
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > 1)
                .max_by_key(|(_, w)| **w)
            else {
                break;
            };
            col_w[idx] -= 1;
            total -= 1;
        }

        let mut rows_out: Vec<Vec<Segment>> = Vec::new();
        for row in head_rows {
            rows_out.extend(self.table_row(row, &col_w, grid, true));
        }
        if !head_rows.is_empty() {
            let rule = col_w
                .iter()
                .map(|w| "─".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("┼");
            rows_out.push(vec![Segment::new(rule, self.theme.text_muted)]);
        }
        for row in body_rows {
            rows_out.extend(self.table_row(row, &col_w, grid, false));
        }

        for (i, row) in rows_out.into_iter().enumerate() {
            let mut line = (if i == 0 { first } else { rest }).to_vec();
            line.extend(row);
            self.push_line(line);
        }
    }

    /// Fallback for panes too narrow for the grid: one `header: value` paragraph per cell, rows
    /// split by a blank line.
    fn stacked_table(&mut self, grid: &TableGrid, first: &[Segment], rest: &[Segment]) {
        if grid.rows.is_empty() {
            let label = self.theme.text_primary.add_modifier(Modifier::BOLD);
            for (ci, header) in grid.headers.iter().enumerate() {
                let segments = self.run_segments(Some(header), label);
                self.prose(&segments, if ci == 0 { first } else { rest }, rest);
            }
            return;
        }
        let mut prefix = first;
        for (ri, row) in grid.rows.iter().enumerate() {
            if ri > 0 {
                self.blank(rest);
            }
            for (ci, cell) in row.iter().enumerate() {
                let mut segments = Vec::new();
                if let Some(header) = grid.headers.get(ci) {
                    let label = self.theme.text_primary.add_modifier(Modifier::BOLD);
                    segments.extend(self.run_segments(Some(header), label));
                    segments.push(Segment::new(": ", label));
                }
                segments.extend(self.run_segments(Some(cell), self.theme.text_primary));
                self.prose(&segments, prefix, rest);
                prefix = rest;
            }
        }
    }

    fn table_row(
        &self,
        row: &[Vec<Segment>],
        col_w: &[usize],
        grid: &TableGrid,
        is_header: bool,
    ) -> Vec<Vec<Segment>> {
        let mut cells: Vec<Vec<Vec<Segment>>> = Vec::with_capacity(col_w.len());
        for (ci, w) in col_w.iter().copied().enumerate() {
            let cell = row.get(ci).map(Vec::as_slice).unwrap_or(&[]);
            if is_header {
                let bold: Vec<Segment> = cell
                    .iter()
                    .map(|s| Segment {
                        style: s.style.add_modifier(Modifier::BOLD),
                        ..s.clone()
                    })
                    .collect();
                cells.push(vec![truncate_segments(&bold, w, self.theme.text_muted)]);
            } else {
                cells.push(wrap_segments(&[], &[], cell, w));
            }
        }
        let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);

        let mut out = Vec::with_capacity(height);
        for li in 0..height {
            let mut line: Vec<Segment> = Vec::new();
            for (ci, w) in col_w.iter().copied().enumerate() {
                if ci > 0 {
                    line.push(Segment::new("│", self.theme.text_muted));
                }
                let content = cells[ci].get(li).cloned().unwrap_or_default();
                line.push(Segment::new(" ", Style::default()));
                line.extend(pad_segments(content, w, grid.align(ci)));
                line.push(Segment::new(" ", Style::default()));
            }
            out.push(line);
        }
        out
    }

    fn run_segments(&self, run: Option<&StyleRun>, base: Style) -> Vec<Segment> {
        let Some(run) = run else {
            return Vec::new();
        };
        run.fragments()
            .iter()
            .map(|fragment| {
                let mut style = base.patch(fragment.style.style);
                match &fragment.style.action {
                    Some(ClickAction::Link(_)) => style = style.patch(self.theme.link),
                    Some(ClickAction::Image(_)) => style = style.patch(self.theme.accent),
                    None => {}
                }
                Segment {
                    text: fragment.text.clone(),
                    style,
                    target: fragment
                        .style
                        .action
                        .as_ref()
                        .map(|a| a.target().to_string()),
                }
            })
            .collect()
    }

    fn blank(&mut self, prefix: &[Segment]) {
        let mut line = prefix.to_vec();
        trim_trailing_ws(&mut line);
        self.push_line(line);
    }

    fn push_line(&mut self, segments: Vec<Segment>) {
        let line = self.out.lines.len();
        let mut col = 0usize;
        let mut spans = Vec::with_capacity(segments.len());
        for seg in segments {
            let w = seg.width();
            if let Some(target) = seg.target.as_ref()
                && w > 0
            {
                let continues = matches!(
                    self.out.links.last(),
                    Some(last) if last.line == line && last.end_col == col && &last.target == target
                );
                match self.out.links.last_mut() {
                    Some(last) if continues => last.end_col += w,
                    _ => self.out.links.push(LinkRegion {
                        line,
                        start_col: col,
                        end_col: col + w,
                        target: target.clone(),
                    }),
                }
            }
            col += w;
            spans.push(Span::styled(seg.text, seg.style));
        }
        self.out.content_width = self.out.content_width.max(col);
        let plain = join_spans_plain(&spans);
        self.out.lines.push(RenderedLine { spans, plain });
    }
}

fn with_suffix(prefix: &[Segment], suffix: Segment) -> Vec<Segment> {
    let mut out = prefix.to_vec();
    out.push(suffix);
    out
}

fn segments_width(segments: &[Segment]) -> usize {
    segments.iter().map(Segment::width).sum()
}

fn split_hard_breaks(segments: &[Segment]) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];
    for seg in segments {
        for (i, part) in seg.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if !part.is_empty()
                && let Some(line) = lines.last_mut()
            {
                line.push(seg.with_text(part.to_string()));
            }
        }
    }
    lines
}

/// Greedy word wrap. Words wider than the line are split at the column limit; whitespace at the
/// start and end of wrapped lines is dropped.
fn wrap_segments(
    initial_prefix: &[Segment],
    subsequent_prefix: &[Segment],
    segments: &[Segment],
    width: usize,
) -> Vec<Vec<Segment>> {
    let width = width.max(1);
    let words: Vec<Segment> = segments.iter().flat_map(split_segment_ws).collect();

    let mut lines: Vec<Vec<Segment>> = Vec::new();
    let mut line = initial_prefix.to_vec();
    let mut cols = segments_width(&line);
    let mut has_content = false;

    for word in words {
        let word_cols = word.width();
        if !has_content && is_all_ws(&word.text) {
            continue;
        }
        if cols + word_cols <= width {
            line.push(word);
            cols += word_cols;
            has_content = true;
            continue;
        }

        if has_content {
            trim_trailing_ws(&mut line);
            lines.push(std::mem::replace(&mut line, subsequent_prefix.to_vec()));
            cols = segments_width(&line);
            has_content = false;
            if is_all_ws(&word.text) {
                continue;
            }
        }

        let mut remaining = word;
        loop {
            let remaining_cols = remaining.width();
            if cols + remaining_cols <= width {
                line.push(remaining);
                cols += remaining_cols;
                has_content = true;
                break;
            }
            let (head, tail) = split_to_width(&remaining, width.saturating_sub(cols).max(1));
            line.push(head);
            lines.push(std::mem::replace(&mut line, subsequent_prefix.to_vec()));
            cols = segments_width(&line);
            has_content = false;
            if tail.text.is_empty() {
                break;
            }
            remaining = tail;
        }
    }

    if has_content || lines.is_empty() {
        trim_trailing_ws(&mut line);
        lines.push(line);
    }
    lines
}

fn split_segment_ws(seg: &Segment) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut buf = String::new();
    let mut last_was_ws: Option<bool> = None;
    for ch in seg.text.chars() {
        let is_ws = ch.is_whitespace();
        if let Some(prev) = last_was_ws
            && prev != is_ws
        {
            out.push(seg.with_text(std::mem::take(&mut buf)));
        }
        buf.push(ch);
        last_was_ws = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(seg.with_text(buf));
    }
    out
}

/// Splits after at most `max_cols` cells, always keeping at least one character in the head.
fn split_to_width(seg: &Segment, max_cols: usize) -> (Segment, Segment) {
    let mut cols = 0usize;
    let mut idx = 0usize;
    for (byte_idx, ch) in seg.text.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > max_cols && idx > 0 {
            break;
        }
        cols += w;
        idx = byte_idx + ch.len_utf8();
    }
    let (a, b) = seg.text.split_at(idx);
    (seg.with_text(a.to_string()), seg.with_text(b.to_string()))
}

fn truncate_segments(segments: &[Segment], max_cols: usize, ellipsis_style: Style) -> Vec<Segment> {
    if segments_width(segments) <= max_cols {
        return segments.to_vec();
    }
    if max_cols == 0 {
        return Vec::new();
    }
    let target = max_cols - 1;
    let mut out = Vec::new();
    let mut cols = 0usize;
    'outer: for seg in segments {
        let mut buf = String::new();
        for ch in seg.text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cols + w > target {
                if !buf.is_empty() {
                    out.push(seg.with_text(buf));
                }
                break 'outer;
            }
            cols += w;
            buf.push(ch);
        }
        if !buf.is_empty() {
            out.push(seg.with_text(buf));
        }
    }
    out.push(Segment::new("…", ellipsis_style));
    out
}

fn pad_segments(mut segments: Vec<Segment>, width: usize, align: CellAlign) -> Vec<Segment> {
    let pad = width.saturating_sub(segments_width(&segments));
    let (left, right) = match align {
        CellAlign::Left => (0, pad),
        CellAlign::Right => (pad, 0),
        CellAlign::Center => (pad / 2, pad - pad / 2),
    };
    if left > 0 {
        segments.insert(0, Segment::new(" ".repeat(left), Style::default()));
    }
    if right > 0 {
        segments.push(Segment::new(" ".repeat(right), Style::default()));
    }
    segments
}

fn trim_trailing_ws(line: &mut Vec<Segment>) {
    while let Some(last) = line.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            line.pop();
            continue;
        }
        if trimmed.len() != last.text.len() {
            last.text = trimmed.to_string();
        }
        break;
    }
}

fn is_all_ws(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

fn digits(n: usize) -> usize {
    n.max(1).to_string().len()
}
