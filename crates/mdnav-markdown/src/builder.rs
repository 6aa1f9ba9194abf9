//! Single-pass construction of the block tree from a flat token stream.

use mdnav_core::render::CellAlign;
use mdnav_core::theme::Theme;
use ratatui::style::Style;
use tracing::trace;

use crate::error::BuildError;
use crate::error::BuildResult;
use crate::inline::resolve_inline;
use crate::node::BlockKind;
use crate::node::BlockNode;
use crate::node::Document;
use crate::node::HeadingId;
use crate::node::TableGrid;
use crate::node::TocEntry;
use crate::style::StyleClass;
use crate::table;
use crate::token::Token;

/// Bullet used for items of unordered lists.
pub const BULLET_MARKER: &str = "● ";

/// Inline style classes resolved to concrete styles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub emphasis: Style,
    pub strong: Style,
    pub strike: Style,
    pub code_inline: Style,
}

impl BuildOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            emphasis: StyleClass::Emphasis.style(theme),
            strong: StyleClass::Strong.style(theme),
            strike: StyleClass::Strike.style(theme),
            code_inline: StyleClass::CodeInline.style(theme),
        }
    }

    pub fn class_style(&self, class: StyleClass) -> Style {
        match class {
            StyleClass::Emphasis => self.emphasis,
            StyleClass::Strong => self.strong,
            StyleClass::Strike => self.strike,
            StyleClass::CodeInline => self.code_inline,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

/// Builds the block tree and table of contents for one token stream.
///
/// Every call starts from fresh state: heading ids restart at 1 and nothing is shared between
/// calls. Any nesting violation in the stream fails the whole build.
pub fn build<F>(tokens: &[Token], class_style: &F) -> BuildResult<Document>
where
    F: Fn(StyleClass) -> Style,
{
    let mut builder = TreeBuilder::default();
    for token in tokens {
        builder.feed(token, class_style)?;
    }
    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<BlockNode>,
    roots: Vec<BlockNode>,
    toc: Vec<TocEntry>,
    headings: u32,
}

impl TreeBuilder {
    fn feed<F>(&mut self, token: &Token, class_style: &F) -> BuildResult<()>
    where
        F: Fn(StyleClass) -> Style,
    {
        if let Some(name) = token.opened()
            && let Some(kind) = open_kind(name, token)
        {
            let mut node = BlockNode::new(kind);
            if matches!(node.kind, BlockKind::Heading(_)) {
                self.headings += 1;
                node.id = Some(HeadingId(self.headings));
            }
            self.stack.push(node);
            return Ok(());
        }

        if let Some(name) = token.closed()
            && is_block_name(name)
        {
            return self.close(name);
        }

        match token.kind.as_str() {
            "inline" => {
                let run = resolve_inline(&token.children, class_style)?;
                let top = self.stack.last_mut().ok_or(BuildError::InlineOutsideBlock)?;
                top.content = Some(run);
            }
            "fence" | "code_block" => {
                let language = if token.kind == "fence" {
                    normalize_fence_language(&token.info)
                } else {
                    None
                };
                let code = token.content.trim_end().to_string();
                self.attach(BlockNode::new(BlockKind::FencedCode { language, code }));
            }
            "hr" => self.attach(BlockNode::new(BlockKind::Rule)),
            other => trace!(kind = other, "ignoring token"),
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> BuildResult<()> {
        let Some(top) = self.stack.last() else {
            return Err(BuildError::UnbalancedBlockClose {
                kind: format!("{name}_close"),
            });
        };
        if top.kind.name() != name {
            return Err(BuildError::MismatchedBlockClose {
                expected: top.kind.name(),
                found: format!("{name}_close"),
            });
        }
        let Some(mut node) = self.stack.pop() else {
            return Ok(());
        };

        match node.kind {
            BlockKind::Heading(level) => {
                if let Some(id) = node.id {
                    self.toc.push(TocEntry {
                        level,
                        text: node.plain_text(),
                        id,
                    });
                }
            }
            BlockKind::Table(_) => table::assemble(&mut node),
            _ => {}
        }

        self.attach(node);
        Ok(())
    }

    fn attach(&mut self, node: BlockNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn finish(self) -> BuildResult<Document> {
        if let Some(open) = self.stack.last() {
            return Err(BuildError::UnclosedBlock {
                kind: open.kind.name(),
            });
        }
        Ok(Document {
            roots: self.roots,
            toc: self.toc,
        })
    }
}

fn open_kind(name: &str, token: &Token) -> Option<BlockKind> {
    let kind = match name {
        "heading" => BlockKind::Heading(heading_level(&token.tag)),
        "paragraph" => BlockKind::Paragraph,
        "blockquote" => BlockKind::BlockQuote,
        "bullet_list" => BlockKind::BulletList,
        "ordered_list" => BlockKind::OrderedList,
        "list_item" => BlockKind::ListItem {
            marker: list_marker(&token.info),
        },
        "table" => BlockKind::Table(TableGrid::default()),
        "thead" => BlockKind::TableHead,
        "tbody" => BlockKind::TableBody,
        "tr" => BlockKind::TableRow,
        "th" => BlockKind::TableHeaderCell {
            align: cell_align(token),
        },
        "td" => BlockKind::TableDataCell {
            align: cell_align(token),
        },
        _ => return None,
    };
    Some(kind)
}

fn is_block_name(name: &str) -> bool {
    matches!(
        name,
        "heading"
            | "paragraph"
            | "blockquote"
            | "bullet_list"
            | "ordered_list"
            | "list_item"
            | "table"
            | "thead"
            | "tbody"
            | "tr"
            | "th"
            | "td"
    )
}

/// `h3` → 3. Anything unparsable is treated as a top-level heading.
fn heading_level(tag: &str) -> u8 {
    tag.strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .unwrap_or(1)
        .clamp(1, 6)
}

fn list_marker(info: &str) -> String {
    let ordinal = info.trim();
    if ordinal.is_empty() {
        BULLET_MARKER.to_string()
    } else {
        format!("{ordinal}. ")
    }
}

fn cell_align(token: &Token) -> CellAlign {
    match token.attr("align") {
        Some("center") => CellAlign::Center,
        Some("right") => CellAlign::Right,
        _ => CellAlign::Left,
    }
}

/// First word of a fence info string, tolerating `language-rust` and `{rust}` spellings.
fn normalize_fence_language(info: &str) -> Option<String> {
    let first = info.split_whitespace().next().unwrap_or("");
    let first = first.split(',').next().unwrap_or("").trim();
    let first = first.strip_prefix("language-").unwrap_or(first);
    let first = first.strip_prefix('{').unwrap_or(first);
    let first = first.strip_suffix('}').unwrap_or(first).trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
