//! The block tree produced by [`crate::builder::build`].

use std::fmt;

use mdnav_core::render::CellAlign;

use crate::style::StyleRun;

/// Identifier of a heading inside one built document.
///
/// Ids are handed out in document order starting at 1 and are only unique within the
/// [`Document`] they came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingId(pub u32);

impl fmt::Display for HeadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block{}", self.0)
    }
}

/// A table flattened into header cells and body rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableGrid {
    /// Alignment per column, in column order.
    pub aligns: Vec<CellAlign>,
    pub headers: Vec<StyleRun>,
    pub rows: Vec<Vec<StyleRun>>,
}

impl TableGrid {
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn align(&self, column: usize) -> CellAlign {
        self.aligns.get(column).copied().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    BlockQuote,
    BulletList,
    OrderedList,
    ListItem { marker: String },
    /// Filled in when the table closes; until then the rows live in the node's children.
    Table(TableGrid),
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell { align: CellAlign },
    TableDataCell { align: CellAlign },
    FencedCode { language: Option<String>, code: String },
    Rule,
}

impl BlockKind {
    /// Token vocabulary name, matching the `*_open`/`*_close` token that creates this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Heading(_) => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::BlockQuote => "blockquote",
            BlockKind::BulletList => "bullet_list",
            BlockKind::OrderedList => "ordered_list",
            BlockKind::ListItem { .. } => "list_item",
            BlockKind::Table(_) => "table",
            BlockKind::TableHead => "thead",
            BlockKind::TableBody => "tbody",
            BlockKind::TableRow => "tr",
            BlockKind::TableHeaderCell { .. } => "th",
            BlockKind::TableDataCell { .. } => "td",
            BlockKind::FencedCode { .. } => "fence",
            BlockKind::Rule => "hr",
        }
    }

    /// Kinds created from a single token that can never hold children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockKind::FencedCode { .. } | BlockKind::Rule)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockNode {
    pub kind: BlockKind,
    /// Set on headings only.
    pub id: Option<HeadingId>,
    pub content: Option<StyleRun>,
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            id: None,
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: HeadingId) -> Self {
        self.id = Some(id);
        self
    }

    /// The resolved inline content with styling discarded (empty when there is none).
    pub fn plain_text(&self) -> String {
        self.content
            .as_ref()
            .map(StyleRun::to_plain)
            .unwrap_or_default()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BlockNode::node_count).sum::<usize>()
    }

    /// Depth-first, pre-order walk over this subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a BlockNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// One table-of-contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub id: HeadingId,
}

/// A built document: top-level blocks in document order plus the headings index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub roots: Vec<BlockNode>,
    pub toc: Vec<TocEntry>,
}

impl Document {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(BlockNode::node_count).sum()
    }

    pub fn heading(&self, id: HeadingId) -> Option<&BlockNode> {
        let mut found = None;
        for root in &self.roots {
            root.walk(&mut |node| {
                if found.is_none() && node.id == Some(id) {
                    found = Some(node);
                }
            });
        }
        found
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
