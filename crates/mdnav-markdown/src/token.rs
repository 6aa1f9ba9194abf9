//! The flat token stream consumed by the block tree builder.
//!
//! Tokens follow the markdown-it vocabulary (`heading_open`, `inline`, `fence`, ...) so the builder
//! stays independent of the parser that produced them. [`crate::tokenize`] produces this stream
//! from pulldown-cmark events; tests build streams by hand with the constructors below.

/// One entry in the token stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Token {
    /// Token type, e.g. `heading_open`, `inline`, `text`, `fence`.
    pub kind: String,
    /// HTML tag hint, e.g. `h2` for a level-2 heading.
    pub tag: String,
    /// Ordinal for ordered list items, info string for fences.
    pub info: String,
    pub content: String,
    pub attrs: Vec<(String, String)>,
    /// Children of `inline` tokens (and the alt text of `image` tokens).
    pub children: Vec<Token>,
    /// Set on paragraphs that only exist to wrap tight list item text.
    pub hidden: bool,
}

impl Token {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new("text").with_content(content)
    }

    pub fn inline(children: Vec<Token>) -> Self {
        Self::new("inline").with_children(children)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        self.children = children;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `Some("heading")` for `heading_open`.
    pub fn opened(&self) -> Option<&str> {
        self.kind.strip_suffix("_open")
    }

    /// `Some("heading")` for `heading_close`.
    pub fn closed(&self) -> Option<&str> {
        self.kind.strip_suffix("_close")
    }
}
