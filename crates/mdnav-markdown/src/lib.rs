//! Markdown document model and terminal views for `mdnav`.
//!
//! ## Pipeline
//!
//! 1. [`tokenize::tokenize`] turns Markdown text into a flat [`token::Token`] stream.
//! 2. [`builder::build`] turns the stream into a [`node::Document`]: a forest of
//!    [`node::BlockNode`]s carrying styled inline runs ([`style::StyleRun`]), assembled table grids
//!    and a table of contents.
//! 3. [`layout::layout_document`] wraps the tree to a width, recording heading anchors and link
//!    hit regions.
//!
//! [`view::DocumentView`] and [`toc::TocView`] are the interactive widgets on top of that.
//! [`parse_document`] runs steps 1 and 2 in one call.
pub mod builder;
pub mod error;
pub mod inline;
pub mod node;
pub mod style;
pub mod table;
pub mod token;
pub mod tokenize;

pub mod layout;
pub mod toc;
pub mod view;

#[cfg(feature = "syntect")]
pub mod highlight;

pub use builder::BuildOptions;
pub use error::BuildError;
pub use node::Document;
pub use node::HeadingId;

/// Tokenizes and builds `markdown` in one go.
pub fn parse_document(markdown: &str, options: &BuildOptions) -> error::BuildResult<Document> {
    let tokens = tokenize::tokenize(markdown);
    builder::build(&tokens, &|class| options.class_style(class))
}
