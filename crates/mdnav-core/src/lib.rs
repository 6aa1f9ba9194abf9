//! `mdnav-core` holds the terminal building blocks shared by the Markdown document view and the
//! browser application.
//!
//! Nothing in here knows about Markdown. The crate provides:
//!
//! - an event model decoupled from any backend ([`input`]), with an optional crossterm adapter
//!   behind the `crossterm` feature
//! - key bindings and action tables ([`keymap`])
//! - scroll state for a line-oriented viewport ([`viewport`])
//! - clipped span painting, scrollbars and span measuring helpers ([`render`])
//! - the color/style palette ([`theme`]) and a one-line help bar ([`help`])
//! - the [`text::CodeHighlighter`] seam used for fenced code
//!
//! All components are driven from the caller's event loop on a single thread.
pub mod theme;

pub mod text;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod viewport;

pub mod help;
pub mod input;
pub mod keymap;
