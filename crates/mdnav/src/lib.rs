//! `mdnav` is a terminal Markdown browser.
//!
//! - [`navigator::Navigator`] keeps back/forward history over absolute document paths.
//! - [`session::DocumentSession`] resolves a location, reads it through a
//!   [`source::DocumentSource`] and builds it with `mdnav-markdown`.
//! - [`app::BrowserApp`] puts the document and table of contents panes on screen and routes keys,
//!   mouse clicks and link activations.
pub mod app;
pub mod error;
pub mod navigator;
pub mod session;
pub mod source;
pub mod ui;

pub use app::BrowserApp;
pub use app::BrowserOptions;
pub use error::LoadError;
pub use navigator::Navigator;
pub use session::DocumentSession;
pub use session::LoadOutcome;
