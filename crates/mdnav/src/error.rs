//! Errors raised while loading a document into the browser.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use mdnav_markdown::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no document at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unable to read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to build {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: BuildError,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Unreadable { path, .. } | Self::Malformed { path, .. } => {
                path
            }
        }
    }

    /// The error and its sources joined as `outer: inner: ...`.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
