//! Where document text comes from.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::LoadError;

/// Reads the Markdown text stored at an absolute location.
pub trait DocumentSource {
    fn read(&self, path: &Path) -> Result<String, LoadError>;
}

/// Reads UTF-8 files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn read(&self, path: &Path) -> Result<String, LoadError> {
        fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn read(&self, path: &Path) -> Result<String, LoadError> {
        (**self).read(path)
    }
}
