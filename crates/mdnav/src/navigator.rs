//! Browser-style history over document locations.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A stack of absolute document paths with a cursor, like a browser's back/forward history.
///
/// Relative targets passed to [`Navigator::go`] resolve against the directory of the current
/// document, or against the base directory while the history is empty. Going somewhere new always
/// discards the forward history, even when the target equals an entry that was just left.
#[derive(Clone, Debug)]
pub struct Navigator {
    history: Vec<PathBuf>,
    position: Option<usize>,
    base_dir: PathBuf,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// A navigator resolving its first location against the process working directory.
    pub fn new() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            history: Vec::new(),
            position: None,
            base_dir: base_dir.into(),
        }
    }

    pub fn current(&self) -> Option<&Path> {
        self.position
            .and_then(|i| self.history.get(i))
            .map(PathBuf::as_path)
    }

    /// The current location, or `.` before the first [`Navigator::go`].
    pub fn location(&self) -> PathBuf {
        self.current()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolves `target`, appends it after the current position and makes it current.
    pub fn go(&mut self, target: impl AsRef<Path>) -> PathBuf {
        let dir = match self.current() {
            Some(current) => current.parent().unwrap_or(current).to_path_buf(),
            None => self.base_dir.clone(),
        };
        let resolved = normalize(&dir.join(target.as_ref()));

        if let Some(position) = self.position {
            self.history.truncate(position + 1);
        }
        self.history.push(resolved.clone());
        self.position = Some(self.history.len() - 1);
        resolved
    }

    /// Moves one entry back. Returns whether the location changed.
    pub fn back(&mut self) -> bool {
        match self.position {
            Some(position) if position > 0 => {
                self.position = Some(position - 1);
                true
            }
            _ => false,
        }
    }

    /// Moves one entry forward. Returns whether the location changed.
    pub fn forward(&mut self) -> bool {
        match self.position {
            Some(position) if position + 1 < self.history.len() => {
                self.position = Some(position + 1);
                true
            }
            _ => false,
        }
    }

    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn can_go_back(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.history.len())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Lexically removes `.` and `..` components. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> Navigator {
        Navigator::with_base_dir("/docs")
    }

    #[test]
    fn empty_navigator_reports_dot() {
        let n = nav();
        assert_eq!(n.location(), PathBuf::from("."));
        assert!(n.current().is_none());
        assert!(!n.can_go_back());
    }

    #[test]
    fn go_back_go_truncates_forward_history() {
        let mut n = nav();
        assert_eq!(n.go("a.md"), PathBuf::from("/docs/a.md"));
        assert_eq!(n.go("b.md"), PathBuf::from("/docs/b.md"));
        assert!(n.back());
        assert_eq!(n.location(), PathBuf::from("/docs/a.md"));
        n.go("c.md");
        assert!(!n.forward());
        assert_eq!(
            n.history(),
            &[PathBuf::from("/docs/a.md"), PathBuf::from("/docs/c.md")]
        );
    }

    #[test]
    fn back_at_start_and_forward_at_end_do_nothing() {
        let mut n = nav();
        assert!(!n.back());
        assert!(!n.forward());
        n.go("a.md");
        assert!(!n.back());
        assert!(!n.forward());
        assert_eq!(n.position(), Some(0));
    }

    #[test]
    fn back_then_forward_restores_location() {
        let mut n = nav();
        n.go("a.md");
        n.go("b.md");
        assert!(n.back());
        assert!(n.can_go_forward());
        assert!(n.forward());
        assert_eq!(n.location(), PathBuf::from("/docs/b.md"));
    }

    #[test]
    fn parent_segments_resolve_against_current_directory() {
        let mut n = Navigator::with_base_dir("/");
        n.go("/docs/sub/a.md");
        assert_eq!(n.go("../b.md"), PathBuf::from("/docs/b.md"));
        assert_eq!(n.go("./c/../d.md"), PathBuf::from("/docs/d.md"));
    }

    #[test]
    fn absolute_targets_ignore_current_directory() {
        let mut n = nav();
        n.go("a.md");
        assert_eq!(n.go("/etc/notes.md"), PathBuf::from("/etc/notes.md"));
    }

    #[test]
    fn returning_to_a_just_left_location_still_appends() {
        let mut n = nav();
        n.go("a.md");
        n.go("b.md");
        n.back();
        n.go("b.md");
        assert_eq!(n.history().len(), 2);
        assert_eq!(n.position(), Some(1));
    }

    #[test]
    fn parent_of_root_stays_at_root() {
        let mut n = Navigator::with_base_dir("/");
        assert_eq!(n.go("../../x.md"), PathBuf::from("/x.md"));
    }
}
