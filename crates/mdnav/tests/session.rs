use std::fs;
use std::path::Path;

use mdnav::DocumentSession;
use mdnav::LoadError;
use mdnav::LoadOutcome;
use mdnav::Navigator;
use mdnav::source::FsSource;
use mdnav_markdown::BuildOptions;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, text).expect("write fixture");
}

fn session(root: &Path) -> DocumentSession<FsSource> {
    DocumentSession::new(
        Navigator::with_base_dir(root),
        FsSource,
        BuildOptions::default(),
    )
}

#[test]
fn loads_documents_from_disk_and_walks_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "index.md", "# Index\n\n## Usage\n");
    write(dir.path(), "guide/intro.md", "# Intro\n");

    let mut s = session(dir.path());
    let LoadOutcome::Loaded(index) = s.go("index.md") else {
        panic!("index should load");
    };
    assert_eq!(index.location, dir.path().join("index.md"));
    let levels: Vec<u8> = index.document.toc.iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![1, 2]);

    let LoadOutcome::Loaded(intro) = s.go("guide/intro.md") else {
        panic!("intro should load");
    };
    assert_eq!(intro.location, dir.path().join("guide").join("intro.md"));

    let Some(LoadOutcome::Loaded(again)) = s.back() else {
        panic!("back should reload index");
    };
    assert_eq!(again.location, dir.path().join("index.md"));
}

#[test]
fn missing_file_is_not_found_and_stays_in_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut s = session(dir.path());
    match s.go("nope.md") {
        LoadOutcome::Failed {
            location,
            error: LoadError::NotFound { path },
        } => {
            assert_eq!(location, dir.path().join("nope.md"));
            assert_eq!(path, location);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(s.navigator().history().len(), 1);
    assert_eq!(s.navigator().position(), Some(0));
}

#[test]
fn directory_is_unreadable() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("folder.md")).expect("mkdir");
    let mut s = session(dir.path());
    assert!(matches!(
        s.go("folder.md"),
        LoadOutcome::Failed {
            error: LoadError::Unreadable { .. },
            ..
        }
    ));
}

#[test]
fn reload_picks_up_changes_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "notes.md", "# Old\n");
    let mut s = session(dir.path());
    assert!(s.go("notes.md").is_loaded());

    write(dir.path(), "notes.md", "# New\n\n## More\n");
    let Some(LoadOutcome::Loaded(doc)) = s.reload() else {
        panic!("reload should succeed");
    };
    let titles: Vec<&str> = doc.document.toc.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(titles, vec!["New", "More"]);
    assert_eq!(s.navigator().history().len(), 1);
}
