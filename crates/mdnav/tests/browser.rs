use std::fs;
use std::path::Path;

use mdnav::BrowserApp;
use mdnav::BrowserOptions;
use mdnav::DocumentSession;
use mdnav::Navigator;
use mdnav::app::Focus;
use mdnav::source::FsSource;
use mdnav_core::input::InputEvent;
use mdnav_core::input::KeyCode;
use mdnav_core::input::MouseEvent;
use mdnav_core::keymap;
use mdnav_markdown::BuildOptions;
use mdnav_markdown::HeadingId;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tempfile::TempDir;

const INDEX: &str = "# Index

See [the guide](guide/intro.md) and [the site](https://example.com).

## Details

More text.
";

const INTRO: &str = "# Intro

Back to [index](../index.md#details).
";

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 20,
};

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("index.md"), INDEX).expect("write index");
    fs::create_dir(dir.path().join("guide")).expect("mkdir");
    fs::write(dir.path().join("guide").join("intro.md"), INTRO).expect("write intro");
    dir
}

fn app(root: &Path) -> BrowserApp<FsSource> {
    let session = DocumentSession::new(
        Navigator::with_base_dir(root),
        FsSource,
        BuildOptions::default(),
    );
    BrowserApp::new(session, BrowserOptions::default())
}

fn render(app: &mut BrowserApp<FsSource>) -> Vec<String> {
    let mut buf = Buffer::empty(AREA);
    app.render(AREA, &mut buf);
    (0..AREA.height)
        .map(|y| {
            (0..AREA.width)
                .map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}

fn press(app: &mut BrowserApp<FsSource>, code: KeyCode) -> bool {
    app.handle_event(AREA, InputEvent::Key(keymap::key(code)))
}

fn press_char(app: &mut BrowserApp<FsSource>, c: char) -> bool {
    press(app, KeyCode::Char(c))
}

fn location(app: &BrowserApp<FsSource>) -> std::path::PathBuf {
    app.session().navigator().location()
}

#[test]
fn initial_open_fills_document_and_toc() {
    let dir = fixture();
    let mut app = app(dir.path());
    assert!(app.open("index.md"));
    assert_eq!(app.toc().entries().len(), 2);

    let rows = render(&mut app);
    assert!(rows.iter().any(|r| r.contains("Ⅰ Index")));
    assert!(rows.iter().any(|r| r.contains("Ⅱ Details")));
    assert!(rows.iter().any(|r| r.contains("See the guide and the site.")));
    assert!(rows[19].contains("toc"));
    assert!(rows[18].contains("index.md"));
}

#[test]
fn initial_open_of_missing_file_reports_error() {
    let dir = fixture();
    let mut app = app(dir.path());
    assert!(!app.open("missing.md"));
    let panel = app.error().expect("error panel");
    assert_eq!(panel.location, dir.path().join("missing.md"));
    let rows = render(&mut app);
    assert!(rows.iter().any(|r| r.contains("Unable to load")));
}

#[test]
fn following_links_navigates_and_jumps_to_fragments() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    render(&mut app);

    assert!(press_char(&mut app, 'n'));
    assert_eq!(
        app.view().focused_link().map(|l| l.target.as_str()),
        Some("guide/intro.md")
    );
    assert!(press(&mut app, KeyCode::Enter));
    assert_eq!(location(&app), dir.path().join("guide").join("intro.md"));

    render(&mut app);
    press_char(&mut app, 'n');
    press(&mut app, KeyCode::Enter);
    assert_eq!(location(&app), dir.path().join("index.md"));
    assert_eq!(app.toc().selected().map(|e| e.id), Some(HeadingId(2)));
    assert_eq!(app.session().navigator().history().len(), 3);
}

#[test]
fn back_and_forward_move_through_history() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    app.follow_link("guide/intro.md");

    press_char(&mut app, 'b');
    assert_eq!(location(&app), dir.path().join("index.md"));
    press(&mut app, KeyCode::Backspace);
    assert_eq!(location(&app), dir.path().join("index.md"));
    assert_eq!(app.status(), Some("Already at the first page"));

    press_char(&mut app, 'f');
    assert_eq!(location(&app), dir.path().join("guide").join("intro.md"));
    assert_eq!(app.status(), None);
}

#[test]
fn external_links_are_reported_not_followed() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    app.follow_link("https://example.com");
    assert_eq!(app.status(), Some("External link: https://example.com"));
    assert_eq!(app.session().navigator().history().len(), 1);
}

#[test]
fn email_autolinks_are_reported_not_followed() {
    let dir = fixture();
    fs::write(dir.path().join("contact.md"), "Mail <someone@example.com>\n").expect("write");
    let mut app = app(dir.path());
    app.open("contact.md");
    render(&mut app);

    press_char(&mut app, 'n');
    assert_eq!(
        app.view().focused_link().map(|l| l.target.as_str()),
        Some("mailto:someone@example.com")
    );
    press(&mut app, KeyCode::Enter);
    assert_eq!(
        app.status(),
        Some("External link: mailto:someone@example.com")
    );
    assert!(app.error().is_none());
    assert_eq!(app.session().navigator().history().len(), 1);
}

#[test]
fn broken_link_shows_error_panel_until_back() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    app.follow_link("nowhere.md");
    assert!(app.error().is_some());
    assert_eq!(app.session().navigator().history().len(), 2);

    press_char(&mut app, 'b');
    assert!(app.error().is_none());
    assert_eq!(app.toc().entries().len(), 2);
}

#[test]
fn unknown_fragment_sets_status() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    assert!(!app.jump_to_fragment("nope"));
    assert_eq!(app.status(), Some("No heading matches #nope"));
    assert!(app.jump_to_fragment("block2"));
}

#[test]
fn tab_switches_focus_only_while_toc_is_visible() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    render(&mut app);

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::Toc);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.toc().selected().map(|e| e.id), Some(HeadingId(2)));

    press_char(&mut app, 't');
    assert!(!app.show_toc());
    assert_eq!(app.focus(), Focus::Document);
    assert!(app.layout(AREA).toc.is_none());

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::Document);
    assert!(app.view().focused_link().is_some());
}

#[test]
fn clicking_the_toc_focuses_it_and_selects_the_row() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    render(&mut app);

    let toc = app.layout(AREA).toc.expect("toc pane");
    let click = InputEvent::Mouse(MouseEvent::click(toc.x, toc.y + 1));
    assert!(app.handle_event(AREA, click));
    assert_eq!(app.focus(), Focus::Toc);
    assert_eq!(app.toc().selected().map(|e| e.id), Some(HeadingId(2)));
}

#[test]
fn reload_rereads_the_current_document() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    fs::write(dir.path().join("index.md"), "# Index\n\n## A\n\n## B\n").expect("rewrite");
    press_char(&mut app, 'r');
    assert_eq!(app.toc().entries().len(), 3);
    assert_eq!(app.session().navigator().history().len(), 1);
}

#[test]
fn reload_keeps_offset_clamped_to_a_shorter_document() {
    let dir = fixture();
    let long = (0..60).map(|i| format!("line {i}\n\n")).collect::<String>();
    fs::write(dir.path().join("long.md"), long).expect("write long");
    let mut app = app(dir.path());
    app.open("long.md");
    render(&mut app);
    press(&mut app, KeyCode::End);
    render(&mut app);
    assert!(app.view().state.y > 50);

    fs::write(dir.path().join("long.md"), "# Short\n\nNow brief.\n").expect("rewrite");
    press_char(&mut app, 'r');
    let rows = render(&mut app);
    assert_eq!(app.view().state.y, 0);
    assert!(rows.iter().any(|r| r.contains("Now brief.")));
}

#[test]
fn history_hints_dim_at_either_end() {
    let dir = fixture();
    let mut app = app(dir.path());
    assert_eq!(app.help().is_enabled("b"), Some(false));
    assert_eq!(app.help().is_enabled("f"), Some(false));

    app.open("index.md");
    assert_eq!(app.help().is_enabled("b"), Some(false));
    app.follow_link("guide/intro.md");
    assert_eq!(app.help().is_enabled("b"), Some(true));
    assert_eq!(app.help().is_enabled("f"), Some(false));

    press_char(&mut app, 'b');
    assert_eq!(app.help().is_enabled("b"), Some(false));
    assert_eq!(app.help().is_enabled("f"), Some(true));
    let rows = render(&mut app);
    assert!(rows[19].contains("b back"));
}

#[test]
fn q_and_esc_quit() {
    let dir = fixture();
    let mut app = app(dir.path());
    app.open("index.md");
    assert!(!app.should_quit());
    press(&mut app, KeyCode::Esc);
    assert!(app.should_quit());
}
