use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use mdnav::BrowserApp;
use mdnav::BrowserOptions;
use mdnav::DocumentSession;
use mdnav_core::crossterm_input::input_event_from_crossterm;
use mdnav_markdown::BuildOptions;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "mdnav")]
#[command(about = "Browse Markdown documents in the terminal")]
#[command(version)]
struct Cli {
    /// Document to open
    #[arg(default_value = "README.md")]
    path: String,

    /// Start with the table of contents hidden
    #[arg(long)]
    no_toc: bool,

    /// Write logs to this file (filter with MDNAV_LOG, e.g. MDNAV_LOG=mdnav=debug)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Number the lines of fenced code blocks
    #[arg(long)]
    line_numbers: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let mut options = BrowserOptions {
        show_toc: !cli.no_toc,
        ..Default::default()
    };
    options.view.layout.show_code_line_numbers = cli.line_numbers;
    let session = DocumentSession::from_fs(BuildOptions::from_theme(&options.theme));

    let mut app = BrowserApp::new(session, options);
    #[cfg(feature = "syntect")]
    app.set_highlighter(Some(std::sync::Arc::new(
        mdnav_markdown::highlight::SyntectHighlighter::new(),
    )));

    if !app.open(&cli.path) {
        eprintln!("Unable to load '{}'", cli.path);
        if let Some(panel) = app.error() {
            eprintln!("{}", panel.message);
        }
        return Ok(ExitCode::FAILURE);
    }
    info!(path = %cli.path, "starting browser");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res?;
    Ok(ExitCode::SUCCESS)
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut BrowserApp) -> anyhow::Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|f| {
                let area = f.area();
                app.render(area, f.buffer_mut());
            })?;
            dirty = false;
        }

        if !crossterm::event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Some(event) = input_event_from_crossterm(crossterm::event::read()?) else {
            continue;
        };
        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        dirty |= app.handle_event(area, event);
        if app.should_quit() {
            return Ok(());
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("unable to create log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("MDNAV_LOG").unwrap_or_else(|_| "mdnav=info".into()))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
