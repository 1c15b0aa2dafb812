//! `quill`: terminal admin console for blog posts and career listings.
//!
//! # Usage
//!
//! ```
//! quill --url http://localhost:8080 --api-key k
//! quill --config ~/.config/quill/quill.toml
//! ```
//!
//! Settings are read from the config file, then `QUILL_*` environment
//! variables (`QUILL_BASE_URL`, `QUILL_ROUTES__BLOGS__LIST`, ...), then flags.

mod app;
mod client;
mod config;
mod media;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiConfig, CollectionClient, HttpApi};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use quill_core::credential::CredentialStore;
use quill_dashboard::{Board, Session, gate::HOME_ROUTE};
use quill_store_sqlite::SqliteStore;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quill", about = "Terminal admin console for blogs and careers")]
struct Args {
  /// Path to a TOML config file. Missing files are ignored.
  #[arg(short, long, value_name = "FILE", default_value = "quill.toml")]
  config: PathBuf,

  /// Base URL of the backend.
  #[arg(long)]
  url: Option<String>,

  /// Value of the `x-api-key` header.
  #[arg(long)]
  api_key: Option<String>,

  /// SQLite file holding the session credential.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Where to write logs; the terminal belongs to the UI.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = config::load(&args.config, config::Overrides {
    url:      args.url,
    api_key:  args.api_key,
    store:    args.store,
    log_file: args.log_file,
  })?;
  init_tracing(&settings.log_file);

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("opening local storage at {}", settings.store_path.display()))?;
  let credentials = Arc::new(
    CredentialStore::load(store)
      .await
      .context("loading stored credential")?,
  );

  let http = HttpApi::new(ApiConfig::from(&settings))?;
  let posts = Board::new(
    CollectionClient::new(http.clone(), settings.routes.posts.as_ref()),
    Arc::clone(&credentials),
  );
  let listings = Board::new(
    CollectionClient::new(http.clone(), settings.routes.listings.as_ref()),
    Arc::clone(&credentials),
  );
  let session = Session::new(http, credentials, HOME_ROUTE);
  tracing::info!(
    base_url = %settings.base_url,
    authenticated = session.is_authenticated(),
    "starting"
  );
  let mut app = App::new(session, posts, listings);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to `path`. If the file cannot be opened the console runs unlogged.
fn init_tracing(path: &Path) {
  if let Some(parent) = path.parent() {
    let _ = std::fs::create_dir_all(parent);
  }
  let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
    return;
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.tick();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
