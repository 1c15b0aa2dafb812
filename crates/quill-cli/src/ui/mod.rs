//! TUI rendering: header, routed body, status bar.

pub mod board;
pub mod home;
pub mod login;

use chrono::Local;
use quill_core::resource::Resource;
use quill_dashboard::{Mode, Notice, gate::Route};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, BoardView};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Draw one frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

/// A `width` × `height` rectangle centred in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let place = match app.route() {
    Some(Route::Home) => "home",
    Some(Route::Login) => "login",
    Some(Route::Posts) => "blog",
    Some(Route::Listings) => "career",
    None => "?",
  };

  let left = Span::styled(
    format!(" quill  {place}"),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  match app.route() {
    Some(Route::Login) => login::draw(f, area, app),
    Some(Route::Home) => home::draw(f, area, app),
    Some(Route::Posts) => board::draw(f, area, &app.posts),
    Some(Route::Listings) => board::draw(f, area, &app.listings),
    None => draw_not_found(f, area, &app.session.location()),
  }
}

fn draw_not_found(f: &mut Frame, area: Rect, location: &str) {
  let block = Block::default()
    .title(" Not found ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(Span::styled(
      format!("Nothing lives at {location}. Press Esc to go home."),
      Style::default().fg(Color::DarkGray),
    ))),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, message) = match app.route() {
    Some(Route::Login) => (
      "LOGIN",
      hint("Type the access key  Enter sign in  Ctrl-C quit"),
    ),
    Some(Route::Home) => (
      "HOME",
      hint("↑↓/jk select  Enter open  b blog  c career  Ctrl-L logout  q quit"),
    ),
    Some(Route::Posts) => board_status(&app.posts),
    Some(Route::Listings) => board_status(&app.listings),
    None => ("?", hint("Esc home  q quit")),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let line = Line::from(vec![mode_span, Span::raw("  "), message]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

fn hint(text: &'static str) -> Span<'static> {
  Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn board_status<T: Resource>(view: &BoardView<T>) -> (&'static str, Span<'static>) {
  let board = &view.board;
  let (label, hints) = match board.mode() {
    _ if view.pending_delete.is_some() => ("CONFIRM", "y delete  n keep"),
    Mode::Viewing if view.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter keep"),
    Mode::Viewing => (
      "LIST",
      "↑↓/jk move  / search  a add  e edit  d delete  r reload  Esc home  q quit",
    ),
    Mode::Adding => ("ADD", "Tab next field  Ctrl-S save  Esc cancel"),
    Mode::Editing(_) => ("EDIT", "Tab next field  Ctrl-S save  Esc cancel"),
  };

  let message = match board.notice() {
    Some(Notice::Success(text)) => Span::styled(text, Style::default().fg(Color::Green)),
    Some(Notice::Error(text)) => Span::styled(text, Style::default().fg(Color::Red)),
    None if board.is_submitting() => Span::styled("Saving…", Style::default().fg(Color::Yellow)),
    None if board.is_loading() => Span::styled("Loading…", Style::default().fg(Color::Yellow)),
    None => hint(hints),
  };
  (label, message)
}
