//! Login screen.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let popup = super::centered(area, 56, 8);
  let block = Block::default()
    .title(" Sign in ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);

  // The key is never echoed.
  let masked = "•".repeat(app.login_key.chars().count());
  let mut lines = vec![
    Line::from(Span::styled("Access key", Style::default().fg(Color::DarkGray))),
    Line::from(vec![
      Span::styled(masked, Style::default().add_modifier(Modifier::BOLD)),
      Span::styled("_", Style::default().fg(Color::Cyan)),
    ]),
    Line::default(),
  ];
  if let Some(error) = app.session.last_error() {
    lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
