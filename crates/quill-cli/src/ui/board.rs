//! Collection page: list view, form view and delete prompt.

use quill_core::{
  listing::Listing,
  post::Post,
  resource::{Draft, FieldKind, FieldSpec, Resource},
};
use quill_dashboard::{DeleteRequest, Mode};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::BoardView;

/// One-line summary shown next to an item's title.
pub trait Row {
  fn summary(&self) -> String;
}

impl Row for Post {
  fn summary(&self) -> String {
    let mut parts = Vec::new();
    if let Some(created) = self.created_at {
      parts.push(created.format("%Y-%m-%d").to_string());
    }
    if let Some(views) = self.views {
      parts.push(format!("{views} views"));
    }
    if !self.tags.is_empty() {
      parts.push(self.tags.join(", "));
    }
    parts.join(" · ")
  }
}

impl Row for Listing {
  fn summary(&self) -> String {
    let kind: &'static str = self.employment_type.into();
    let mode: &'static str = self.work_mode.into();
    let level: &'static str = self.job_level.into();
    let mut summary = format!("{kind} · {mode} · {level}");
    if !self.deadline.is_empty() {
      summary.push_str(&format!(" · until {}", self.deadline));
    }
    summary
  }
}

fn selected_style() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

fn dim() -> Style { Style::default().fg(Color::DarkGray) }

pub fn draw<T: Resource + Row>(f: &mut Frame, area: Rect, view: &BoardView<T>) {
  let noun = T::COLLECTION.title_noun();
  match view.board.mode() {
    Mode::Viewing => draw_list(f, area, view),
    Mode::Adding => draw_form(f, area, view, format!(" New {noun} ")),
    Mode::Editing(_) => draw_form(f, area, view, format!(" Edit {noun} ")),
  }
  if let Some(request) = &view.pending_delete {
    draw_confirm(f, area, request);
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn draw_list<T: Resource + Row>(f: &mut Frame, area: Rect, view: &BoardView<T>) {
  let mirror = view.board.mirror();
  let visible = view.visible(&mirror);
  let noun = T::COLLECTION.title_noun();

  let title = if view.filter_active || !view.filter.is_empty() {
    format!(" {noun} ({}/{}) ", visible.len(), mirror.len())
  } else {
    format!(" {noun} ({}) ", mirror.len())
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(dim());
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if (view.filter_active || !view.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect {
      y: inner.y + inner.height - 1,
      height: 1,
      ..inner
    };
    inner.height -= 1;
    let caret = if view.filter_active { "_" } else { "" };
    f.render_widget(
      Paragraph::new(format!("/{}{caret}", view.filter)).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if mirror.is_empty() {
    let text = if view.board.is_loading() {
      format!("Loading {}…", T::COLLECTION.plural)
    } else {
      format!("No {} yet. Press a to add one.", T::COLLECTION.plural)
    };
    f.render_widget(Paragraph::new(Span::styled(text, dim())), inner);
    return;
  }

  let items: Vec<ListItem> = visible
    .iter()
    .map(|&i| {
      let item = &mirror[i];
      ListItem::new(Line::from(vec![
        Span::raw(item.title().to_owned()),
        Span::styled(format!("  {}", item.summary()), dim()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!visible.is_empty()).then_some(view.cursor));
  f.render_stateful_widget(
    List::new(items).highlight_style(selected_style()),
    inner,
    &mut state,
  );
}

// ─── Form ─────────────────────────────────────────────────────────────────────

fn draw_form<T: Resource>(f: &mut Frame, area: Rect, view: &BoardView<T>, title: String) {
  let Some(draft) = view.board.draft() else {
    return;
  };

  let mut lines = Vec::new();
  let mut focus_line = 0;
  for (i, spec) in <T::Draft as Draft>::FIELDS.iter().enumerate() {
    let focused = i == view.focus;
    if focused {
      focus_line = lines.len();
    }
    let (marker, style) = if focused {
      ("› ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    } else {
      ("  ", dim())
    };
    let required = if spec.required { " *" } else { "" };
    lines.push(Line::from(Span::styled(
      format!("{marker}{}{required}", spec.label),
      style,
    )));
    field_lines(&draft, spec, focused, view.item_cursor, &mut lines);
    lines.push(Line::default());
  }

  let border = if view.board.is_submitting() { Color::Yellow } else { Color::Cyan };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  let scroll = (focus_line as u16).saturating_sub(inner.height / 3);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

/// Media values may be whole files; show only their header.
fn media_preview(value: &str) -> String {
  match value.split_once(',') {
    Some((header, data)) if header.starts_with("data:") => {
      format!("{header},… ({} chars)", data.len())
    }
    _ => value.to_owned(),
  }
}

fn field_lines<D: Draft>(
  draft: &D,
  spec: &FieldSpec,
  focused: bool,
  item_cursor: usize,
  lines: &mut Vec<Line<'static>>,
) {
  let caret = if focused { "_" } else { "" };
  match spec.kind {
    FieldKind::Text => {
      let value = draft.scalar(spec.name).unwrap_or_default();
      lines.push(Line::from(format!("    {value}{caret}")));
    }
    FieldKind::Media => {
      let value = media_preview(draft.scalar(spec.name).unwrap_or_default());
      lines.push(Line::from(format!("    {value}{caret}")));
      if focused {
        lines.push(Line::from(Span::styled(
          "    URL, data: URI, or @path to a local file",
          dim(),
        )));
      }
    }
    FieldKind::LongText => {
      let value = draft.scalar(spec.name).unwrap_or_default();
      let mut body: Vec<Line<'static>> =
        value.split('\n').map(|l| Line::from(format!("    {l}"))).collect();
      if let Some(last) = body.last_mut() {
        last.push_span(Span::raw(caret));
      }
      lines.extend(body);
    }
    FieldKind::Choice(options) => {
      let current = draft.scalar(spec.name).unwrap_or_default();
      let mut spans = vec![Span::raw("    ")];
      for option in options {
        if *option == current {
          spans.push(Span::styled(format!("[{option}]"), selected_style()));
        } else {
          spans.push(Span::styled(format!(" {option} "), dim()));
        }
        spans.push(Span::raw(" "));
      }
      if focused {
        spans.push(Span::styled(" ←/→", dim()));
      }
      lines.push(Line::from(spans));
    }
    FieldKind::List => {
      let Some(list) = draft.list(spec.name) else {
        return;
      };
      lines.push(chips(list.keyed(), focused, item_cursor, spec.item_noun));
      lines.push(Line::from(vec![
        Span::styled("    + ", dim()),
        Span::raw(format!("{}{caret}", list.pending())),
      ]));
    }
    FieldKind::Tags(options) => {
      let Some(list) = draft.list(spec.name) else {
        return;
      };
      let mut spans = vec![Span::raw("    ")];
      for (n, option) in options.iter().enumerate() {
        let mark = if list.contains(option) { "x" } else { " " };
        spans.push(Span::styled(format!("{} [{mark}] {option}  ", n + 1), dim()));
      }
      lines.push(Line::from(spans));
      lines.push(chips(list.keyed(), focused, item_cursor, spec.item_noun));
    }
  }
}

fn chips<'a>(
  items: impl Iterator<Item = (usize, &'a str)>,
  focused: bool,
  item_cursor: usize,
  noun: &str,
) -> Line<'static> {
  let mut spans = vec![Span::raw("    ")];
  for (i, item) in items {
    let style = if focused && i == item_cursor { selected_style() } else { Style::default() };
    spans.push(Span::styled(format!("[{item}]"), style));
    spans.push(Span::raw(" "));
  }
  if spans.len() == 1 {
    spans.push(Span::styled(format!("no {noun}s yet"), dim()));
  }
  Line::from(spans)
}

// ─── Delete prompt ────────────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, area: Rect, request: &DeleteRequest) {
  let popup = super::centered(area, 60, 5);
  let block = Block::default()
    .title(" Delete ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(popup);
  f.render_widget(Clear, popup);
  f.render_widget(block, popup);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(format!("Delete “{}”?", request.title())),
      Line::from(Span::styled("y delete  n keep", dim())),
    ])
    .wrap(Wrap { trim: true }),
    inner,
  );
}
