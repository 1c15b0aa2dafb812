//! Application state machine and event dispatcher.

use std::{future::Future, sync::Arc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use quill_core::{
  Error,
  list_field::ListField,
  listing::Listing,
  post::Post,
  resource::{Draft, FieldKind, FieldSpec, Resource, ResourceId},
};
use quill_dashboard::{
  Board, DeleteRequest, Mode, Session,
  gate::{HOME_ROUTE, Route},
  sync::Op,
};
use quill_store_sqlite::SqliteStore;

use crate::{
  client::{CollectionClient, HttpApi},
  media,
};

pub type BoardOf<T> = Board<T, CollectionClient<T>, SqliteStore>;

/// Entries of the home menu.
pub const HOME_ENTRIES: [(&str, Route); 2] =
  [("Blog", Route::Posts), ("Career", Route::Listings)];

/// What a screen asks the app to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  /// Leave to the home screen.
  Back,
  Quit,
}

// ─── Board view ───────────────────────────────────────────────────────────────

/// Terminal-side state for one collection page. The board itself owns the
/// mirror, mode and draft; this only adds cursors and prompts.
pub struct BoardView<T: Resource> {
  pub board:          Arc<BoardOf<T>>,
  /// Cursor within the *filtered* list.
  pub cursor:         usize,
  pub filter:         String,
  pub filter_active:  bool,
  /// Index into the draft's field table.
  pub focus:          usize,
  /// Selected entry of the focused list field.
  pub item_cursor:    usize,
  pub pending_delete: Option<DeleteRequest>,
  mounted:            bool,
}

impl<T: Resource> BoardView<T> {
  pub fn new(board: BoardOf<T>) -> Self {
    Self {
      board:          Arc::new(board),
      cursor:         0,
      filter:         String::new(),
      filter_active:  false,
      focus:          0,
      item_cursor:    0,
      pending_delete: None,
      mounted:        false,
    }
  }

  fn spawn<F, Fut>(&self, f: F)
  where
    F: FnOnce(Arc<BoardOf<T>>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
  {
    tokio::spawn(f(Arc::clone(&self.board)));
  }

  /// Indices of mirror entries matching the filter, in mirror order.
  pub fn visible(&self, mirror: &[T]) -> Vec<usize> { filter_indices(mirror, &self.filter) }

  fn cursor_id(&self) -> Option<ResourceId> {
    let mirror = self.board.mirror();
    let visible = self.visible(&mirror);
    visible.get(self.cursor).map(|&i| mirror[i].id().clone())
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible(&self.board.mirror()).len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  fn reset_form_cursor(&mut self) {
    self.focus = 0;
    self.item_cursor = 0;
  }

  /// The page became visible: fetch once.
  fn enter(&mut self) {
    if self.mounted {
      return;
    }
    self.mounted = true;
    self.cursor = 0;
    self.spawn(|board| async move {
      let _ = board.mount().await;
    });
  }

  /// The page was left: drop the draft, prompts and filter.
  fn leave(&mut self) {
    self.mounted = false;
    self.board.cancel();
    self.board.clear_notice();
    self.pending_delete = None;
    self.filter.clear();
    self.filter_active = false;
  }

  pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
    if self.pending_delete.is_some() {
      self.handle_confirm_key(key);
      return Flow::Continue;
    }
    match self.board.mode() {
      Mode::Viewing if self.filter_active => {
        self.handle_filter_key(key);
        Flow::Continue
      }
      Mode::Viewing => self.handle_list_key(key).await,
      Mode::Adding | Mode::Editing(_) => {
        self.handle_form_key(key).await;
        Flow::Continue
      }
    }
  }

  fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y' | 'Y') => {
        if let Some(request) = self.pending_delete.take() {
          let confirmed = request.confirm();
          self.spawn(move |board| async move {
            let _ = board.delete(confirmed).await;
          });
        }
      }
      KeyCode::Char('n' | 'N') | KeyCode::Esc => self.pending_delete = None,
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.cursor = 0;
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> Flow {
    match key.code {
      KeyCode::Char('q') => return Flow::Quit,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => return Flow::Back,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible(&self.board.mirror()).len();
        if self.cursor + 1 < len {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      KeyCode::Char('r') => self.spawn(|board| async move {
        let _ = board.reload().await;
      }),

      KeyCode::Char('a') => {
        if self.board.open_add() {
          self.reset_form_cursor();
        }
      }
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(id) = self.cursor_id()
          && self.board.open_edit(&id).await
        {
          self.reset_form_cursor();
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_id() {
          self.pending_delete = self.board.request_delete(&id).ok();
        }
      }
      _ => {}
    }
    Flow::Continue
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let fields = <T::Draft as Draft>::FIELDS;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => {
        self.board.cancel();
        return;
      }
      KeyCode::Char('s') if ctrl => {
        self.submit().await;
        return;
      }
      KeyCode::Tab => {
        self.focus = (self.focus + 1) % fields.len();
        self.item_cursor = 0;
        return;
      }
      KeyCode::BackTab => {
        self.focus = (self.focus + fields.len() - 1) % fields.len();
        self.item_cursor = 0;
        return;
      }
      _ => {}
    }

    let Some(spec) = fields.get(self.focus) else {
      return;
    };
    if key.code == KeyCode::Enter && !spec.kind.is_list() && spec.kind != FieldKind::LongText {
      self.focus = (self.focus + 1) % fields.len();
      self.item_cursor = 0;
      return;
    }
    let mut item_cursor = self.item_cursor;
    self.board.edit_draft(|draft| {
      edit_field(draft, spec, &mut item_cursor, key);
    });
    self.item_cursor = item_cursor;
  }

  /// Inline `@path` media, then submit in the background.
  async fn submit(&self) {
    if self.board.is_submitting() {
      return;
    }
    let Some(mut draft) = self.board.draft() else {
      return;
    };
    if let Err(err) = media::inline_files(&mut draft).await {
      let op = match self.board.mode() {
        Mode::Editing(_) => Op::Update,
        _ => Op::Create,
      };
      let err = Error::ValidationFailed(format!("Could not read {err}."));
      self.board.synchronizer().report(op, &err).await;
      return;
    }
    self.board.edit_draft(|d| *d = draft);
    self.spawn(|board| async move {
      let _ = board.submit().await;
    });
  }
}

/// Fuzzy-match `query` against titles. An empty query matches everything.
pub fn filter_indices<T: Resource>(items: &[T], query: &str) -> Vec<usize> {
  if query.is_empty() {
    return (0..items.len()).collect();
  }
  let matcher = SkimMatcherV2::default();
  items
    .iter()
    .enumerate()
    .filter(|(_, item)| matcher.fuzzy_match(item.title(), query).is_some())
    .map(|(i, _)| i)
    .collect()
}

// ─── Field editing ────────────────────────────────────────────────────────────

/// Apply one key press to the focused field. Returns whether the draft
/// changed.
pub fn edit_field<D: Draft>(
  draft: &mut D,
  spec: &FieldSpec,
  item_cursor: &mut usize,
  key: KeyEvent,
) -> bool {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  match spec.kind {
    FieldKind::Text | FieldKind::LongText | FieldKind::Media => {
      let Some(value) = draft.scalar_mut(spec.name) else {
        return false;
      };
      match key.code {
        KeyCode::Char(c) if !ctrl => {
          value.push(c);
          true
        }
        KeyCode::Enter if spec.kind == FieldKind::LongText => {
          value.push('\n');
          true
        }
        KeyCode::Backspace => value.pop().is_some(),
        _ => false,
      }
    }
    FieldKind::Choice(_) => match key.code {
      KeyCode::Right | KeyCode::Char(' ') => draft.cycle_choice(spec.name, true),
      KeyCode::Left => draft.cycle_choice(spec.name, false),
      _ => false,
    },
    FieldKind::List => {
      let Some(list) = draft.list_mut(spec.name) else {
        return false;
      };
      match key.code {
        KeyCode::Char('d') if ctrl => remove_selected(list, item_cursor),
        KeyCode::Char(c) if !ctrl => {
          list.pending_mut().push(c);
          true
        }
        KeyCode::Backspace => list.pending_mut().pop().is_some(),
        KeyCode::Enter => {
          let added = if spec.unique { list.add_unique() } else { list.add() };
          if added {
            *item_cursor = list.len() - 1;
          }
          added
        }
        code => move_item_cursor(list, item_cursor, code),
      }
    }
    FieldKind::Tags(options) => {
      let Some(list) = draft.list_mut(spec.name) else {
        return false;
      };
      match key.code {
        KeyCode::Char('d') if ctrl => remove_selected(list, item_cursor),
        KeyCode::Char(c) => {
          let option = c
            .to_digit(10)
            .and_then(|d| (d as usize).checked_sub(1))
            .and_then(|i| options.get(i));
          match option {
            Some(option) => {
              list.toggle(option);
              *item_cursor = (*item_cursor).min(list.len().saturating_sub(1));
              true
            }
            None => false,
          }
        }
        code => move_item_cursor(list, item_cursor, code),
      }
    }
  }
}

fn move_item_cursor(list: &ListField, item_cursor: &mut usize, code: KeyCode) -> bool {
  match code {
    KeyCode::Left => *item_cursor = item_cursor.saturating_sub(1),
    KeyCode::Right if *item_cursor + 1 < list.len() => *item_cursor += 1,
    _ => {}
  }
  false
}

fn remove_selected(list: &mut ListField, item_cursor: &mut usize) -> bool {
  let removed = list.remove_at(*item_cursor).is_some();
  *item_cursor = (*item_cursor).min(list.len().saturating_sub(1));
  removed
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub session:     Session<HttpApi, SqliteStore>,
  /// Key typed on the login screen. Never persisted.
  pub login_key:   String,
  pub home_cursor: usize,
  pub posts:       BoardView<Post>,
  pub listings:    BoardView<Listing>,
  /// The route whose screen is currently set up.
  shown:           Option<Route>,
}

impl App {
  pub fn new(
    session: Session<HttpApi, SqliteStore>,
    posts: BoardOf<Post>,
    listings: BoardOf<Listing>,
  ) -> Self {
    Self {
      session,
      login_key: String::new(),
      home_cursor: 0,
      posts: BoardView::new(posts),
      listings: BoardView::new(listings),
      shown: None,
    }
  }

  pub fn route(&self) -> Option<Route> { self.session.route() }

  /// Called once per frame before drawing: run the gate, then set up or
  /// tear down screens whose route changed. Never fetches unless a board
  /// screen was just entered.
  pub fn tick(&mut self) {
    self.session.settle();
    let route = self.session.route();
    if route != self.shown {
      match self.shown {
        Some(Route::Posts) => self.posts.leave(),
        Some(Route::Listings) => self.listings.leave(),
        Some(Route::Login) => self.login_key.clear(),
        _ => {}
      }
      match route {
        Some(Route::Posts) => self.posts.enter(),
        Some(Route::Listings) => self.listings.enter(),
        _ => {}
      }
      tracing::debug!(from = ?self.shown, to = ?route, "screen changed");
      self.shown = route;
    }
    self.posts.clamp_cursor();
    self.listings.clamp_cursor();
  }

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
      return false;
    }
    if ctrl && key.code == KeyCode::Char('l') && self.session.is_authenticated() {
      if let Err(err) = self.session.logout().await {
        tracing::warn!(error = %err, "failed to clear stored credential");
      }
      return true;
    }

    let flow = match self.session.route() {
      Some(Route::Login) => {
        self.handle_login_key(key).await;
        Flow::Continue
      }
      Some(Route::Home) => self.handle_home_key(key),
      Some(Route::Posts) => self.posts.handle_key(key).await,
      Some(Route::Listings) => self.listings.handle_key(key).await,
      None => match key.code {
        KeyCode::Char('q') => Flow::Quit,
        KeyCode::Esc => Flow::Back,
        _ => Flow::Continue,
      },
    };

    match flow {
      Flow::Quit => return false,
      Flow::Back => {
        self.session.navigate(HOME_ROUTE);
      }
      Flow::Continue => {}
    }
    true
  }

  async fn handle_login_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Enter => {
        let key = self.login_key.clone();
        if self.session.login(&key).await.is_ok() {
          self.login_key.clear();
        }
      }
      KeyCode::Backspace => {
        self.login_key.pop();
        self.session.clear_error();
      }
      KeyCode::Char(c) => {
        self.login_key.push(c);
        self.session.clear_error();
      }
      _ => {}
    }
  }

  fn handle_home_key(&mut self, key: KeyEvent) -> Flow {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.home_cursor + 1 < HOME_ENTRIES.len() {
          self.home_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.home_cursor = self.home_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some((_, route)) = HOME_ENTRIES.get(self.home_cursor) {
          self.session.navigate(route.path());
        }
      }
      KeyCode::Char('b') => {
        self.session.navigate(Route::Posts.path());
      }
      KeyCode::Char('c') => {
        self.session.navigate(Route::Listings.path());
      }
      _ => {}
    }
    Flow::Continue
  }
}
