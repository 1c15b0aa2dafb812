//! Session gate and navigation.
//!
//! The gate is evaluated once per navigation or render and only looks at
//! whether a credential is present. It never validates the token: a stale
//! token is discovered when a collection call is rejected, which the
//! synchronizer handles by clearing the credential.

// ─── Routes ──────────────────────────────────────────────────────────────────

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// The screens of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Home,
  Login,
  Posts,
  Listings,
}

impl Route {
  pub fn path(self) -> &'static str {
    match self {
      Self::Home => HOME_ROUTE,
      Self::Login => LOGIN_ROUTE,
      Self::Posts => "/blog",
      Self::Listings => "/career",
    }
  }

  /// Map a path to a known route. Trailing slashes are ignored.
  pub fn from_path(path: &str) -> Option<Self> {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
      "" => Some(Self::Home),
      "/login" => Some(Self::Login),
      "/blog" => Some(Self::Posts),
      "/career" => Some(Self::Listings),
      _ => None,
    }
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Result of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
  Proceed,
  Redirect(&'static str),
}

/// Keeps every route except the login route behind a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGate {
  login_route: &'static str,
}

impl Default for SessionGate {
  fn default() -> Self {
    Self {
      login_route: LOGIN_ROUTE,
    }
  }
}

impl SessionGate {
  pub fn new(login_route: &'static str) -> Self { Self { login_route } }

  pub fn login_route(&self) -> &'static str { self.login_route }

  /// Redirect to the login route iff no credential is present and we are
  /// not already there. Idempotent: evaluating again after the redirect
  /// yields [`GateDecision::Proceed`].
  pub fn evaluate(&self, credential_present: bool, current: &str) -> GateDecision {
    if !credential_present && current != self.login_route {
      GateDecision::Redirect(self.login_route)
    } else {
      GateDecision::Proceed
    }
  }
}

// ─── Navigator ───────────────────────────────────────────────────────────────

/// The current location plus the gate that guards it.
#[derive(Debug, Clone)]
pub struct Navigator {
  gate:      SessionGate,
  current:   String,
  redirects: usize,
}

impl Navigator {
  pub fn new(gate: SessionGate, start: impl Into<String>) -> Self {
    Self {
      gate,
      current: start.into(),
      redirects: 0,
    }
  }

  pub fn current(&self) -> &str { &self.current }

  pub fn route(&self) -> Option<Route> { Route::from_path(&self.current) }

  /// How many times the gate has redirected so far.
  pub fn redirects(&self) -> usize { self.redirects }

  /// Move to `path`, then settle.
  pub fn navigate(&mut self, path: &str, credential_present: bool) -> &str {
    if self.current != path {
      tracing::debug!(from = %self.current, to = path, "navigate");
      self.current = path.to_owned();
    }
    self.settle(credential_present);
    &self.current
  }

  /// Run the gate against the current location; called once per render.
  ///
  /// An authenticated operator on the login route is sent home. Returns
  /// whether the location changed.
  pub fn settle(&mut self, credential_present: bool) -> bool {
    match self.gate.evaluate(credential_present, &self.current) {
      GateDecision::Redirect(to) => {
        tracing::info!(from = %self.current, to, "no credential, redirecting");
        self.current = to.to_owned();
        self.redirects += 1;
        true
      }
      GateDecision::Proceed
        if credential_present && self.current == self.gate.login_route() =>
      {
        self.current = HOME_ROUTE.to_owned();
        true
      }
      GateDecision::Proceed => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_credential_redirects_protected_routes() {
    let gate = SessionGate::default();
    assert_eq!(
      gate.evaluate(false, "/dashboard"),
      GateDecision::Redirect("/login")
    );
    assert_eq!(gate.evaluate(false, "/blog"), GateDecision::Redirect("/login"));
  }

  #[test]
  fn no_redirect_on_login_route_or_with_credential() {
    let gate = SessionGate::default();
    assert_eq!(gate.evaluate(false, "/login"), GateDecision::Proceed);
    assert_eq!(gate.evaluate(true, "/career"), GateDecision::Proceed);
    assert_eq!(gate.evaluate(true, "/login"), GateDecision::Proceed);
  }

  #[test]
  fn redirect_happens_exactly_once() {
    let mut nav = Navigator::new(SessionGate::default(), "/");
    assert_eq!(nav.navigate("/dashboard", false), "/login");
    assert_eq!(nav.redirects(), 1);

    // Re-evaluating on every render must not loop.
    for _ in 0..5 {
      assert!(!nav.settle(false));
    }
    assert_eq!(nav.current(), "/login");
    assert_eq!(nav.redirects(), 1);
  }

  #[test]
  fn authenticated_operator_leaves_login_route() {
    let mut nav = Navigator::new(SessionGate::default(), "/login");
    assert!(nav.settle(true));
    assert_eq!(nav.route(), Some(Route::Home));
    assert_eq!(nav.redirects(), 0);
  }

  #[test]
  fn routes_round_trip_through_paths() {
    for route in [Route::Home, Route::Login, Route::Posts, Route::Listings] {
      assert_eq!(Route::from_path(route.path()), Some(route));
    }
    assert_eq!(Route::from_path("/career/"), Some(Route::Listings));
    assert_eq!(Route::from_path("/dashboard"), None);
  }
}
