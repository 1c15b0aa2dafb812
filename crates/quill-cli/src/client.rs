//! reqwest implementation of the remote API.

use std::{marker::PhantomData, time::Duration};

use anyhow::Context as _;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quill_core::{
  Error, Result,
  api::{AuthApi, Receipt, ResourceApi},
  credential::Token,
  resource::{Resource, ResourceId, Routes},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::config::{RouteOverride, Settings};

// ─── Shared client ────────────────────────────────────────────────────────────

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:   String,
  pub api_key:    Option<String>,
  pub login_path: String,
  pub timeout:    Duration,
}

impl From<&Settings> for ApiConfig {
  fn from(settings: &Settings) -> Self {
    Self {
      base_url:   settings.base_url.clone(),
      api_key:    settings.api_key.clone(),
      login_path: settings.login_path.clone(),
      timeout:    Duration::from_secs(settings.timeout_secs),
    }
  }
}

/// HTTP client for the backend. Also the [`AuthApi`].
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpApi {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct MessageBody {
  message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
  key: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
  payload: Option<String>,
  message: Option<String>,
}

impl HttpApi {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// A request carrying the API key and, for collection calls, the bearer
  /// token.
  fn request(&self, method: Method, path: &str, token: Option<&Token>) -> RequestBuilder {
    let mut req = self.client.request(method, self.url(path));
    if let Some(key) = &self.config.api_key {
      req = req.header("x-api-key", key);
    }
    if let Some(token) = token {
      req = req.bearer_auth(token.expose());
    }
    req
  }

  /// Send `req` and map any non-2xx answer onto the error taxonomy.
  async fn send(&self, req: RequestBuilder, target: Option<&ResourceId>) -> Result<Response> {
    let resp = req.send().await.map_err(transport)?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<MessageBody>()
      .await
      .ok()
      .and_then(|body| body.message);
    tracing::warn!(%status, message = message.as_deref(), "request rejected");
    Err(status_error(status, message, target))
  }
}

fn transport(err: reqwest::Error) -> Error {
  tracing::warn!(error = %err, timeout = err.is_timeout(), "request did not complete");
  Error::RemoteFailure {
    status:  None,
    message: None,
  }
}

/// 401/403 → `Unauthenticated`, 404 on a targeted call → `NotFound`,
/// anything else → `RemoteFailure`.
fn status_error(
  status: StatusCode,
  message: Option<String>,
  target: Option<&ResourceId>,
) -> Error {
  match (status, target) {
    (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => Error::Unauthenticated,
    (StatusCode::NOT_FOUND, Some(id)) => Error::NotFound {
      id: id.clone(),
      message,
    },
    _ => Error::RemoteFailure {
      status: Some(status.as_u16()),
      message,
    },
  }
}

fn malformed(status: StatusCode, what: &str, err: impl std::fmt::Display) -> Error {
  tracing::warn!(%status, error = %err, "malformed {what} response");
  Error::RemoteFailure {
    status:  Some(status.as_u16()),
    message: None,
  }
}

impl AuthApi for HttpApi {
  async fn login(&self, key: &str) -> Result<Token> {
    let resp = self
      .request(Method::POST, &self.config.login_path, None)
      .json(&LoginRequest { key })
      .send()
      .await
      .map_err(transport)?;
    let status = resp.status();
    // The login route answers a bad key with its own message, so it is kept
    // as a remote failure instead of becoming `Unauthenticated`.
    let body = resp
      .json::<LoginResponse>()
      .await
      .map_err(|err| malformed(status, "login", err))?;
    match body.payload.filter(|p| !p.is_empty()) {
      Some(payload) if status.is_success() => Ok(Token::new(payload)),
      _ => Err(Error::RemoteFailure {
        status:  Some(status.as_u16()),
        message: body.message,
      }),
    }
  }
}

// ─── Collections ──────────────────────────────────────────────────────────────

/// Bytes escaped when an id is spliced into a path: everything but the
/// RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~');

/// Concrete routes for one collection after configuration is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSet {
  pub list:     String,
  pub list_key: String,
  pub create:   String,
  pub update:   String,
  pub remove:   String,
}

impl RouteSet {
  pub fn resolve(defaults: Routes, overrides: Option<&RouteOverride>) -> Self {
    let pick = |value: Option<&String>, default: &str| {
      value.cloned().unwrap_or_else(|| default.to_owned())
    };
    let o = overrides.cloned().unwrap_or_default();
    Self {
      list:     pick(o.list.as_ref(), defaults.list),
      list_key: pick(o.list_key.as_ref(), defaults.list_key),
      create:   pick(o.create.as_ref(), defaults.create),
      update:   pick(o.update.as_ref(), defaults.update),
      remove:   pick(o.remove.as_ref(), defaults.remove),
    }
  }

  fn with_id(template: &str, id: &ResourceId) -> String {
    let segment = utf8_percent_encode(id.as_str(), PATH_SEGMENT).to_string();
    template.replace("{id}", &segment)
  }
}

/// [`ResourceApi`] for the collection of `T`.
pub struct CollectionClient<T> {
  http:      HttpApi,
  routes:    RouteSet,
  _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> CollectionClient<T> {
  pub fn new(http: HttpApi, overrides: Option<&RouteOverride>) -> Self {
    Self {
      http,
      routes: RouteSet::resolve(T::COLLECTION.routes, overrides),
      _resource: PhantomData,
    }
  }

  pub fn routes(&self) -> &RouteSet { &self.routes }
}

/// Accept either a bare array or an envelope holding one under `key`.
fn parse_list<T: DeserializeOwned>(body: Value, key: &str) -> serde_json::Result<Vec<T>> {
  match body {
    Value::Object(mut map) => {
      serde_json::from_value(map.remove(key).unwrap_or(Value::Null))
    }
    other => serde_json::from_value(other),
  }
}

/// Write responses vary between routes: the item itself, the item under the
/// collection noun, a `{ message }`, or nothing at all.
fn parse_receipt<T: Resource>(body: &[u8]) -> Receipt<T> {
  let Ok(value) = serde_json::from_slice::<Value>(body) else {
    return Receipt::empty();
  };
  let message = value
    .get("message")
    .and_then(Value::as_str)
    .map(str::to_owned);
  let item = value
    .get(T::COLLECTION.noun)
    .and_then(|v| serde_json::from_value(v.clone()).ok())
    .or_else(|| serde_json::from_value(value).ok());
  Receipt { item, message }
}

impl<T: Resource> CollectionClient<T> {
  async fn write(
    &self,
    req: RequestBuilder,
    target: Option<&ResourceId>,
  ) -> Result<Receipt<T>> {
    let resp = self.http.send(req, target).await?;
    let body = resp.bytes().await.map_err(transport)?;
    Ok(parse_receipt(&body))
  }
}

impl<T: Resource> ResourceApi<T> for CollectionClient<T> {
  async fn list(&self, token: &Token) -> Result<Vec<T>> {
    let req = self.http.request(Method::GET, &self.routes.list, Some(token));
    let resp = self.http.send(req, None).await?;
    let status = resp.status();
    let body: Value = resp
      .json()
      .await
      .map_err(|err| malformed(status, T::COLLECTION.plural, err))?;
    parse_list(body, &self.routes.list_key)
      .map_err(|err| malformed(status, T::COLLECTION.plural, err))
  }

  async fn create(&self, token: &Token, draft: &T::Draft) -> Result<Receipt<T>> {
    let req = self
      .http
      .request(Method::POST, &self.routes.create, Some(token))
      .json(draft);
    self.write(req, None).await
  }

  async fn update(
    &self,
    token: &Token,
    id: &ResourceId,
    draft: &T::Draft,
  ) -> Result<Receipt<T>> {
    let path = RouteSet::with_id(&self.routes.update, id);
    let req = self
      .http
      .request(Method::PUT, &path, Some(token))
      .json(draft);
    self.write(req, Some(id)).await
  }

  async fn remove(&self, token: &Token, id: &ResourceId) -> Result<Receipt<T>> {
    let path = RouteSet::with_id(&self.routes.remove, id);
    let req = self.http.request(Method::DELETE, &path, Some(token));
    self.write(req, Some(id)).await
  }
}
