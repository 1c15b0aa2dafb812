//! Error taxonomy shared by every layer of quill.

use thiserror::Error;

use crate::resource::ResourceId;

#[derive(Debug, Error)]
pub enum Error {
  /// No credential is stored, or the server rejected the one we sent.
  #[error("not authenticated")]
  Unauthenticated,

  /// Client-side validation rejected a draft; nothing reached the network.
  #[error("validation failed: {0}")]
  ValidationFailed(String),

  /// The target id is missing from the mirror, or the server answered 404.
  #[error("not found: {id}")]
  NotFound {
    id:      ResourceId,
    message: Option<String>,
  },

  /// Any other non-2xx answer (`status` set) or a transport failure
  /// (`status` is `None`).
  #[error("remote failure ({}): {}", status_label(.status), message_label(.message))]
  RemoteFailure {
    status:  Option<u16>,
    message: Option<String>,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used when deciding how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Unauthenticated,
  ValidationFailed,
  NotFound,
  RemoteFailure,
  Storage,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Unauthenticated => ErrorKind::Unauthenticated,
      Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::RemoteFailure { .. } => ErrorKind::RemoteFailure,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }

  /// Wrap a storage backend error.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }

  /// The message the server attached to a failure, if any.
  pub fn server_message(&self) -> Option<&str> {
    match self {
      Self::NotFound { message, .. } | Self::RemoteFailure { message, .. } => {
        message.as_deref().filter(|m| !m.trim().is_empty())
      }
      _ => None,
    }
  }

  /// `true` when the request never produced an HTTP response.
  pub fn is_transport(&self) -> bool {
    matches!(self, Self::RemoteFailure { status: None, .. })
  }
}

fn status_label(status: &Option<u16>) -> String {
  status.map_or_else(|| "transport".to_owned(), |s| s.to_string())
}

fn message_label(message: &Option<String>) -> &str {
  message.as_deref().unwrap_or("no message")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_message_ignores_blank_payloads() {
    let err = Error::RemoteFailure {
      status:  Some(500),
      message: Some("   ".into()),
    };
    assert_eq!(err.server_message(), None);

    let err = Error::NotFound {
      id:      ResourceId::new("abc"),
      message: Some("Career not found".into()),
    };
    assert_eq!(err.server_message(), Some("Career not found"));
  }

  #[test]
  fn transport_failures_have_no_status() {
    let err = Error::RemoteFailure { status: None, message: None };
    assert!(err.is_transport());
    assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    assert_eq!(err.to_string(), "remote failure (transport): no message");
  }
}
