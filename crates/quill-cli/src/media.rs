//! Media fields: `@path` values are read from disk and sent as `data:` URIs.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use quill_core::resource::{Draft, FieldKind};

/// Prefix marking a media value as a local file.
pub const FILE_PREFIX: char = '@';

/// Best-effort MIME type from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("png") => "image/png",
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    Some("svg") => "image/svg+xml",
    _ => "application/octet-stream",
  }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
  format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Replace every `@path` media field of `draft` with the file's `data:` URI.
/// Other values (URLs, existing data URIs) are left alone.
pub async fn inline_files<D: Draft>(draft: &mut D) -> std::io::Result<()> {
  for spec in D::FIELDS.iter().filter(|f| f.kind == FieldKind::Media) {
    let Some(path) = draft
      .scalar(spec.name)
      .and_then(|v| v.trim().strip_prefix(FILE_PREFIX))
      .map(str::to_owned)
    else {
      continue;
    };
    let path = crate::config::expand_tilde(Path::new(&path));
    let bytes = tokio::fs::read(&path).await.map_err(|err| {
      std::io::Error::new(err.kind(), format!("{}: {err}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "inlined media file");
    if let Some(value) = draft.scalar_mut(spec.name) {
      *value = data_uri(mime_for(&path), &bytes);
    }
  }
  Ok(())
}
