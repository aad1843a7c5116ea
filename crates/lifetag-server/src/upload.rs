//! Content-addressed photo storage.
//!
//! Uploaded images are written under the configured upload directory, named
//! by their SHA-256 digest so repeated uploads of the same bytes share one
//! file. The record stores only the returned reference string; serving the
//! files is a front-proxy concern.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Error;

/// Map a multipart content type to a file extension.
fn extension_for(media_type: Option<&str>) -> &'static str {
  match media_type {
    Some("image/jpeg") => "jpg",
    Some("image/png") => "png",
    Some("image/webp") => "webp",
    Some("image/gif") => "gif",
    _ => "bin",
  }
}

/// Persist `data` under `dir` and return the reference to store on the
/// record (`/uploads/<sha256>.<ext>`).
pub async fn save_photo(
  dir: &Path,
  data: &[u8],
  media_type: Option<&str>,
) -> Result<String, Error> {
  let digest = hex::encode(Sha256::digest(data));
  let file_name = format!("{digest}.{}", extension_for(media_type));

  tokio::fs::create_dir_all(dir).await?;
  let path = dir.join(&file_name);

  // Same digest, same bytes: nothing to rewrite.
  if !tokio::fs::try_exists(&path).await? {
    tokio::fs::write(&path, data).await?;
  }

  Ok(format!("/uploads/{file_name}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lifetag-upload-{}", uuid::Uuid::new_v4()))
  }

  #[tokio::test]
  async fn save_returns_content_addressed_ref() {
    let dir = scratch_dir();
    let reference = save_photo(&dir, b"fake-jpeg-bytes", Some("image/jpeg"))
      .await
      .unwrap();

    assert!(reference.starts_with("/uploads/"));
    assert!(reference.ends_with(".jpg"));

    let on_disk = dir.join(reference.trim_start_matches("/uploads/"));
    assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"fake-jpeg-bytes");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
  }

  #[tokio::test]
  async fn identical_bytes_dedupe_to_one_file() {
    let dir = scratch_dir();
    let a = save_photo(&dir, b"same-bytes", Some("image/png")).await.unwrap();
    let b = save_photo(&dir, b"same-bytes", Some("image/png")).await.unwrap();
    assert_eq!(a, b);

    let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
    let mut count = 0;
    while entries.next_entry().await.unwrap().is_some() {
      count += 1;
    }
    assert_eq!(count, 1);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
  }

  #[tokio::test]
  async fn unknown_media_type_falls_back_to_bin() {
    let dir = scratch_dir();
    let reference = save_photo(&dir, b"???", None).await.unwrap();
    assert!(reference.ends_with(".bin"));
    tokio::fs::remove_dir_all(&dir).await.unwrap();
  }
}
