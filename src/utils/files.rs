//! Turning file references into something readable from disk.
use crate::backend::HTTP_CLIENT;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// A file reference resolved to a local path.
///
/// Downloaded files live in a temp file that is removed when this value is dropped.
#[derive(Debug)]
pub enum LocalFile {
    Existing(PathBuf),
    Downloaded(NamedTempFile),
}

impl LocalFile {
    pub fn path(&self) -> &Path {
        match self {
            LocalFile::Existing(path) => path,
            LocalFile::Downloaded(file) => file.path(),
        }
    }
}

/// Resolve `file://` URIs and plain paths to an existing local file.
pub fn local_path(uri: &str) -> Option<PathBuf> {
    let path = match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => match url.to_file_path() {
            Ok(path) => path,
            Err(_) => {
                log::warn!("Invalid file URI: {}", uri);
                return None;
            }
        },
        // Windows drive letters parse as a one-letter scheme
        Ok(url) if url.scheme().len() > 1 => {
            log::warn!("Unsupported URI scheme for local file: {}", url.scheme());
            return None;
        }
        _ => PathBuf::from(uri),
    };

    if path.is_file() {
        Some(path)
    } else {
        log::warn!("File does not exist: {:?}", path);
        None
    }
}

/// Download `url` into a fresh temp file. The file keeps the URL's extension.
pub async fn download_to_temp_file(url: &str) -> Option<NamedTempFile> {
    let response = match HTTP_CLIENT.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Failed to download {}: {}", url, e);
            return None;
        }
    };
    if !response.status().is_success() {
        log::warn!("Download of {} failed with status {}", url, response.status());
        return None;
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read body of {}: {}", url, e);
            return None;
        }
    };

    let suffix = Url::parse(url)
        .ok()
        .and_then(|u| {
            Path::new(u.path())
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
        })
        .unwrap_or_default();

    let file = match tempfile::Builder::new()
        .prefix("download_")
        .suffix(&suffix)
        .tempfile()
    {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Failed to create temp file: {}", e);
            return None;
        }
    };
    if let Err(e) = tokio::fs::write(file.path(), &bytes).await {
        log::warn!("Failed to write downloaded file: {}", e);
        return None;
    }

    log::debug!("Downloaded {} ({} bytes) to {:?}", url, bytes.len(), file.path());
    Some(file)
}

/// Resolve any supported reference (`file://`, `http(s)://`, plain path) to a local file.
pub async fn materialize(uri: &str) -> Option<LocalFile> {
    match Url::parse(uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            download_to_temp_file(uri).await.map(LocalFile::Downloaded)
        }
        _ => local_path(uri).map(LocalFile::Existing),
    }
}

/// MIME type from the file extension, for storage uploads.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}
