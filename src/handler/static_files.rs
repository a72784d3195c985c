//! Static file serving module
//!
//! Maps request paths onto the document root, applies the `.html` fallback
//! for extensionless paths, and serves whole files with a MIME type.

use std::path::{Path, PathBuf};

use hyper::Response;
use tokio::fs;

use crate::config::StaticFilesConfig;
use crate::http::{self, mime, ResponseBody};
use crate::logger;

/// Serve the file a request path resolves to, or `404`
pub async fn serve(path: &str, config: &StaticFilesConfig) -> Response<ResponseBody> {
    let Some(file_path) = resolve(Path::new(&config.root), &config.default_document, path).await
    else {
        return http::build_404_response();
    };

    // Directories and files that vanish or are unreadable after resolution
    // are indistinguishable from missing files to the client
    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::build_file_response(content, content_type)
}

/// Resolve a request path to an existing file under `root`
///
/// `/` maps to `default_document`. A missing path without an extension is
/// retried with `.html` appended. The result is canonical and guaranteed to
/// lie inside the canonical document root.
pub async fn resolve(root: &Path, default_document: &str, path: &str) -> Option<PathBuf> {
    let relative = if path == "/" {
        default_document
    } else {
        path.trim_start_matches('/')
    };
    let candidate = root.join(relative);

    let found = if exists(&candidate).await {
        candidate
    } else if candidate.extension().is_none() {
        let fallback = with_html_extension(&candidate);
        if !exists(&fallback).await {
            return None;
        }
        fallback
    } else {
        return None;
    };

    contain(root, &found, path).await
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

fn with_html_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".html");
    PathBuf::from(name)
}

/// Canonicalize `file` and reject it if it escapes `root`
async fn contain(root: &Path, file: &Path, request_path: &str) -> Option<PathBuf> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Document root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    let file_canonical = fs::canonicalize(file).await.ok()?;
    if file_canonical.starts_with(&root_canonical) {
        Some(file_canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file_canonical.display()
        ));
        None
    }
}
