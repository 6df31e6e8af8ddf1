use std::path::Path;

use reqwest::multipart;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::metrics;

/// Truncate to at most `max_chars` characters, never splitting a codepoint
/// — error bodies from third-party hosts are free-form and may be UTF-8.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Upload a local file to a fallback-ordered set of ephemeral HTTPS file
/// hosts. The first host returning a directly-downloadable URL wins; if
/// all three fail, `upload-failed` carries every host's error detail.
pub async fn upload_to_temp_hosting(http: &reqwest::Client, path: &Path) -> Result<String> {
    let mut errors = Vec::new();

    match try_catbox(http, path).await {
        Ok(url) => {
            metrics::record_upload_attempt("catbox.moe", "ok");
            return Ok(url);
        }
        Err(e) => {
            metrics::record_upload_attempt("catbox.moe", "error");
            errors.push(format!("catbox.moe: {e}"));
        }
    }

    match try_0x0(http, path).await {
        Ok(url) => {
            metrics::record_upload_attempt("0x0.st", "ok");
            return Ok(url);
        }
        Err(e) => {
            metrics::record_upload_attempt("0x0.st", "error");
            errors.push(format!("0x0.st: {e}"));
        }
    }

    match try_file_io(http, path).await {
        Ok(url) => {
            metrics::record_upload_attempt("file.io", "ok");
            return Ok(url);
        }
        Err(e) => {
            metrics::record_upload_attempt("file.io", "error");
            errors.push(format!("file.io: {e}"));
        }
    }

    Err(PipelineError::UploadFailed(errors.join("; ")))
}

async fn read_part(path: &Path) -> std::io::Result<multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.mp4".to_string());
    Ok(multipart::Part::bytes(bytes).file_name(filename))
}

async fn try_catbox(http: &reqwest::Client, path: &Path) -> std::result::Result<String, String> {
    info!("uploading to catbox.moe");
    let part = read_part(path).await.map_err(|e| e.to_string())?;
    let form = multipart::Form::new()
        .text("reqtype", "fileupload")
        .part("fileToUpload", part);

    let response = http
        .post("https://catbox.moe/user/api.php")
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    let text = response.text().await.map_err(|e| e.to_string())?;
    if status.is_success() && text.trim().starts_with("http") {
        Ok(text.trim().to_string())
    } else {
        Err(format!("{status}: {}", truncate_chars(&text, 100)))
    }
}

async fn try_0x0(http: &reqwest::Client, path: &Path) -> std::result::Result<String, String> {
    info!("uploading to 0x0.st");
    let part = read_part(path).await.map_err(|e| e.to_string())?;
    let form = multipart::Form::new().part("file", part);

    let response = http
        .post("https://0x0.st")
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    let text = response.text().await.map_err(|e| e.to_string())?;
    if status.is_success() {
        Ok(text.trim().to_string())
    } else {
        Err(format!("{status}: {}", truncate_chars(&text, 100)))
    }
}

async fn try_file_io(http: &reqwest::Client, path: &Path) -> std::result::Result<String, String> {
    info!("uploading to file.io");
    let part = read_part(path).await.map_err(|e| e.to_string())?;
    let form = multipart::Form::new().part("file", part);

    let response = http
        .post("https://file.io")
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;
    if status.is_success() && body.get("success").and_then(|v| v.as_bool()).unwrap_or(false) {
        body.get("link")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| "missing link field".to_string())
    } else {
        Err(format!("{status}: {body}"))
    }
}
