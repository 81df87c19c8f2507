//! `GET /files`: metadata of every non-directory entry in the base dir

use axum::{extract::State, Json};
use chrono::{DateTime, Local};
use ecdn_core::{EcdnResult, FileInfo};
use std::path::Path;
use std::time::SystemTime;

use crate::{error::ApiError, state::AppState};

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileInfo>>, ApiError> {
    let files = read_listing(&state.base_dir).await.map_err(|e| {
        state.metrics.record_failure("listing");
        tracing::error!(error = %e, "directory listing failed");
        ApiError(e)
    })?;
    Ok(Json(files))
}

/// List `dir` in enumeration order. Entries whose metadata cannot be read
/// are skipped.
pub async fn read_listing(dir: &Path) -> EcdnResult<Vec<FileInfo>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(entry = ?entry.file_name(), "skipping entry: {e}");
                continue;
            }
        };
        if meta.is_dir() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };

        files.push(FileInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            upload_date: format_upload_date(modified),
        });
    }

    Ok(files)
}

/// `YYYY-MM-DD HH:MM:SS` in local time.
pub fn format_upload_date(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()
}
