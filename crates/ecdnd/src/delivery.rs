//! `GET /download/{filename}`: resolve, seal, encode, respond
//!
//! Files up to the large-file threshold are sealed in memory and sent as one
//! body. Larger files become a lazy body stream: the encoded nonce first,
//! then each 1 MiB chunk sealed and encoded as it is read. Once the stream
//! has started, a failure can only end it; the client sees a truncated body.

use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use ecdn_core::{resolve_content_type, ContentType, EcdnError, EcdnResult};
use ecdn_crypto::{encode_envelope, seal_envelope, DeliveryStrategy, EnvelopeStream, SymmetricKey};
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tracing::{error, info, warn};

use crate::{error::ApiError, filename, metrics::DeliveryMetrics, state::AppState};

pub async fn download(
    State(state): State<AppState>,
    UrlPath(raw_name): UrlPath<String>,
) -> Result<Response, ApiError> {
    deliver(&state, &raw_name).await.map_err(|e| {
        match &e {
            EcdnError::NotFound(_) | EcdnError::BadInput(_) => {
                warn!(filename = %raw_name, error = %e, "download refused");
            }
            _ => {
                state.metrics.record_failure(e.kind());
                error!(filename = %raw_name, error = %e, "download failed");
            }
        }
        ApiError(e)
    })
}

async fn deliver(state: &AppState, raw_name: &str) -> EcdnResult<Response> {
    let name = filename::query_unescape(raw_name)?;
    let path = filename::resolve_in_base(&state.base_dir, &name)?;

    let size = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Err(EcdnError::NotFound(name)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EcdnError::NotFound(name))
        }
        Err(e) => return Err(EcdnError::Io(e)),
    };

    let content_type = resolve_content_type(&name);
    let strategy = DeliveryStrategy::select(size);

    let body = match strategy {
        DeliveryStrategy::Buffered => buffered_body(state.key.clone(), &path).await?,
        DeliveryStrategy::Streamed => streamed_body(state, &path, name.clone()).await?,
    };

    state.metrics.record_download(strategy.as_str(), size);
    info!(
        filename = %name,
        size,
        strategy = %strategy,
        mime = content_type.mime,
        "delivering file"
    );

    build_response(&name, content_type, body)
}

/// Read, seal and encode the whole file before responding.
async fn buffered_body(key: Arc<SymmetricKey>, path: &Path) -> EcdnResult<Body> {
    let plaintext = tokio::fs::read(path).await?;

    let encoded = tokio::task::spawn_blocking(move || -> EcdnResult<String> {
        let envelope = seal_envelope(&key, &plaintext)?;
        Ok(encode_envelope(&envelope))
    })
    .await
    .map_err(|e| EcdnError::Other(anyhow::anyhow!("seal task failed: {e}")))??;

    Ok(Body::from(encoded))
}

/// Open the file and begin the operation up front, so open, key and
/// randomness failures still produce a clean 500.
async fn streamed_body(state: &AppState, path: &Path, name: String) -> EcdnResult<Body> {
    let file = File::open(path).await?;
    let envelope = EnvelopeStream::new(&state.key, file)?;
    Ok(Body::from_stream(body_stream(envelope, state.metrics.clone(), name)))
}

/// Response body over one envelope. The stream owns the file, so it is
/// closed on completion, on error, and when the client disconnects.
fn body_stream(
    envelope: EnvelopeStream<File>,
    metrics: DeliveryMetrics,
    name: String,
) -> impl Stream<Item = EcdnResult<Bytes>> + Send {
    futures::stream::try_unfold(envelope, |mut envelope| async move {
        let piece = envelope.next_piece().await?;
        Ok::<_, EcdnError>(piece.map(|p| (Bytes::from(p), envelope)))
    })
    .inspect_err(move |e| {
        metrics.record_failure("stream");
        error!(filename = %name, error = %e, "stream aborted mid-response");
    })
}

fn build_response(name: &str, content_type: ContentType, body: Body) -> EcdnResult<Response> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.mime);

    builder = if content_type.streamable {
        builder
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CACHE_CONTROL, "no-cache")
    } else {
        builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename::query_escape(name)),
        )
    };

    builder
        .body(body)
        .map_err(|e| EcdnError::Other(anyhow::anyhow!("building response: {e}")))
}
