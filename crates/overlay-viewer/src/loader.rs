use crate::error::{Result, ViewerError};
use crate::overlay::geometry::{CoordinateRecord, PageSize};
use log::{info, warn};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::thread;

/// Composite identity of one document inside a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub review_id: String,
    pub citation_id: String,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub base_url: String,
    pub auth_token: String,
}

/// Layout-extraction payload for one document. Every field may be absent
/// or empty; the viewer then shows the document without overlay
/// capability.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnnotationData {
    #[serde(default)]
    pub coords: Vec<CoordinateRecord>,
    #[serde(default)]
    pub pages: Vec<PageSize>,
    #[serde(default)]
    pub fulltext: String,
}

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub annotations: AnnotationData,
}

/// Error bodies from the backend come as `{"error": ...}` or FastAPI's
/// `{"detail": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.or(parsed.detail))
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn document_url(config: &LoaderConfig, key: &DocumentKey) -> String {
    format!(
        "{}/sr/{}/citations/{}/document",
        config.base_url.trim_end_matches('/'),
        key.review_id,
        key.citation_id
    )
}

fn annotation_url(config: &LoaderConfig, key: &DocumentKey) -> String {
    format!(
        "{}/sr/{}/citations/{}/coordinates",
        config.base_url.trim_end_matches('/'),
        key.review_id,
        key.citation_id
    )
}

fn get_bytes(client: &reqwest::blocking::Client, url: &str, token: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .map_err(|e| ViewerError::FetchFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ViewerError::FetchFailed(error_message(
            status.as_u16(),
            &body,
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| ViewerError::FetchFailed(e.to_string()))?;
    Ok(bytes.to_vec())
}

fn get_annotations(
    client: &reqwest::blocking::Client,
    url: &str,
    token: &str,
) -> Result<AnnotationData> {
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .map_err(|e| ViewerError::FetchFailed(e.to_string()))?;

    let status = response.status();
    // No extraction exists for some citations; the document still shows.
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(AnnotationData::default());
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ViewerError::FetchFailed(error_message(
            status.as_u16(),
            &body,
        )));
    }

    response
        .json::<AnnotationData>()
        .map_err(|e| ViewerError::FetchFailed(e.to_string()))
}

fn fetch_document(config: &LoaderConfig, key: &DocumentKey) -> Result<FetchedDocument> {
    let client = reqwest::blocking::Client::new();

    let bytes = get_bytes(&client, &document_url(config, key), &config.auth_token)?;
    let annotations = get_annotations(&client, &annotation_url(config, key), &config.auth_token)?;

    info!(
        "Fetched document {}/{} ({} bytes, {} coordinate records)",
        key.review_id,
        key.citation_id,
        bytes.len(),
        annotations.coords.len()
    );

    Ok(FetchedDocument { bytes, annotations })
}

/// One in-flight authenticated document fetch. The background thread
/// publishes exactly one outcome into the slot; the UI polls it each
/// frame. Dropping the handle orphans the slot, so a fetch for a
/// superseded document key is discarded on arrival.
pub struct DocumentFetch {
    slot: Arc<Mutex<Option<Result<FetchedDocument>>>>,
}

impl DocumentFetch {
    pub fn spawn(config: LoaderConfig, key: DocumentKey) -> Self {
        let slot = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&slot);

        thread::spawn(move || {
            let outcome = fetch_document(&config, &key);
            if let Err(error) = &outcome {
                warn!(
                    "Document fetch for {}/{} failed: {}",
                    key.review_id, key.citation_id, error
                );
            }
            *writer.lock() = Some(outcome);
        });

        Self { slot }
    }

    /// Take the outcome if the fetch has finished; `None` while still in
    /// flight (or after the outcome was already taken).
    pub fn poll(&self) -> Option<Result<FetchedDocument>> {
        self.slot.lock().take()
    }
}
