//! Poster image shown before the first frame arrives.

use iced::widget::image::Handle;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PosterError {
    #[error("network error: {0}")]
    Request(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("empty response body")]
    Empty,
}

/// Download the poster and hand it to iced for decoding.
pub async fn fetch(url: String) -> Result<Handle, PosterError> {
    let response = reqwest::get(&url)
        .await
        .map_err(|e| PosterError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PosterError::Status(status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PosterError::Request(e.to_string()))?;
    if bytes.is_empty() {
        return Err(PosterError::Empty);
    }

    log::debug!("Poster fetched: {} bytes", bytes.len());
    Ok(Handle::from_bytes(bytes))
}
