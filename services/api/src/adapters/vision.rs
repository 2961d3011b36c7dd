//! services/api/src/adapters/vision.rs
//!
//! This module contains the adapter for the external breed detector, a small
//! HTTP service exposing `POST /predict`. It implements the `VisionHintService`
//! port from the `core` crate.

use async_trait::async_trait;
use livestock_core::{
    domain::{AnalysisImage, BreedCandidate},
    ports::{PortError, PortResult, VisionHintService},
};
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// An adapter that forwards images to the breed detector over multipart HTTP.
#[derive(Clone)]
pub struct HttpVisionAdapter {
    client: reqwest::Client,
    predict_url: String,
}

impl HttpVisionAdapter {
    /// Creates a new adapter for the detector rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        }
    }

    fn file_name(mime_type: &str) -> String {
        let extension = mime_type.strip_prefix("image/").unwrap_or("jpg");
        format!("upload.{}", extension)
    }
}

#[async_trait]
impl VisionHintService for HttpVisionAdapter {
    async fn detect_breeds(
        &self,
        image: &AnalysisImage,
        language: &str,
    ) -> PortResult<Vec<BreedCandidate>> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(Self::file_name(&image.mime_type))
            .mime_str(&image.mime_type)
            .map_err(|e| PortError::Unexpected(format!("Invalid image type: {}", e)))?;
        let form = Form::new()
            .part("file", file)
            .text("language", language.to_string());

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Vision service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Vision service returned {}: {}",
                status, body
            )));
        }

        let candidates: Vec<BreedCandidate> = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Vision response was not a detection list: {}", e)))?;
        debug!(count = candidates.len(), "Vision service responded.");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_url_is_joined_once() {
        let adapter = HttpVisionAdapter::new(reqwest::Client::new(), "http://127.0.0.1:5000/");
        assert_eq!(adapter.predict_url, "http://127.0.0.1:5000/predict");
    }

    #[test]
    fn file_name_follows_mime_type() {
        assert_eq!(HttpVisionAdapter::file_name("image/png"), "upload.png");
        assert_eq!(HttpVisionAdapter::file_name("application/octet-stream"), "upload.jpg");
    }
}
