//! services/api/src/web/upload.rs
//!
//! Reads the multipart forms used by the image upload routes.

use axum::extract::{multipart::MultipartError, Multipart};
use livestock_core::AnalysisImage;
use std::collections::HashMap;

/// Content type assumed when a file part does not declare an `image/*` type.
pub const FALLBACK_IMAGE_TYPE: &str = "image/jpeg";

/// A parsed upload: the image part, if any, plus every text field.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<AnalysisImage>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Returns a trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Collects the form. The part named `image_field` becomes the image; an empty
/// file counts as missing.
pub async fn read_upload(
    mut multipart: Multipart,
    image_field: &str,
) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == image_field {
            let mime_type = field
                .content_type()
                .filter(|ct| ct.starts_with("image/"))
                .unwrap_or(FALLBACK_IMAGE_TYPE)
                .to_string();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                form.image = Some(AnalysisImage::new(bytes.to_vec(), mime_type));
            }
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}
