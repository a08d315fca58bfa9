use async_trait::async_trait;
use leptess::LepTess;

use crate::error::{LlarmyError, Result};

use super::engine::PrintedTextEngine;
use super::language::DEFAULT_PRINTED_LANGUAGE;
use super::loader::DecodedImage;

/// Printed-material engine backed by the system Tesseract through leptess.
///
/// A new `LepTess` is built for every call: the language changes per request
/// and an instance must not be shared between concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    data_path: Option<String>,
}

impl TesseractEngine {
    pub fn new(data_path: Option<String>) -> Self {
        Self { data_path }
    }

    pub fn data_path(&self) -> Option<&str> {
        self.data_path.as_deref()
    }

    /// Whether traineddata for `lang` can be loaded.
    pub fn is_available(&self, lang: &str) -> bool {
        LepTess::new(self.data_path.as_deref(), lang).is_ok()
    }
}

#[async_trait]
impl PrintedTextEngine for TesseractEngine {
    async fn image_to_string(&self, image: &DecodedImage, lang: &str) -> Result<String> {
        let png = image.to_png()?;
        let data_path = self.data_path.clone();
        let lang = lang.to_string();

        tokio::task::spawn_blocking(move || recognize(data_path.as_deref(), &lang, &png))
            .await
            .map_err(|e| LlarmyError::Internal(format!("OCR task panicked: {e}")))?
    }

    async fn health_check(&self) -> Result<()> {
        let engine = self.clone();
        let available =
            tokio::task::spawn_blocking(move || engine.is_available(DEFAULT_PRINTED_LANGUAGE))
                .await
                .map_err(|e| LlarmyError::Internal(format!("OCR task panicked: {e}")))?;

        if available {
            Ok(())
        } else {
            Err(LlarmyError::Tesseract(format!(
                "Failed to initialize language '{DEFAULT_PRINTED_LANGUAGE}'"
            )))
        }
    }
}

fn recognize(data_path: Option<&str>, lang: &str, png: &[u8]) -> Result<String> {
    let mut lt = LepTess::new(data_path, lang).map_err(|e| {
        LlarmyError::Tesseract(format!("Failed to initialize language '{lang}': {e}"))
    })?;
    lt.set_image_from_mem(png)
        .map_err(|e| LlarmyError::Tesseract(format!("Failed to set image: {e}")))?;
    lt.get_utf8_text()
        .map_err(|e| LlarmyError::Tesseract(format!("Failed to extract text: {e}")))
}
