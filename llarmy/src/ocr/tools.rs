use std::sync::Arc;

use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::{LlarmyError, Result};

use super::easyocr::EasyOcrClient;
use super::engine::{GeneralTextEngine, PrintedTextEngine};
use super::extraction::{extract_general, extract_printed, Backend, Extraction};
use super::language::{printed_language, LanguageList};
use super::loader::{self, DecodedImage, ImageInput, InputKind};
use super::tesseract::TesseractEngine;

/// The two OCR tools offered to agents.
///
/// Holds no per-call state; clones share the engines.
#[derive(Clone)]
pub struct OcrTools {
    printed: Arc<dyn PrintedTextEngine>,
    general: Arc<dyn GeneralTextEngine>,
}

impl OcrTools {
    pub fn new(printed: Arc<dyn PrintedTextEngine>, general: Arc<dyn GeneralTextEngine>) -> Self {
        Self { printed, general }
    }

    /// Build both engines. Nothing is contacted or loaded until a call or
    /// [`OcrTools::check_engines`].
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let printed = TesseractEngine::new(config.tessdata_path.clone());
        let general = EasyOcrClient::new(config)?;
        info!(url = %general.base_url(), "EasyOCR client initialized");

        Ok(Self::new(Arc::new(printed), Arc::new(general)))
    }

    /// Probe both engines, warning about any that is not ready.
    ///
    /// Returns whether both are usable. Calls against an unready engine still
    /// run and report the failure in their own result.
    pub async fn check_engines(&self) -> bool {
        let (printed, general) =
            tokio::join!(self.printed.health_check(), self.general.health_check());

        if let Err(e) = &printed {
            warn!(
                backend = %Backend::Tesseract,
                error = %e,
                "Printed material engine is not ready, calls will report engine errors"
            );
        }
        if let Err(e) = &general {
            warn!(
                backend = %Backend::EasyOcr,
                error = %e,
                "General purpose engine is not reachable, calls will fail until it is up"
            );
        }

        printed.is_ok() && general.is_ok()
    }

    /// Decode an input off the async runtime.
    pub async fn load(input: ImageInput) -> Result<DecodedImage> {
        tokio::task::spawn_blocking(move || loader::load(input))
            .await
            .map_err(|e| LlarmyError::Internal(format!("Image loading task panicked: {e}")))?
    }

    pub async fn printed(&self, input: ImageInput, lang: Option<&str>) -> Result<Extraction> {
        let lang = printed_language(lang);

        info!(
            backend = %Backend::Tesseract,
            input = input.kind_label(),
            lang,
            "Extracting text using tesseract"
        );
        let image = Self::load(input).await?;
        extract_printed(self.printed.as_ref(), &image, Some(lang)).await
    }

    pub async fn general(&self, input: ImageInput, lang_list: &[String]) -> Result<Extraction> {
        let langs = LanguageList::new(lang_list);

        info!(
            backend = %Backend::EasyOcr,
            input = input.kind_label(),
            langs = %langs,
            "Extracting text using EasyOCR"
        );
        let image = Self::load(input).await?;
        extract_general(self.general.as_ref(), &image, &langs).await
    }

    /// Extract text from printed material; `lang` defaults to `eng`.
    pub async fn printed_material_extract_text(
        &self,
        image_path_or_base64: &str,
        lang: Option<&str>,
    ) -> Result<String> {
        self.printed_material_extract_text_tagged(image_path_or_base64, lang, None)
            .await
    }

    pub async fn printed_material_extract_text_tagged(
        &self,
        image_path_or_base64: &str,
        lang: Option<&str>,
        kind: Option<InputKind>,
    ) -> Result<String> {
        let input = ImageInput::resolve(image_path_or_base64, kind);
        Ok(self.printed(input, lang).await?.to_string())
    }

    /// Extract text from a general image; an empty `lang_list` means `["en"]`.
    pub async fn general_purpose_extract_text(
        &self,
        image_path_or_base64: &str,
        lang_list: &[String],
    ) -> Result<String> {
        self.general_purpose_extract_text_tagged(image_path_or_base64, lang_list, None)
            .await
    }

    pub async fn general_purpose_extract_text_tagged(
        &self,
        image_path_or_base64: &str,
        lang_list: &[String],
        kind: Option<InputKind>,
    ) -> Result<String> {
        let input = ImageInput::resolve(image_path_or_base64, kind);
        Ok(self.general(input, lang_list).await?.to_string())
    }
}
