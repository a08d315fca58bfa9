use rmcp::ErrorData as McpError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlarmyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Tesseract(String),

    #[error("{0}")]
    UnidentifiedImage(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LlarmyError {
    /// Whether the error came from turning the caller's input into an image.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            LlarmyError::Io(_)
                | LlarmyError::ImageDecode(_)
                | LlarmyError::Base64(_)
                | LlarmyError::InvalidInput(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            LlarmyError::Io(_) => "io",
            LlarmyError::ImageDecode(_) => "image_decode",
            LlarmyError::Base64(_) => "base64",
            LlarmyError::InvalidInput(_) => "invalid_input",
            LlarmyError::Tesseract(_) => "tesseract",
            LlarmyError::UnidentifiedImage(_) => "unidentified_image",
            LlarmyError::Ocr(_) => "ocr",
            LlarmyError::Http(_) => "http",
            LlarmyError::Internal(_) => "internal",
        }
    }
}

impl From<LlarmyError> for McpError {
    fn from(error: LlarmyError) -> Self {
        let data = Some(json!({ "kind": error.kind() }));
        if error.is_decode_failure() {
            McpError::invalid_params(error.to_string(), data)
        } else {
            tracing::error!(error = %error, "OCR tool call failed");
            McpError::internal_error(error.to_string(), data)
        }
    }
}

pub type Result<T> = std::result::Result<T, LlarmyError>;
