use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::{
        streamable_http_server::{
            session::local::LocalSessionManager, tower::StreamableHttpService,
        },
        StreamableHttpServerConfig,
    },
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::ocr::{InputKind, OcrTools, DEFAULT_PRINTED_LANGUAGE};

/// Largest accepted `image_path_or_base64` argument, in bytes. Over HTTP the
/// request body limit usually applies first; stdio has no other bound.
const MAX_IMAGE_ARG_LEN: usize = DEFAULT_MAX_BODY_BYTES;

#[derive(Clone)]
pub struct OcrMcpServer {
    tools: OcrTools,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PrintedMaterialArgs {
    /// Path to the image file, or base64 image data (a data URI is accepted).
    image_path_or_base64: String,
    /// Tesseract language of the text in the image, e.g. `eng`, `deu` or `eng+fra`.
    #[serde(default = "default_printed_lang")]
    lang: String,
    /// How to read `image_path_or_base64`; guessed from its prefix when omitted.
    #[serde(default)]
    input_kind: Option<InputKind>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GeneralPurposeArgs {
    /// Path to the image file, or base64 image data (a data URI is accepted).
    image_path_or_base64: String,
    /// ISO 639 codes of the languages to recognize, e.g. `["en", "ja"]`. Empty means English.
    #[serde(default)]
    lang_list: Vec<String>,
    /// How to read `image_path_or_base64`; guessed from its prefix when omitted.
    #[serde(default)]
    input_kind: Option<InputKind>,
}

fn default_printed_lang() -> String {
    DEFAULT_PRINTED_LANGUAGE.to_string()
}

impl OcrMcpServer {
    pub fn new(tools: OcrTools) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Names of the tools this server advertises.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }
}

#[tool_router]
impl OcrMcpServer {
    #[tool(
        name = "printed_material_extract_text",
        description = "Extract text from an image of printed material (documents, scans, screenshots) using tesseract. For photos or other non-printed images, use general_purpose_extract_text."
    )]
    async fn printed_material_extract_text(
        &self,
        Parameters(args): Parameters<PrintedMaterialArgs>,
    ) -> Result<CallToolResult, McpError> {
        validate_image_arg(&args.image_path_or_base64)?;

        let text = self
            .tools
            .printed_material_extract_text_tagged(
                &args.image_path_or_base64,
                Some(args.lang.as_str()),
                args.input_kind,
            )
            .await?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "general_purpose_extract_text",
        description = "Extract text from a general purpose image (photos, signs, handwriting, mixed languages) using EasyOCR. For printed material, use printed_material_extract_text."
    )]
    async fn general_purpose_extract_text(
        &self,
        Parameters(args): Parameters<GeneralPurposeArgs>,
    ) -> Result<CallToolResult, McpError> {
        validate_image_arg(&args.image_path_or_base64)?;

        let text = self
            .tools
            .general_purpose_extract_text_tagged(
                &args.image_path_or_base64,
                &args.lang_list,
                args.input_kind,
            )
            .await?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for OcrMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "llarmy".to_string(),
                title: Some("llarmy OCR equipment".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Use printed_material_extract_text for printed documents and general_purpose_extract_text for everything else. Both accept a file path or base64 image data and return the extracted text as a single string."
                    .to_string(),
            ),
        }
    }
}

pub fn streamable_http_service(
    tools: OcrTools,
) -> StreamableHttpService<OcrMcpServer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(OcrMcpServer::new(tools.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    )
}

/// Serve the tools over stdin/stdout until the client disconnects.
pub async fn serve_stdio(tools: OcrTools) -> anyhow::Result<()> {
    let service = OcrMcpServer::new(tools)
        .serve(rmcp::transport::stdio())
        .await?;
    let reason = service.waiting().await?;
    tracing::info!(?reason, "MCP stdio session ended");
    Ok(())
}

fn validate_image_arg(image_path_or_base64: &str) -> Result<(), McpError> {
    if image_path_or_base64.trim().is_empty() {
        return Err(McpError::invalid_params(
            "image_path_or_base64 cannot be empty",
            None,
        ));
    }

    if image_path_or_base64.len() > MAX_IMAGE_ARG_LEN {
        return Err(McpError::invalid_params(
            format!(
                "image_path_or_base64 exceeds maximum length of {} MiB",
                MAX_IMAGE_ARG_LEN / (1024 * 1024)
            ),
            None,
        ));
    }

    Ok(())
}
