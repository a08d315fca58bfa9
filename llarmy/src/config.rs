use std::env;

/// Default cap on request bodies and on inline image arguments.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated list such as `LLARMY_API_KEYS=key-a,key-b`.
fn parse_env_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|val| {
            val.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub mcp: McpConfig,
    pub ocr: OcrConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies; images travel inline as base64.
    pub max_body_bytes: usize,
    /// Bearer keys accepted on the MCP endpoint; empty leaves it open.
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct McpConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Directory holding Tesseract `*.traineddata`; `None` lets the engine decide.
    pub tessdata_path: Option<String>,
    pub easyocr_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tessdata_path: None,
            easyocr_url: "http://127.0.0.1:8765".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr_defaults = OcrConfig::default();
        Self {
            server: ServerConfig {
                host: env::var("LLARMY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_env_or("LLARMY_PORT", 3100),
                max_body_bytes: parse_env_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
                api_keys: parse_env_list("LLARMY_API_KEYS"),
            },
            mcp: McpConfig {
                path: normalize_path(
                    &env::var("MCP_PATH").unwrap_or_else(|_| "/mcp".to_string()),
                ),
            },
            ocr: OcrConfig {
                tessdata_path: env::var("TESSDATA_PREFIX").ok().filter(|p| !p.is_empty()),
                easyocr_url: env::var("EASYOCR_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(ocr_defaults.easyocr_url),
                timeout_secs: parse_env_or("OCR_TIMEOUT", ocr_defaults.timeout_secs),
            },
            log_format: parse_env_or("LOG_FORMAT", LogFormat::Text),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/mcp".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
