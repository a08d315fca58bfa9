use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use llarmy::api::{create_router, AppState};
use llarmy::config::{Config, LogFormat};
use llarmy::mcp::serve_stdio;
use llarmy::ocr::{InputKind, OcrTools};

#[derive(Parser)]
#[command(name = "llarmy")]
#[command(about = "OCR equipment for LLM agents, served over MCP")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the MCP endpoint over HTTP (default)
    Serve,
    /// Serve MCP over stdin/stdout
    Stdio,
    /// Run one extraction and print the result
    Extract {
        #[command(subcommand)]
        tool: ExtractTool,
    },
}

#[derive(Subcommand)]
enum ExtractTool {
    /// Printed material via Tesseract
    Printed {
        /// Image path or base64 image data
        input: String,
        /// Tesseract language, e.g. `eng` or `eng+deu`
        #[arg(long)]
        lang: Option<String>,
        /// Treat the input as a `path` or `base64` instead of guessing
        #[arg(long)]
        kind: Option<InputKind>,
    },
    /// General purpose images via EasyOCR
    General {
        /// Image path or base64 image data
        input: String,
        /// Language code; repeat for several
        #[arg(long = "lang")]
        langs: Vec<String>,
        #[arg(long)]
        kind: Option<InputKind>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let command = args.command.unwrap_or(Command::Serve);
    init_tracing(config.log_format);

    let tools = OcrTools::from_config(&config.ocr)?;

    match command {
        Command::Serve => serve(config, tools).await,
        Command::Stdio => {
            tools.check_engines().await;
            tracing::info!("Serving MCP over stdio");
            serve_stdio(tools).await
        }
        Command::Extract { tool } => {
            let text = match tool {
                ExtractTool::Printed { input, lang, kind } => {
                    tools
                        .printed_material_extract_text_tagged(&input, lang.as_deref(), kind)
                        .await?
                }
                ExtractTool::General { input, langs, kind } => {
                    tools
                        .general_purpose_extract_text_tagged(&input, &langs, kind)
                        .await?
                }
            };
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Logs always go to stderr; stdout belongs to the stdio transport and to `extract` output.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "llarmy=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn serve(config: Config, tools: OcrTools) -> anyhow::Result<()> {
    tools.check_engines().await;

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "LLARMY_API_KEYS is not set, the MCP endpoint is open to anyone who can reach it"
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mcp_path = config.mcp.path.clone();
    let app = create_router(AppState::new(config, tools));

    tracing::info!("llarmy starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  MCP endpoint: http://{}{}", addr, mcp_path);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
