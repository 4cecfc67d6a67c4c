use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_explorer::client::{default_file_name, ApiClient, ContentFetcher, PreviewContent};
use s3_explorer::navigation::{self, PreviewRequest};
use s3_explorer::storage::S3Client;
use s3_explorer::utils::format_file_size;
use s3_explorer::{config::Config, create_router, preview, AppState};

#[derive(Parser)]
#[command(name = "s3-explorer", version, about = "Browse S3 buckets with in-terminal previews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the proxy API
    Serve,
    /// Open the interactive browser against a running proxy
    Browse {
        /// Proxy base URL, overrides API_BASE_URL
        #[arg(long)]
        api: Option<String>,
    },
    /// Print a single object's preview
    Preview {
        bucket: String,
        key: String,
        /// Print the raw text instead of the rendered markup
        #[arg(long)]
        source: bool,
        #[arg(long)]
        api: Option<String>,
    },
    /// Save an object to disk through a signed link
    Download {
        bucket: String,
        key: String,
        /// Destination file; defaults to the key's file name in DOWNLOAD_DIR
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        api: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Serve => {
            init_tracing();
            serve(config).await
        }
        Command::Browse { api } => {
            if let Some(api) = api {
                config.client.api_base_url = api;
            }
            // Stdout belongs to the terminal UI, so logs go to a file.
            let _guard = init_file_tracing();
            s3_explorer::tui::run(config).await
        }
        Command::Preview {
            bucket,
            key,
            source,
            api,
        } => {
            if let Some(api) = api {
                config.client.api_base_url = api;
            }
            init_tracing();
            print_preview(config, bucket, key, source).await
        }
        Command::Download {
            bucket,
            key,
            output,
            api,
        } => {
            if let Some(api) = api {
                config.client.api_base_url = api;
            }
            init_tracing();
            download(config, bucket, key, output).await
        }
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "s3_explorer=debug,tower_http=debug,axum=debug".into())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_file_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let appender = tracing_appender::rolling::never(std::env::temp_dir(), "s3-explorer.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    guard
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Configuration loaded: {:?}", config.server);

    let store = S3Client::from_config(&config.storage)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;

    let state = AppState::new(Arc::new(store), config);
    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn print_preview(config: Config, bucket: String, key: String, source: bool) -> anyhow::Result<()> {
    let api = ApiClient::from_config(&config.client);
    let fetcher = ContentFetcher::new(api, config.client.preview_max_bytes);
    let request = PreviewRequest {
        generation: 0,
        container: bucket,
        key,
    };

    let fetched = navigation::fetch_preview(&fetcher, &request).await?;
    match fetched.content {
        PreviewContent::Text(text) if source => println!("{}", text),
        PreviewContent::Text(text) => println!("{}", preview::render(&text, &request.key)),
        PreviewContent::TooLarge { limit } => {
            println!("File is larger than {} bytes; download it from:\n{}", limit, fetched.url)
        }
        PreviewContent::Unavailable => {
            println!("Preview unavailable; download it from:\n{}", fetched.url)
        }
        PreviewContent::NotText => println!("{}", fetched.url),
    }
    Ok(())
}

async fn download(
    config: Config,
    bucket: String,
    key: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dest = output.unwrap_or_else(|| config.client.download_dir.join(default_file_name(&key)));
    let api = ApiClient::from_config(&config.client);
    let fetcher = ContentFetcher::new(api, config.client.preview_max_bytes);

    let saved = fetcher
        .download(&bucket, &key, &dest)
        .await
        .with_context(|| format!("Failed to download {}/{}", bucket, key))?;
    println!("Saved {} ({})", saved.path.display(), format_file_size(saved.bytes));
    Ok(())
}
