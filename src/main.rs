use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;

use linebot::application::webhook::signature;
use linebot::infrastructure::http::Headers;
use linebot::{
    Config, ConfigError, Event, HttpClient, LinebotError, MessageType, HandlerResult, DEFAULT_CHUNK_SIZE,
};

#[derive(Parser)]
#[command(name = "linebot")]
#[command(about = "Developer tool for the LINE webhook dispatcher and HTTP client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Channel secret (overrides config)
    #[arg(short, long)]
    secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Print the signature of a webhook body
    Sign {
        /// File holding the request body
        body: PathBuf,
    },
    /// Verify, parse and dispatch a webhook body to logging handlers
    Dispatch {
        /// File holding the request body
        body: PathBuf,
        /// X-Line-Signature value
        #[arg(long)]
        signature: String,
    },
    /// Issue a GET request
    Get {
        url: String,
        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Stream the body and report chunk sizes
        #[arg(long)]
        stream: bool,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), LinebotError> {
    match cli.command {
        Commands::Version => {
            println!("linebot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        command => {
            let config = load_config(&cli.config, cli.secret)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_async(config, command))
        }
    }
}

async fn run_async(config: Config, command: Commands) -> Result<(), LinebotError> {
    match command {
        Commands::Sign { body } => {
            let body = tokio::fs::read(&body).await?;
            println!("{}", signature::sign(config.channel_secret()?, &body));
            Ok(())
        }
        Commands::Dispatch { body, signature } => {
            let body = tokio::fs::read_to_string(&body).await?;
            dispatch(&config, &body, &signature).await
        }
        Commands::Get { url, headers, stream, chunk_size } => {
            get(&config, &url, &headers, stream, chunk_size).await
        }
        Commands::Version | Commands::InitConfig => Ok(()),
    }
}

fn load_config(path: &str, secret_override: Option<String>) -> Result<Config, ConfigError> {
    let mut config = if std::path::Path::new(path).exists() {
        Config::load(path)?
    } else {
        Config::load_env()
    };

    if let Some(secret) = secret_override {
        config.channel.secret = Some(secret);
    }

    Ok(config)
}

async fn log_text(event: Event) -> HandlerResult {
    let text = event.message.as_ref().and_then(|m| m.text.as_deref()).unwrap_or_default();
    let from = event.source.as_ref().map(|s| s.to_string()).unwrap_or_default();
    tracing::info!("Text message from {}: {}", from, text);
    Ok(())
}

async fn log_event(event: Event) -> HandlerResult {
    tracing::info!(
        "{} event (message type: {:?}, redelivery: {})",
        event.event_type,
        event.message_type(),
        event.is_redelivery()
    );
    Ok(())
}

async fn dispatch(config: &Config, body: &str, signature: &str) -> Result<(), LinebotError> {
    let mut dispatcher = config.dispatcher()?;
    dispatcher.on_message(MessageType::Text, log_text);
    dispatcher.set_default(log_event);

    let summary = dispatcher.handle(body, signature).await?;
    println!(
        "handled: {}, defaulted: {}, unmatched: {}, failed: {}",
        summary.handled, summary.defaulted, summary.unmatched, summary.failed
    );
    Ok(())
}

async fn get(config: &Config, url: &str, raw_headers: &[String], stream: bool, chunk_size: usize) -> Result<(), LinebotError> {
    let mut headers = Headers::new();
    for raw in raw_headers {
        match raw.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => tracing::warn!("Ignoring malformed header: {}", raw),
        }
    }

    let client = config.http_client()?;
    let response = client.get(url, Some(&headers), None, stream, None).await?;

    println!("{}", response.status());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();

    if stream {
        let mut chunks = response.iter_content(chunk_size)?;
        let mut total = 0;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            total += chunk.len();
            println!("chunk: {} bytes", chunk.len());
        }
        println!("total: {} bytes", total);
    } else {
        println!("{}", response.text().await?);
    }

    client.release();
    Ok(())
}

fn init_config() -> Result<(), LinebotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
