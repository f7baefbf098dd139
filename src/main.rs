use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use video_companion::{
    AppContext, ChatSession, Collaborators, Config, EnvSecretStore, ExtractResult,
    HttpCaptionSource, JsonLinesNotifier, TranscriptResult, YtDlpExtractor,
};

#[derive(Debug, Parser)]
#[command(name = "video-companion", version, about = "Local companion service for the video player")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/companion")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the loopback ingestion server until Ctrl-C
    Serve,
    /// Resolve a page URL to a playable media URL
    Resolve { url: String },
    /// Print the transcript of a video's preferred caption track
    Transcript { url: String },
    /// Ask questions about a video; one question per stdin line
    Chat { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    // stdout carries UI events and command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let collaborators = Collaborators {
        notifier: Arc::new(JsonLinesNotifier::new()),
        extractor: Arc::new(YtDlpExtractor::new(
            &cfg.extractor,
            cfg.transcript.preferred_languages.clone(),
        )),
        captions: Arc::new(HttpCaptionSource::new()),
        secrets: Arc::new(EnvSecretStore::new(cfg.chat.api_key_env.clone())),
        chat_backend: None,
    };
    let ctx = AppContext::new(cfg, collaborators)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&ctx).await,
        Command::Resolve { url } => {
            let result = ExtractResult::from(ctx.resolver.resolve(&url).await);
            print_json(&result)
        }
        Command::Transcript { url } => {
            let transcript = load_transcript(&ctx, &url).await?;
            print_json(&transcript)
        }
        Command::Chat { url } => chat(&ctx, &url).await,
    }
}

async fn serve(ctx: &AppContext) -> Result<()> {
    ctx.start_sweeper();

    match ctx.start_ingestion().await {
        Ok(addr) => info!("Extension endpoint ready at http://{}", addr),
        // Reported to the UI already; the rest of the service keeps running
        Err(e) => warn!("Continuing without URL ingestion: {}", e),
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    ctx.shutdown().await;
    Ok(())
}

async fn load_transcript(ctx: &AppContext, url: &str) -> Result<TranscriptResult> {
    let extraction = match ctx.resolver.resolve(url).await {
        Ok(extraction) => extraction,
        Err(e) => bail!("Failed to resolve {}: {}", url, e),
    };

    let Some(track) = extraction.captions.first() else {
        return Ok(TranscriptResult::failure(
            "No transcript available for this video",
        ));
    };

    info!("Using {} captions for {}", track.language, extraction.title);
    Ok(ctx.transcripts.fetch_transcript(track).await)
}

async fn chat(ctx: &AppContext, url: &str) -> Result<()> {
    let transcript = load_transcript(ctx, url).await?;
    if let Some(reason) = &transcript.error {
        warn!("Transcript unavailable: {}", reason);
    }

    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let mut stdout = std::io::stdout();
        let reply = session
            .send(&ctx.relay, transcript.text(), &line, |piece| {
                let _ = write!(stdout, "{}", piece);
                let _ = stdout.flush();
            })
            .await;

        match reply {
            Some(message) if message.content.starts_with("Error: ") => {
                error!("{}", message.content);
            }
            Some(_) => println!(),
            None => {}
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
