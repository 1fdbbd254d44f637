//! `voxdoc`: drive the conversion service from the command line.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use voxdoc_client::api::ApiClient;
use voxdoc_client::api::endpoints::auth::NewUser;
use voxdoc_client::api::endpoints::extract::UploadSource;
use voxdoc_client::config::ClientConfig;
use voxdoc_client::pipeline::{ConversionPipeline, PipelineState, SpeechOptions};
use voxdoc_client::playback::{AudioPlayer, PlayerPhase, format_time, save_artifact};
use voxdoc_client::session::SessionStore;
use voxdoc_domain::{
    ArtifactId, AudioArtifact, AudioFormat, DocumentKind, Language, SummaryKind,
};

#[derive(Parser)]
#[command(name = "voxdoc", version, about = "Convert documents and text to speech")]
struct Cli {
    /// Service base URL (falls back to VOXDOC_API_URL, then localhost).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for authenticated commands.
    #[arg(long, global = true, env = "VOXDOC_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account.
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Exchange credentials for a bearer token (printed to stdout).
    Login { username: String, password: String },
    /// Show the authenticated profile.
    Me,
    /// Extract text from a PDF or image document.
    Extract {
        file: PathBuf,
        #[arg(long, default_value = "en")]
        language: Language,
        /// pdf or image; inferred from the file extension when omitted.
        #[arg(long)]
        kind: Option<DocumentKind>,
    },
    /// Summarize text (from the argument, or stdin when omitted).
    Summarize {
        text: Option<String>,
        #[arg(long, default_value = "en")]
        language: Language,
        #[arg(long, default_value = "brief")]
        kind: SummaryKind,
    },
    /// Convert text to speech and save the audio.
    Convert {
        text: Option<String>,
        #[arg(long, default_value = "en")]
        language: Language,
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        #[arg(long, default_value = "mp3")]
        format: AudioFormat,
        /// Output path; defaults to voxdoc-<id>.<ext>.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Convert text to speech and play it.
    Speak {
        text: Option<String>,
        #[arg(long, default_value = "en")]
        language: Language,
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        #[arg(long, default_value = "mp3")]
        format: AudioFormat,
    },
    /// List prior conversions.
    History,
    /// Delete a prior conversion.
    Delete { id: String },
    /// Download a prior conversion's audio.
    Download {
        id: String,
        /// Output path; defaults to voxdoc-<id>.mp3.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.api_url {
        Some(url) => ClientConfig::from_url(url)?,
        None => ClientConfig::from_env()?,
    };
    let session = SessionStore::new();
    if let Some(token) = &cli.token {
        session.set_token(token);
    }
    let client = Arc::new(ApiClient::new(config, session));

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let profile = client
                .register(NewUser {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("created account {} <{}>", profile.username, profile.email);
        }
        Command::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            eprintln!("signed in; export VOXDOC_TOKEN to reuse the session:");
            println!("{}", token.access_token);
        }
        Command::Me => {
            let profile = client.current_user().await?;
            println!("{} <{}> (id {})", profile.username, profile.email, profile.id);
        }
        Command::Extract {
            file,
            language,
            kind,
        } => {
            let source = UploadSource::from_path(&file).await?;
            let kind = match kind.or_else(|| source.guess_kind()) {
                Some(kind) => kind,
                None => bail!(
                    "cannot tell whether {} is a pdf or an image; pass --kind",
                    file.display()
                ),
            };
            let pipeline = ConversionPipeline::new(Arc::clone(&client));
            pipeline.extract_file(source, language, kind);
            match drive_to_settlement(&pipeline).await? {
                PipelineState::Failed { kind, message } => bail!("{kind}: {message}"),
                _ => println!("{}", pipeline.text()),
            }
        }
        Command::Summarize {
            text,
            language,
            kind,
        } => {
            let pipeline = ConversionPipeline::new(Arc::clone(&client));
            pipeline.set_text(text_or_stdin(text)?);
            pipeline.summarize(kind, language);
            if let PipelineState::Failed { kind, message } = drive_to_settlement(&pipeline).await? {
                bail!("{kind}: {message}");
            }
            let summary = pipeline
                .summary()
                .context("pipeline settled without a summary")?;
            eprintln!(
                "condensed {} chars to {}",
                summary.original_length, summary.summary_length
            );
            println!("{}", summary.summary_text);
        }
        Command::Convert {
            text,
            language,
            speed,
            format,
            output,
        } => {
            let artifact = synthesize(&client, text_or_stdin(text)?, language, speed, format).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("voxdoc-{}.{}", artifact.id, format.extension()))
            });
            let written = save_artifact(&client, &artifact, &path).await?;
            println!("{} ({} bytes)", path.display(), written);
        }
        Command::Speak {
            text,
            language,
            speed,
            format,
        } => {
            let artifact = synthesize(&client, text_or_stdin(text)?, language, speed, format).await?;
            let mut player = AudioPlayer::new()?;
            player.bind(&client, &artifact).await?;
            player.toggle()?;
            loop {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let snapshot = player.refresh();
                let total = snapshot
                    .duration
                    .map(format_time)
                    .unwrap_or_else(|| "?".into());
                eprint!("\r{} / {}", format_time(snapshot.current_time), total);
                if player.phase() == PlayerPhase::Ended {
                    break;
                }
            }
            eprintln!();
        }
        Command::History => {
            let records = client.conversions().await?;
            if records.is_empty() {
                eprintln!("no conversions yet");
            }
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id,
                    record.source_type.as_deref().unwrap_or("-"),
                    record.language.as_deref().unwrap_or("-"),
                    record.file_name.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Delete { id } => {
            client.delete_conversion(ArtifactId::new(&id)).await?;
            println!("deleted {id}");
        }
        Command::Download { id, output } => {
            let artifact = AudioArtifact::new(id.as_str(), AudioFormat::Mp3);
            let path = output.unwrap_or_else(|| PathBuf::from(format!("voxdoc-{id}.mp3")));
            let written = save_artifact(&client, &artifact, &path).await?;
            println!("{} ({} bytes)", path.display(), written);
        }
    }

    Ok(())
}

/// Run one synthesis through the pipeline and hand back the artifact.
async fn synthesize(
    client: &Arc<ApiClient>,
    text: String,
    language: Language,
    speed: f32,
    format: AudioFormat,
) -> anyhow::Result<AudioArtifact> {
    let pipeline = ConversionPipeline::new(Arc::clone(client));
    pipeline.set_text(text);
    pipeline.convert_text(SpeechOptions {
        language,
        speed,
        format,
    });
    match drive_to_settlement(&pipeline).await? {
        PipelineState::Ready(artifact) => Ok(artifact),
        PipelineState::Failed { kind, message } => bail!("{kind}: {message}"),
        other => bail!("pipeline settled unexpectedly: {other:?}"),
    }
}

/// Wait for the pipeline to settle, echoing progress to stderr.
async fn drive_to_settlement(pipeline: &ConversionPipeline) -> anyhow::Result<PipelineState> {
    let mut rx = pipeline.subscribe();
    loop {
        {
            let state = rx.borrow_and_update();
            if !state.is_busy() {
                return Ok(state.clone());
            }
            if let Some(progress) = state.progress() {
                eprint!("\r{progress:>3}%");
                if progress == 100 {
                    eprintln!();
                }
            }
        }
        rx.changed().await?;
    }
}

fn text_or_stdin(text: Option<String>) -> anyhow::Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("could not read text from stdin")?;
            Ok(buffer)
        }
    }
}
