use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use directories::ProjectDirs;
use parley::config::{self, Config};
use parley::terminal::TerminalHandle;
use parley::time::RealTimeProvider;
use parley::view::{ConversationView, Outcome};
use parley_client::MessageStore;
use parley_client::memory::MemoryConversation;
use parley_client::state::AppState;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

/// Parley - a reverse-scrolling chat transcript viewer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Conversation transcript (JSON) to open
    #[arg(short, long)]
    transcript: PathBuf,

    /// Username of the current user (defaults to the persisted one)
    #[arg(short, long)]
    username: Option<String>,

    /// Configuration directory
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Messages fetched per page
    #[arg(long)]
    page_size: Option<usize>,
}

fn init_logging(config_dir: &Path) -> Result<(), Box<dyn Error>> {
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config_dir.join("parley.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn downloads_dir(config: &Config, config_dir: &Path) -> PathBuf {
    if let Some(dir) = &config.downloads_directory {
        PathBuf::from(dir)
    } else if let Some(user_dirs) = directories::UserDirs::new() {
        if let Some(dl) = user_dirs.download_dir() {
            dl.to_path_buf()
        } else {
            config_dir.join("downloads")
        }
    } else {
        config_dir.join("downloads")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config_dir = args.config_dir.clone().unwrap_or_else(|| {
        ProjectDirs::from("", "", "parley")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });
    fs::create_dir_all(&config_dir)?;
    init_logging(&config_dir)?;

    let mut config = config::load_config(&config_dir);
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    let username = args.username.or_else(|| config::load_username(&config_dir));

    let transcript = fs::read_to_string(&args.transcript)?;
    let conversation = Arc::new(MemoryConversation::from_transcript(&transcript)?);
    info!(
        "Opened transcript {} as {:?}",
        args.transcript.display(),
        username
    );

    let store = Arc::new(MessageStore::with_config(
        conversation,
        AppState::shared(),
        &config.client_config(),
    ));
    let time = Arc::new(RealTimeProvider::new(config.timezone.as_deref()));
    let downloads = downloads_dir(&config, &config_dir);
    let mut view = ConversationView::new(store, config, username, time, downloads);
    view.mount().await?;

    let mut handle = TerminalHandle::new()?;
    loop {
        handle.terminal.draw(|frame| view.draw(frame))?;

        if view.take_fetch_request() {
            match view.fetch_more().await {
                Ok(()) => continue,
                Err(e) => error!("Failed to fetch older messages: {}", e),
            }
        }

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match view.handle_key(key).await {
                Ok(Outcome::Quit) => break,
                Ok(_) => {}
                Err(e) => error!("Failed to handle key: {}", e),
            }
        }
    }

    info!("Closing transcript");
    Ok(())
}
