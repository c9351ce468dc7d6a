use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::{info, warn};
use supportfy_core::render::{message_html, transcript_html};
use supportfy_core::{
    format_message_text, ChatController, Config, HttpChatClient, MemorySessionStore, Message,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "supportfy", version)]
#[command(about = "Chat with the Supportfy assistant from your terminal")]
struct Cli {
    /// Chat endpoint URL (overrides the saved config)
    #[arg(long, env = "SUPPORTFY_ENDPOINT", global = true)]
    endpoint: Option<String>,
    /// Write the conversation as HTML to this file when done
    #[arg(long, global = true)]
    transcript: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Ask a single question and print the reply as HTML
    Ask {
        /// Your question
        question: String,
    },
    /// Format assistant text from a file (or stdin) as HTML
    Format {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Show or update the saved configuration
    Config {
        /// Save a new default endpoint
        #[arg(long)]
        set_endpoint: Option<String>,
        /// Save the maximum height of the input box, in rows
        #[arg(long)]
        set_max_input_rows: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    match &command {
        Commands::Chat => {
            let log_path = logging::init_file()?;
            info!("Logging to {}", log_path.display());
        }
        _ => logging::init_stderr(),
    }

    match command {
        Commands::Config { set_endpoint, set_max_input_rows } => {
            update_config(set_endpoint, set_max_input_rows)
        }
        Commands::Format { file } => format_input(file.as_deref()),
        Commands::Ask { question } => {
            let config = load_config();
            let endpoint = cli.endpoint.unwrap_or_else(|| config.endpoint().to_string());
            ask_once(&config, &endpoint, &question, cli.transcript.as_deref()).await
        }
        Commands::Chat => {
            let config = load_config();
            let endpoint = cli.endpoint.unwrap_or_else(|| config.endpoint().to_string());
            run_chat(&config, endpoint, cli.transcript.as_deref()).await
        }
    }
}

/// A broken config file shouldn't keep the chat from starting
fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config: {:#}", e);
        Config::default()
    })
}

async fn run_chat(config: &Config, endpoint: String, transcript: Option<&Path>) -> Result<()> {
    let backend = Arc::new(HttpChatClient::new(&endpoint));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(config, endpoint, backend, events.sender());
    info!("Try asking: {}", app.suggestion);

    let result = event_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result?;

    if let Some(path) = transcript {
        write_transcript(path, app.chat.view().messages(), &app.assistant_name)?;
    }
    Ok(())
}

async fn event_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn ask_once(
    config: &Config,
    endpoint: &str,
    question: &str,
    transcript: Option<&Path>,
) -> Result<()> {
    let client = HttpChatClient::new(endpoint);
    let mut chat = ChatController::new(MemorySessionStore::new(), config.max_input_rows());

    chat.on_input(question);
    if !chat.send(&client).await {
        bail!("Nothing to ask: the question is empty");
    }

    if let Some(path) = transcript {
        write_transcript(path, chat.view().messages(), config.assistant_name())?;
    }

    let Some(reply) = chat.view().messages().last() else {
        bail!("No reply was recorded");
    };
    println!("{}", message_html(reply, config.assistant_name()));

    if reply.is_error {
        bail!("{} could not answer (request to {} failed)", config.assistant_name(), endpoint);
    }
    Ok(())
}

fn format_input(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    println!("{}", format_message_text(&text));
    Ok(())
}

fn update_config(endpoint: Option<String>, max_input_rows: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;

    if endpoint.is_none() && max_input_rows.is_none() {
        println!("{}", serde_json::to_string_pretty(&config)?);
        println!("endpoint in use: {}", config.endpoint());
        return Ok(());
    }

    if let Some(endpoint) = endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(rows) = max_input_rows {
        config.max_input_rows = Some(rows);
    }
    let path = config.save()?;
    info!("Saved config to {}", path.display());
    Ok(())
}

fn write_transcript(path: &Path, messages: &[Message], assistant_name: &str) -> Result<()> {
    fs::write(path, transcript_html(messages, assistant_name))
        .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
    info!("Wrote {} messages to {}", messages.len(), path.display());
    Ok(())
}
