//! CLI entry point for the `brain` portal client.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};

mod client;
mod config;
mod core;
mod logging;
mod models;
mod palette;
mod tui;

use crate::client::PortalClient;
use crate::config::Config;
use crate::core::chat::{ChatSession, EntryKind, SubmitOutcome};
use crate::core::dispatch::{Dispatcher, next_event};
use crate::core::events::Event;
use crate::core::panel::{ActionKind, ActionPanel, Language, ResultState};

#[derive(Parser, Debug)]
#[command(
    name = "brain",
    author,
    version,
    about = "Terminal client for the e-BrAIn.Tech AI portal",
    after_help = "Examples:\
    \n   brain                                   # Open the interactive portal\
    \n   brain chat \"Resuma o contrato\"          # One chat turn\
    \n   brain generate-code -d \"fizzbuzz\" -l rust\
    \n   brain review-code --file main.py\
    \n   brain health"
)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config profile name
    #[arg(long)]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Send one chat message and print the reply
    Chat {
        /// Message text
        message: String,
    },
    /// Ask a question about a document
    AnalyzeDocument {
        #[command(flatten)]
        source: DocumentSource,
        /// What to ask about the document
        #[arg(short, long)]
        query: String,
    },
    /// Generate code from a description
    GenerateCode {
        /// What the code should do
        #[arg(short, long)]
        description: String,
        /// Target language
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Review a piece of code
    ReviewCode {
        #[command(flatten)]
        source: CodeSource,
        /// Language of the code
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Analyze a data set
    AnalyzeData {
        #[command(flatten)]
        source: DataSource,
        /// What analysis to run
        #[arg(short, long)]
        query: String,
    },
    /// Check that the backend is reachable
    Health,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct DocumentSource {
    /// Read the document from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Document text
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct CodeSource {
    /// Read the code from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Code to review
    #[arg(long)]
    code: Option<String>,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct DataSource {
    /// Read the data from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Inline data (CSV, JSON, ...)
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::set_verbose(cli.verbose);

    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = load_config_from_cli(&cli)?;
    let client = PortalClient::new(&config)?;

    let Some(command) = cli.command else {
        return run_interactive(&config, client).await;
    };

    match command {
        Commands::Chat { message } => run_chat(client, &message).await,
        Commands::AnalyzeDocument { source, query } => {
            let text = read_source(source.file, source.text)?;
            run_action(client, ActionKind::Document, &[text, query], None).await
        }
        Commands::GenerateCode {
            description,
            language,
        } => run_action(client, ActionKind::CodeGeneration, &[description], language).await,
        Commands::ReviewCode { source, language } => {
            let code = read_source(source.file, source.code)?;
            run_action(client, ActionKind::CodeReview, &[code], language).await
        }
        Commands::AnalyzeData { source, query } => {
            let data = read_source(source.file, source.data)?;
            run_action(client, ActionKind::Data, &[data, query], None).await
        }
        Commands::Health => run_health(client).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config_from_cli(cli: &Cli) -> Result<Config> {
    let profile = cli
        .profile
        .clone()
        .or_else(|| std::env::var("BRAIN_PROFILE").ok());
    Config::load(cli.config.clone(), profile.as_deref())
}

/// Generate shell completions for the given shell
fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

async fn run_interactive(config: &Config, client: PortalClient) -> Result<()> {
    // stderr is unusable under the alternate screen.
    if let Some(path) = crate::config::default_log_path() {
        match logging::init_file_log(&path, logging::is_verbose()) {
            Ok(()) => logging::info(format!("Logging to {}", path.display())),
            Err(err) => logging::warn(format!("File logging disabled: {err:#}")),
        }
    }
    let options = tui::TuiOptions {
        base_url: config.base_url(),
        default_language: config.default_language(),
        theme: config.theme().to_string(),
    };
    let (dispatcher, rx_event) = Dispatcher::new(client);
    tui::run_tui(dispatcher, rx_event, options).await
}

fn read_source(file: Option<PathBuf>, inline: Option<String>) -> Result<String> {
    match (file, inline) {
        (Some(path), _) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, Some(text)) => Ok(text),
        (None, None) => Ok(String::new()),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

// === One-shot commands ===

async fn run_chat(client: PortalClient, message: &str) -> Result<()> {
    let mut session = ChatSession::new();
    let turn = match session.submit(message) {
        SubmitOutcome::Sent(turn) => turn,
        SubmitOutcome::Empty | SubmitOutcome::Busy => anyhow::bail!("Mensagem vazia"),
    };

    let (dispatcher, mut rx_event) = Dispatcher::new(client);
    let progress = spinner("Pensando...");
    dispatcher.send_chat(turn);
    let event = next_event(&mut rx_event).await;
    progress.finish_and_clear();

    if let Event::ChatReply { ticket, result } = event? {
        session.complete(ticket, result.map(|response| response.into_content()));
    }

    match session.history().last() {
        Some(entry) if entry.kind == EntryKind::Assistant => {
            println!("{}", entry.content);
            Ok(())
        }
        Some(entry) => anyhow::bail!("{}", entry.content),
        None => anyhow::bail!("Nenhuma resposta recebida"),
    }
}

async fn run_action(
    client: PortalClient,
    kind: ActionKind,
    fields: &[String],
    language: Option<Language>,
) -> Result<()> {
    let mut panel = ActionPanel::new(kind, language.unwrap_or_default());
    for (index, value) in fields.iter().enumerate() {
        panel.set_field(index, value.as_str());
    }

    let Some(turn) = panel.run() else {
        anyhow::bail!("{}", panel.result().unwrap_or_default());
    };

    let (dispatcher, mut rx_event) = Dispatcher::new(client);
    let progress = spinner(kind.processing_message());
    dispatcher.send_action(turn);
    let event = next_event(&mut rx_event).await;
    progress.finish_and_clear();

    if let Event::ActionReply {
        ticket, result, ..
    } = event?
    {
        panel.complete(ticket, result.map(|response| response.into_content()));
    }

    let text = panel.result().unwrap_or_default();
    match panel.state() {
        ResultState::Done => {
            println!("{text}");
            Ok(())
        }
        _ => anyhow::bail!("{text}"),
    }
}

async fn run_health(client: PortalClient) -> Result<()> {
    let progress = spinner("Verificando backend...");
    let result = client.health().await;
    progress.finish_and_clear();

    let health = result.with_context(|| format!("Backend indisponível em {}", client.base_url()))?;
    println!("status:  {}", health.status);
    if let Some(name) = health.app_name.as_deref() {
        println!("app:     {name}");
    }
    if let Some(version) = health.version.as_deref() {
        println!("version: {version}");
    }
    if !health.is_healthy() {
        anyhow::bail!("Backend reported status '{}'", health.status);
    }
    Ok(())
}
