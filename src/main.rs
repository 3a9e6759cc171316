use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use mam_den_engine::console::{parse_line, render_history, render_queue, ConsoleInput, HELP};
use mam_den_engine::engine::commands::Command;
use mam_den_engine::engine::config::{load_config, load_default_config, EngineOptions};
use mam_den_engine::engine::session::GameSession;
use mam_den_engine::i18n::{describe, t, Language, Text};
use mam_den_engine::storage::background::BackgroundWriter;
use mam_den_engine::storage::{FileStore, Persistence};

#[derive(Parser)]
#[command(name = "mam-den", about = "Score keeper for Mâm Đền 3-6-9 billiards")]
struct Cli {
    /// Directory holding the stored game and language
    #[arg(long, env = "MAM_DEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to mam_den.toml (default: auto-discover)
    #[arg(long, env = "MAM_DEN_CONFIG")]
    config: Option<PathBuf>,

    /// Display language for this run: "vi" or "en"
    #[arg(long)]
    lang: Option<Language>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive session (default)
    Play,
    /// Print the player queue
    Show,
    /// Print the history log
    History,
    /// Store the display language
    Lang { code: Language },
    /// Dispatch one JSON command, or a JSON array of them, and print the state
    Apply { json: String },
}

type Store = Arc<Persistence<FileStore>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| format!("Failed to load config: {}", e))?,
        None => load_default_config(),
    };
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
    tracing::info!(data_dir = %data_dir.display(), "opening store");
    let persistence: Store = Arc::new(Persistence::new(FileStore::new(data_dir)));

    let lang = cli
        .lang
        .or_else(|| persistence.load_language())
        .or(config.display.language)
        .unwrap_or_default();

    match cli.mode.unwrap_or(Mode::Play) {
        Mode::Play => play(persistence, config.engine, lang).await?,
        Mode::Show => {
            let state = persistence.load_state().unwrap_or_default();
            println!("{}", render_queue(&state, lang));
        }
        Mode::History => {
            let state = persistence.load_state().unwrap_or_default();
            println!("{}", render_history(&state, lang));
        }
        Mode::Lang { code } => {
            persistence.save_language(code)?;
            println!("{}", code);
        }
        Mode::Apply { json } => apply(persistence, config.engine, &json)?,
    }

    Ok(())
}

fn parse_commands(json: &str) -> Result<Vec<Command>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

fn apply(persistence: Store, options: EngineOptions, json: &str) -> Result<(), Box<dyn std::error::Error>> {
    let commands = parse_commands(json)?;
    let mut session = GameSession::open(persistence, options);
    for command in commands {
        let name = command.name();
        let result = session.dispatch(command);
        tracing::info!(command = name, changed = result.changed, "dispatched");
    }
    println!("{}", serde_json::to_string_pretty(session.state())?);
    Ok(())
}

async fn play(persistence: Store, options: EngineOptions, mut lang: Language) -> Result<(), Box<dyn std::error::Error>> {
    let writer = BackgroundWriter::spawn(persistence);
    let mut session = GameSession::open(writer, options);

    println!("{}", t(lang, Text::GameManager));
    println!("{}", render_queue(session.state(), lang));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_line(&line, session.state()) {
            Ok(ConsoleInput::Empty) => {}
            Ok(ConsoleInput::Quit) => break,
            Ok(ConsoleInput::Help) => println!("{}", HELP),
            Ok(ConsoleInput::Show) => println!("{}", render_queue(session.state(), lang)),
            Ok(ConsoleInput::History) => println!("{}", render_history(session.state(), lang)),
            Ok(ConsoleInput::Language(next)) => {
                lang = next;
                if let Err(e) = session.port().persistence().save_language(lang) {
                    tracing::warn!(error = %e, "failed to store language");
                }
                println!("{}", lang);
            }
            Ok(ConsoleInput::Command(command)) => {
                let starting = command == Command::StartGame;
                let result = session.dispatch(command);
                if !result.changed {
                    println!("{}", t(lang, Text::NothingHappened));
                    continue;
                }
                if let Some(action) = &result.action {
                    println!("{}", describe(action, lang));
                } else if starting {
                    println!("{}", t(lang, Text::GameStarted));
                }
                println!("{}", render_queue(session.state(), lang));
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    let written = session.into_port().shutdown().await;
    tracing::info!(written, "session closed");
    Ok(())
}
