//! confab CLI: Terminal client for a remote answering service

use clap::{Parser, Subcommand};
use confab_engine::{
    format_message, AnswerClient, Config, Controller, Segment, Session, TurnStatus,
};
use std::path::{Path, PathBuf};

/// Terminal client for a question-answering service
#[derive(Parser)]
#[command(name = "confab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides CONFAB_BACKEND_URL and the config file)
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Ask a single question and print the answer
    Ask {
        /// The question to send
        question: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe the answering service and report latency
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved conversation sessions
    Sessions,

    /// Initialize .confab/ directory and config
    Init,
}

const CONFAB_DIR: &str = ".confab";
const BACKEND_ENV: &str = "CONFAB_BACKEND_URL";

fn main() {
    let cli = Cli::parse();
    let config = resolve_config(cli.backend.as_deref());

    match cli.command {
        None | Some(Commands::Tui) => {
            // Default: open TUI
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(confab_tui::run_tui(&config, Path::new(CONFAB_DIR))) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { question, json }) => {
            init_tracing();
            cmd_ask(&config, &question, json);
        }
        Some(Commands::Doctor { json }) => {
            init_tracing();
            cmd_doctor(&config, json);
        }
        Some(Commands::Sessions) => {
            init_tracing();
            cmd_sessions();
        }
        Some(Commands::Init) => {
            init_tracing();
            cmd_init(&config);
        }
    }
}

/// Stderr logging for non-TUI commands, filtered by `CONFAB_LOG`.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("CONFAB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_path() -> PathBuf {
    Path::new(CONFAB_DIR).join("config.json")
}

/// Resolve configuration: config file, then `CONFAB_BACKEND_URL`, then the
/// `--backend` flag. The result is passed down by value; nothing below this
/// reads the environment.
fn resolve_config(backend_flag: Option<&str>) -> Config {
    let mut config = Config::load(&config_path()).unwrap_or_default();

    if let Ok(url) = std::env::var(BACKEND_ENV) {
        if !url.is_empty() {
            config.backend_url = url;
        }
    }
    if let Some(url) = backend_flag {
        config.backend_url = url.to_string();
    }

    config
}

fn cmd_ask(config: &Config, question: &str, json: bool) {
    let mut controller = match Controller::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(e) = rt.block_on(controller.submit(question)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let Some(turn) = controller.transcript().last() else {
        eprintln!("Error: no answer received");
        std::process::exit(1);
    };

    if turn.status == TurnStatus::Failed {
        eprintln!("{}", turn.text);
        std::process::exit(1);
    }

    if json {
        let output = serde_json::json!({
            "answer": turn.text,
            "segments": format_message(&turn.text),
            "sources": turn.sources,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).expect("failed to serialize")
        );
        return;
    }

    print_segments(&format_message(&turn.text));
    if !turn.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &turn.sources {
            println!("  - {source}");
        }
    }
}

/// Plain-text rendering of formatted segments for one-shot output.
fn print_segments(segments: &[Segment]) {
    for segment in segments {
        match segment {
            Segment::PlainText { text } => println!("{text}"),
            Segment::CodeBlock { language, code } => {
                match language {
                    Some(language) => println!("--- {language}"),
                    None => println!("---"),
                }
                for line in code.lines() {
                    println!("  {line}");
                }
                println!("---");
            }
            Segment::BulletList { items } => {
                for item in items {
                    println!("  - {item}");
                }
            }
            Segment::NumberedList { items } => {
                for (index, item) in items.iter().enumerate() {
                    println!("  {}. {item}", index + 1);
                }
            }
        }
    }
}

fn cmd_doctor(config: &Config, json: bool) {
    let client = match AnswerClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(client.probe()) {
        Ok(latency) => {
            let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
            if json {
                let output = serde_json::json!({
                    "endpoint": client.endpoint(),
                    "reachable": true,
                    "latency_ms": ms,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).expect("failed to serialize")
                );
            } else {
                println!("{} - reachable ({ms}ms)", client.endpoint());
            }
        }
        Err(e) => {
            if json {
                let output = serde_json::json!({
                    "endpoint": client.endpoint(),
                    "reachable": false,
                    "error": e.to_string(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).expect("failed to serialize")
                );
            } else {
                eprintln!("{} - unreachable: {e}", client.endpoint());
            }
            std::process::exit(1);
        }
    }
}

fn cmd_sessions() {
    match Session::list(Path::new(CONFAB_DIR)) {
        Ok(sessions) => {
            if sessions.is_empty() {
                println!("No saved sessions");
                return;
            }
            for session in sessions {
                println!(
                    "{}  {}  {}",
                    session.id,
                    session.updated_at.format("%Y-%m-%d %H:%M"),
                    session.title
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to list sessions: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_init(config: &Config) {
    let path = config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
    } else {
        match config.save(&path) {
            Ok(()) => println!("Created {}", path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
    }

    let sessions_dir = Path::new(CONFAB_DIR).join("sessions");
    if let Err(e) = std::fs::create_dir_all(&sessions_dir) {
        eprintln!("Failed to create {}: {e}", sessions_dir.display());
        std::process::exit(1);
    }

    println!("\nInitialization complete!");
    println!("Backend: {}", config.backend_url);
}
