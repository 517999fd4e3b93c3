//! BullBear REPL
//!
//! Ask questions about a stock in plain English; the assistant answers with
//! indicators or writes a price chart to disk.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."          # or put the key in ./API_KEY
//! export OPENAI_MODEL="gpt-4o-mini"       # optional
//!
//! cargo run --bin bullbear
//! cargo run --bin bullbear -- --ask "What is the RSI of AAPL?"
//! ```

use anyhow::{Context, bail};
use bullbear_llm::providers::{OpenAIConfig, OpenAIProvider};
use bullbear_stock::session::Command;
use bullbear_stock::{
    AssistantConfig, ChartImage, ChatSession, TurnReply, YahooFinanceClient,
};
use bullbear_utils::{LogFormat, init_tracing, read_key_file};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_LOG_FILTER: &str = "warn,bullbear_stock=info";
const LOCAL_API_KEY: &str = "not-needed";

#[derive(Parser, Debug)]
#[command(name = "bullbear", version, about = "Chat with a stock analysis assistant")]
struct Args {
    /// OpenAI-compatible API base URL (falls back to OPENAI_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Chat model (falls back to OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// File holding the API key, read when OPENAI_API_KEY is unset
    #[arg(long, default_value = "API_KEY")]
    api_key_file: PathBuf,

    /// Directory charts are written to
    #[arg(long, default_value = "charts")]
    chart_dir: PathBuf,

    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Ask a single question and exit
    #[arg(long)]
    ask: Option<String>,
}

fn print_banner(model: &str, api_base: &str) {
    println!(
        r#"
BullBear - your stock analysis assistant

  Ask about prices, SMA, EMA, RSI, MACD or request a price chart.
  Type /help for commands, /exit to quit.

  Model:    {model}
  API base: {api_base}
"#
    );
}

fn provider_config(args: &Args) -> anyhow::Result<OpenAIConfig> {
    let config = match OpenAIConfig::from_env() {
        Ok(config) => config,
        Err(_) => match read_key_file(&args.api_key_file) {
            Ok(key) => OpenAIConfig::new(key),
            Err(err) if args.api_base.is_some() => {
                tracing::warn!(error = %err, "No API key found, assuming a local server");
                OpenAIConfig::new(LOCAL_API_KEY)
            }
            Err(err) => {
                return Err(err).context(
                    "no API key: set OPENAI_API_KEY or provide a key file with --api-key-file",
                );
            }
        },
    };

    let config = match &args.api_base {
        Some(base) => config.with_api_base(base.clone()),
        None => config,
    };
    Ok(config)
}

fn save_chart(dir: &Path, file_name: &str, image: &ChartImage) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create chart directory {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, &image.bytes)
        .with_context(|| format!("cannot write chart {}", path.display()))?;
    Ok(path)
}

/// Print a reply; returns false when the turn failed
fn show_reply(session: &ChatSession, reply: TurnReply, chart_dir: &Path) -> anyhow::Result<bool> {
    match reply {
        TurnReply::Text(text) => {
            println!("{text}\n");
            Ok(true)
        }
        TurnReply::Chart(image) => {
            let path = save_chart(chart_dir, &session.chart_file_name(&image), &image)?;
            println!("Chart for {} saved to {}\n", image.ticker, path.display());
            Ok(true)
        }
        TurnReply::Error(message) => {
            eprintln!("Error: {message}\n");
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(DEFAULT_LOG_FILTER, args.log_format);

    let openai_config = provider_config(&args)?;
    let api_base = openai_config.api_base.clone();
    let provider = Arc::new(OpenAIProvider::with_config(openai_config)?);

    let mut config = AssistantConfig::from_env()?;
    if let Some(model) = &args.model {
        config.model.clone_from(model);
        config.validate()?;
    }

    let market = Arc::new(YahooFinanceClient::new().with_timeout(config.market_timeout));
    let model = config.model.clone();
    let mut session = ChatSession::new(provider, market, config);

    if let Some(question) = &args.ask {
        let reply = session.handle_turn(question).await;
        let ok = show_reply(&session, reply, &args.chart_dir)?;
        session.end();
        if !ok {
            bail!("question could not be answered");
        }
        return Ok(());
    }

    print_banner(&model, &api_base);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(">>> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        if input.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}\n", e.user_message());
                continue;
            }
        };

        match command {
            Command::Exit => {
                println!("Goodbye!");
                break;
            }
            Command::Help => println!("{}", Command::help_text()),
            Command::Clear => {
                session.clear();
                println!("Conversation history cleared.\n");
            }
            Command::History => {
                println!("{}", session.summary());
                let conversation = session.conversation();
                if conversation.is_empty() {
                    println!("No messages yet.\n");
                } else {
                    let (user, assistant, function) = conversation.role_counts();
                    println!(
                        "{} messages ({user} user, {assistant} assistant, {function} function)",
                        conversation.len()
                    );
                    println!("{}", conversation.format_recent(10));
                }
            }
            Command::Query { text } => {
                let reply = session.handle_turn(&text).await;
                show_reply(&session, reply, &args.chart_dir)?;
            }
        }
    }

    session.end();
    Ok(())
}
