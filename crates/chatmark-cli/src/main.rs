//! chatmark - render assistant Markdown and build provider requests

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chatmark_core::ai::{build_curl_command, ChatPayload};
use chatmark_core::{render, ColorConfig};

mod config;

use config::Config;

/// Environment variable holding the log filter
const LOG_ENV: &str = "CHATMARK_LOG";

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(version, about = "Chat Markdown to rich-text HTML", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/chatmark/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown file (or stdin) to HTML
    Render {
        /// Input file, stdin when omitted
        file: Option<PathBuf>,

        #[arg(long, value_name = "COLOR")]
        code_bg: Option<String>,

        #[arg(long, value_name = "COLOR")]
        inline_code_bg: Option<String>,

        #[arg(long, value_name = "COLOR")]
        blockquote_bg: Option<String>,

        #[arg(long, value_name = "COLOR")]
        blockquote_border: Option<String>,
    },

    /// Print the curl command for a chat payload
    Request {
        /// openai, anthropic, gemini or custom
        #[arg(short, long)]
        provider: Option<String>,

        /// JSON chat payload, stdin when omitted
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,

        /// API key (otherwise read from the configured environment variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Print the arguments as a JSON array instead of a shell line
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            file,
            code_bg,
            inline_code_bg,
            blockquote_bg,
            blockquote_border,
        } => {
            let mut colors = config.colors;
            if let Some(color) = code_bg {
                colors = colors.with_code_bg(color);
            }
            if let Some(color) = inline_code_bg {
                colors = colors.with_inline_code_bg(color);
            }
            if let Some(color) = blockquote_bg {
                colors = colors.with_blockquote_bg(color);
            }
            if let Some(color) = blockquote_border {
                colors = colors.with_blockquote_border(color);
            }
            run_render(file.as_deref(), &colors)
        }
        Command::Request {
            provider,
            payload,
            api_key,
            json,
        } => run_request(&config, provider, payload.as_deref(), api_key, json),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn run_render(file: Option<&Path>, colors: &ColorConfig) -> Result<ExitCode> {
    let text = read_input(file)?;
    info!("Rendering {} bytes", text.len());
    println!("{}", render(&text, Some(colors)));
    Ok(ExitCode::SUCCESS)
}

fn run_request(
    config: &Config,
    provider: Option<String>,
    payload_path: Option<&Path>,
    api_key: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let provider = provider
        .or_else(|| config.provider.name.clone())
        .unwrap_or_else(|| "openai".to_string());

    let input = read_input(payload_path)?;
    let mut payload: ChatPayload =
        serde_json::from_str(&input).context("Failed to parse chat payload")?;
    apply_provider_defaults(&mut payload, config);

    let api_key = resolve_api_key(api_key, config);
    let Some(cmd) = build_curl_command(&provider, &payload, &api_key) else {
        eprintln!("error: cannot build a request URL for provider {provider}");
        return Ok(ExitCode::FAILURE);
    };

    if json {
        println!("{}", serde_json::to_string(&cmd)?);
    } else {
        println!("{}", shell_words::join(&cmd));
    }
    Ok(ExitCode::SUCCESS)
}

/// Fill payload fields the caller left out from the config file
fn apply_provider_defaults(payload: &mut ChatPayload, config: &Config) {
    let provider = &config.provider;
    if payload.model.is_none() {
        payload.model = provider.model.clone();
    }
    if payload.base_url.is_none() {
        payload.base_url = provider.base_url.clone();
    }
    if payload.timeout.is_none() {
        payload.timeout = provider.timeout;
    }
}

fn resolve_api_key(flag: Option<String>, config: &Config) -> String {
    if let Some(key) = flag {
        return key;
    }
    if let Some(var) = &config.provider.api_key_env {
        match std::env::var(var) {
            Ok(key) => return key,
            Err(_) => warn!("API key variable {} is not set", var),
        }
    } else {
        warn!("No API key given; sending an empty key");
    }
    String::new()
}
