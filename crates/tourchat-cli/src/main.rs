//! `tourchat`: terminal host for the Tourchat chat widget.

mod config;
mod display;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tourchat_session::{resolve_credential, CredentialSlot, FileSessionStore, SessionStore, Token};
use tourchat_widget::{ChatWidget, HttpChatbotApi, LoadOutcome, SendOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tourchat", about = "Tourchat: travel assistant chat in your terminal")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "tourchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the widget and chat interactively
    Chat {
        /// Bearer token for this run only (ephemeral slot)
        #[arg(long)]
        token: Option<String>,
    },
    /// Print the restored conversation and exit
    History {
        #[arg(long)]
        token: Option<String>,
    },
    /// Send one message and print the reply
    Ask {
        #[arg(long)]
        token: Option<String>,
        /// Message text
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Show how a bot reply is split into segments
    Render {
        text: String,
    },
    /// Manage the stored credential
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a bearer token (durable slot unless `--ephemeral`)
    Set {
        value: String,
        /// Keep the token in memory for this process only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Remove the token from both slots
    Clear,
    /// Report whether a token is stored
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(&cli.config).await?;

    let sessions = Arc::new(
        FileSessionStore::new(config.storage_path())
            .await?
            .with_key(config.storage.key.clone()),
    );

    match cli.command {
        Commands::Chat { token } => {
            let widget = build_widget(&config, sessions, token).await?;
            run_chat(&widget).await?;
        }
        Commands::History { token } => {
            let widget = build_widget(&config, sessions, token).await?;
            if let Some(outcome) = widget.open().await {
                report_load(outcome);
            }
            print_transcript(&widget, 0);
        }
        Commands::Ask { token, message } => {
            let widget = build_widget(&config, sessions, token).await?;
            widget.open().await;
            let before = widget.transcript().len();
            let outcome = widget.send(&message.join(" ")).await;
            if let SendOutcome::Ignored(reason) = outcome {
                anyhow::bail!("Message not sent: {reason:?}");
            }
            print_transcript(&widget, before);
        }
        Commands::Render { text } => {
            // Allow `\n` escapes from the shell.
            let text = text.replace("\\n", "\n");
            for line in display::describe_segments(&text) {
                println!("{line}");
            }
        }
        Commands::Token { action } => match action {
            TokenAction::Set { value, ephemeral } => {
                let slot = set_token(&sessions, value, ephemeral).await?;
                match slot {
                    CredentialSlot::Durable => {
                        println!("Token stored in {}", config.storage_path().display());
                    }
                    CredentialSlot::Ephemeral => {
                        println!(
                            "Token kept in memory only; it ends with this process. \
                             Pass --token to chat/ask/history to use it for a run."
                        );
                    }
                }
            }
            TokenAction::Clear => {
                sessions.clear_all().await?;
                println!("Token cleared.");
            }
            TokenAction::Show => match resolve_credential(sessions.as_ref()).await {
                Some(_) => println!("Signed in (token stored)."),
                None => println!("Anonymous (no token stored)."),
            },
        },
    }

    Ok(())
}

/// Stores `value` in the slot picked by `ephemeral` and returns that slot.
async fn set_token(
    sessions: &FileSessionStore,
    value: String,
    ephemeral: bool,
) -> anyhow::Result<CredentialSlot> {
    let token = Token::parse(value).ok_or_else(|| anyhow::anyhow!("Token must not be empty"))?;
    let slot = if ephemeral {
        CredentialSlot::Ephemeral
    } else {
        CredentialSlot::Durable
    };
    sessions.store(slot, token).await?;
    tracing::debug!(slot = ?slot, "Token stored");
    Ok(slot)
}

async fn build_widget(
    config: &config::TourchatConfig,
    sessions: Arc<FileSessionStore>,
    token: Option<String>,
) -> anyhow::Result<ChatWidget> {
    if let Some(token) = token.and_then(Token::parse) {
        sessions.store(CredentialSlot::Ephemeral, token).await?;
    }
    let api = Arc::new(HttpChatbotApi::new(config.api.clone())?);
    tracing::debug!(base_url = %config.api.base_url, "Chatbot API configured");
    Ok(ChatWidget::new(api, sessions, config.widget.clone()))
}

fn report_load(outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Unauthorized => {
            eprintln!("(phiên đăng nhập đã hết hạn, đã đăng xuất)");
        }
        LoadOutcome::Failed => {
            eprintln!("(không tải được lịch sử trò chuyện)");
        }
        _ => {}
    }
}

fn print_transcript(widget: &ChatWidget, from: usize) {
    let config = widget.config();
    for message in widget.transcript().iter().skip(from) {
        println!("{}", display::format_message(message, config));
    }
}

async fn run_chat(widget: &ChatWidget) -> anyhow::Result<()> {
    if let Some(outcome) = widget.open().await {
        report_load(outcome);
    }
    print_transcript(widget, 0);
    if !widget.suggestions().is_empty() {
        println!("      {}", display::format_suggestions(widget.suggestions()));
    }
    println!("      (/reload tải lại, /quit thoát)");

    // Typing indicator, driven by widget state changes.
    let mut rx = widget.subscribe();
    let indicator = tokio::spawn(async move {
        let mut shown = false;
        while rx.changed().await.is_ok() {
            let typing = rx.borrow_and_update().is_typing;
            if typing && !shown {
                eprintln!(" bot: ...");
            }
            shown = typing;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let before = widget.transcript().len();

        // Typed lines are already on screen; a picked suggestion is not.
        let (outcome, echoed) = match line {
            "/quit" | "/exit" => break,
            "/reload" => {
                widget.close();
                if let Some(outcome) = widget.open().await {
                    report_load(outcome);
                }
                print_transcript(widget, 0);
                continue;
            }
            _ => match line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n >= 1 => (widget.send_suggestion(n - 1).await, false),
                _ => {
                    widget.set_input(line);
                    (widget.submit().await, true)
                }
            },
        };

        match outcome {
            SendOutcome::Ignored(reason) => {
                tracing::debug!(reason = ?reason, "Input not sent");
            }
            _ => print_transcript(widget, if echoed { before + 1 } else { before }),
        }
    }

    widget.close();
    indicator.abort();
    Ok(())
}
