//! Terminal front end for the WhatsApp bot backend
//!
//! - `status`, `watch`, `init`, `logout`: session control
//! - `stats`, `history`, `monitor`: usage and activity
//! - `prompts`, `keys`, `contacts`: backend configuration

use crate::api::{TargetMode, WhatsAppApiClient};
use crate::config::DashboardConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

pub mod insights;
pub mod manage;
pub mod render;
pub mod session;

/// WA-BOT-AI dashboard
#[derive(Parser, Debug)]
#[command(name = "wabot-dashboard")]
#[command(about = "Control panel for a WhatsApp AI auto-responder")]
#[command(version)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "WA_API_URL")]
    pub api_url: Option<String>,

    /// WhatsApp session id
    #[arg(long, global = true, env = "WA_SESSION_ID")]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the session status once
    Status {
        /// Write the pairing QR image to this file when one is available
        #[arg(long)]
        qr_out: Option<PathBuf>,
    },
    /// Poll the session and redraw on every change (Ctrl-C to quit)
    Watch,
    /// Start the WhatsApp session
    Init,
    /// Stop the bot and unlink the session
    Logout {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Per-chat usage counters
    Stats,
    /// Show the transcript of one chat
    History {
        /// Phone number or full jid
        jid: String,
    },
    /// Stream session activity (Ctrl-C to quit)
    Monitor,
    /// Manage AI personas
    #[command(subcommand)]
    Prompts(PromptCommands),
    /// Manage upstream AI API keys
    #[command(subcommand)]
    Keys(KeyCommands),
    /// Manage the contact allow-list
    #[command(subcommand)]
    Contacts(ContactCommands),
}

#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    List,
    Add {
        #[arg(long)]
        name: String,
        /// Persona instructions
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read the instructions from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Activate {
        id: String,
    },
    Remove {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    List {
        /// Print full key values
        #[arg(long)]
        reveal: bool,
    },
    Add {
        #[arg(long)]
        name: String,
        /// Key value; prompted for (masked) when omitted
        #[arg(long)]
        value: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: String,
        /// New key value; the stored one is kept when omitted
        #[arg(long)]
        value: Option<String>,
    },
    Activate {
        id: String,
    },
    Remove {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    List,
    Add {
        /// Phone number, e.g. 0812... or 62812...
        number: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    Edit {
        /// Current jid of the contact
        jid: String,
        #[arg(long)]
        number: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    Remove {
        jid: String,
        #[arg(long)]
        yes: bool,
    },
    /// Reply to everyone or only to listed contacts
    Mode {
        mode: TargetMode,
    },
}

/// Resolved configuration plus the shared HTTP client.
pub struct Context {
    pub config: DashboardConfig,
    pub client: Arc<WhatsAppApiClient>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = DashboardConfig::from_env();
        if let Some(url) = &cli.api_url {
            config.api_url = url.clone();
        }
        if let Some(session) = &cli.session {
            config.session_id = session.clone();
        }
        let config = config.normalized();
        let client = Arc::new(WhatsAppApiClient::new(&config)?);
        Ok(Self { config, client })
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let ctx = Context::from_cli(&cli)?;
    tracing::debug!(api_url = %ctx.config.api_url, session = %ctx.config.session_id, "Dashboard configured");

    match command {
        Commands::Status { qr_out } => session::status(&ctx, qr_out.as_deref()).await,
        Commands::Watch => session::watch(&ctx).await,
        Commands::Init => session::init(&ctx).await,
        Commands::Logout { yes } => session::logout(&ctx, *yes).await,
        Commands::Stats => insights::stats(&ctx).await,
        Commands::History { jid } => insights::history(&ctx, jid).await,
        Commands::Monitor => insights::monitor(&ctx).await,
        Commands::Prompts(cmd) => manage::prompts(&ctx, cmd).await,
        Commands::Keys(cmd) => manage::keys(&ctx, cmd).await,
        Commands::Contacts(cmd) => manage::contacts(&ctx, cmd).await,
    }
}
