use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use regis_cli::cli::{load_config, run, CliCommand, CliOverrides};
use regis_core::config::ReconnectMode;
use regis_core::tracing_setup::init_tracing_with_default;
use regis_core::Permission;

#[derive(Parser)]
#[command(name = "regis-cli")]
#[command(about = "Messages and announcements from the school portal")]
struct Cli {
    /// Path to JSON config file (baseUrl, socketUrl, currentUserId, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Backend origin, overrides baseUrl
    #[arg(long)]
    base_url: Option<String>,

    /// Push channel URL, overrides socketUrl
    #[arg(long)]
    socket_url: Option<String>,

    /// Id of the signed-in user
    #[arg(long, short = 'u')]
    user_id: Option<u64>,

    /// Anti-forgery token for read receipts
    #[arg(long)]
    csrf_token: Option<String>,

    /// Raw Cookie header carrying the session
    #[arg(long)]
    session_cookie: Option<String>,

    /// Notification permission for announcements
    #[arg(long, value_enum)]
    notifications: Option<PermissionArg>,

    /// After a disconnect, resume with backoff instead of reloading the thread
    #[arg(long)]
    resume: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to a thread
    Send {
        /// Thread ID
        thread_id: u64,
        /// Message body
        body: String,
        /// Recipient user ID
        #[arg(long, short = 'r')]
        recipient: String,
        #[arg(long, short = 's', default_value = "")]
        subject: String,
        /// File to attach (can be specified multiple times)
        #[arg(long = "attach", short = 'a')]
        attachments: Vec<PathBuf>,
    },

    /// Mark an announcement as read
    MarkRead {
        /// Announcement ID
        announcement_id: u64,
    },

    /// Follow a thread live until Ctrl+C
    Listen {
        /// Thread ID
        thread_id: u64,
    },

    /// Print the messages of a thread
    Thread {
        /// Thread ID
        thread_id: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PermissionArg {
    Granted,
    Denied,
    Ask,
}

impl From<PermissionArg> for Permission {
    fn from(arg: PermissionArg) -> Self {
        match arg {
            PermissionArg::Granted => Permission::Granted,
            PermissionArg::Denied => Permission::Denied,
            PermissionArg::Ask => Permission::Default,
        }
    }
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            base_url: self.base_url.clone(),
            socket_url: self.socket_url.clone(),
            user_id: self.user_id,
            csrf_token: self.csrf_token.clone(),
            session_cookie: self.session_cookie.clone(),
            permission: self.notifications.map(Permission::from),
            reconnect: self.resume.then_some(ReconnectMode::Resume),
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing_with_default("warn");
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let command = match cli.command {
        Commands::Send {
            thread_id,
            body,
            recipient,
            subject,
            attachments,
        } => CliCommand::Send {
            thread_id,
            recipient,
            subject,
            body,
            attachments,
        },
        Commands::MarkRead { announcement_id } => CliCommand::MarkRead { announcement_id },
        Commands::Listen { thread_id } => CliCommand::Listen { thread_id },
        Commands::Thread { thread_id } => CliCommand::Thread { thread_id },
    };

    if let Err(e) = run(command, &config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
