//! lan-control CLI: one-shot remote control of a LAN host from a terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use lan_control_clipboard::{DeviceClipboard, SystemClipboard};
use lan_control_engine::{ClipboardReport, ClipboardSync, Config, PreviewUpdate};
use lan_control_input::canonical_key_name;
use lan_control_protocol::{CommandChannel, HttpTransport, SessionApi};
use lan_control_types::{
    ClickRequest, Command, KeyAction, LoginRequest, MouseButton, MovementVector,
    RemoteScreenState, ScrollRequest, SessionInfo, SystemAction,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lan-control",
    about = "Drive a LAN host's keyboard, mouse, and clipboard",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Host URL, overriding the configuration file.
    #[arg(long, global = true, env = "LAN_CONTROL_SERVER")]
    server: Option<String>,

    /// Log in as this user before running the command.
    #[arg(short, long, global = true, env = "LAN_CONTROL_USER")]
    user: Option<String>,

    #[arg(long, global = true, env = "LAN_CONTROL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the host session is authenticated.
    Session,

    /// Print the host key name for a key identity (works offline).
    Normalize { key: String },

    /// Type literal text on the host.
    Type { text: String },

    /// Send a key by name (`enter`, `ArrowUp`, `Control`, `a`, ...).
    Key {
        name: String,
        #[arg(long, value_enum, default_value_t = ActionArg::Press)]
        action: ActionArg,
    },

    /// Click a mouse button.
    Click {
        #[arg(value_enum)]
        button: ButtonArg,
        #[arg(long)]
        double: bool,
    },

    /// Scroll by the given amounts.
    Scroll {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        horizontal: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        vertical: f64,
    },

    /// Move the host cursor by a relative amount.
    Move {
        #[arg(allow_hyphen_values = true)]
        dx: f64,
        #[arg(allow_hyphen_values = true)]
        dy: f64,
    },

    /// Show the host screen size and cursor position.
    State,

    /// Transfer clipboard contents between this machine and the host.
    Clipboard {
        #[command(subcommand)]
        action: ClipboardAction,
    },

    /// Lock the host session.
    Lock,

    /// Unlock the host session.
    Unlock,

    /// Shut the host down.
    Shutdown {
        /// Confirm the shutdown.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ClipboardAction {
    /// Fetch the host clipboard and copy it to the local clipboard.
    Pull {
        /// Only print the host clipboard.
        #[arg(long)]
        no_mirror: bool,
    },
    /// Send the local clipboard to the host.
    Push,
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Down,
    Up,
    Press,
}

impl From<ActionArg> for KeyAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Down => KeyAction::Down,
            ActionArg::Up => KeyAction::Up,
            ActionArg::Press => KeyAction::Press,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ButtonArg {
    Left,
    Right,
    Middle,
}

impl From<ButtonArg> for MouseButton {
    fn from(button: ButtonArg) -> Self {
        match button {
            ButtonArg::Left => MouseButton::Left,
            ButtonArg::Right => MouseButton::Right,
            ButtonArg::Middle => MouseButton::Middle,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Normalize { key } = &cli.command {
        match canonical_key_name(key) {
            Some(name) => println!("{name}"),
            None => bail!("no host key for {key:?}"),
        }
        return Ok(());
    }

    let url = cli.server.clone().unwrap_or_else(|| config.server.url.clone());
    let host = Arc::new(HttpTransport::new(&url)?);
    let session = authenticate(&host, cli.user.as_deref(), cli.password.as_deref()).await?;

    if matches!(cli.command, Commands::Session) {
        match (session.authenticated, session.username) {
            (true, Some(user)) => println!("authenticated as {user} on {url}"),
            (true, None) => println!("authenticated on {url}"),
            (false, _) => println!("not authenticated on {url}"),
        }
        return Ok(());
    }
    if !session.authenticated {
        bail!("not logged in to {url}; pass --user and --password");
    }

    match cli.command {
        Commands::Session | Commands::Normalize { .. } => {}
        Commands::Type { text } => {
            send(&host, Command::type_text(text)).await?;
        }
        Commands::Key { name, action } => {
            let key = canonical_key_name(&name).ok_or_else(|| anyhow!("unknown key {name:?}"))?;
            send(&host, Command::key(key, action.into())).await?;
        }
        Commands::Click { button, double } => {
            let request = ClickRequest {
                button: button.into(),
                double: double.then_some(true),
            };
            send(&host, Command::MouseClick(request)).await?;
        }
        Commands::Scroll {
            horizontal,
            vertical,
        } => {
            let request = ScrollRequest {
                horizontal,
                vertical,
            };
            send(&host, Command::MouseScroll(request)).await?;
        }
        Commands::Move { dx, dy } => {
            let reply = host
                .send(Command::MouseMove(MovementVector::new(dx, dy)))
                .await?;
            print_state(reply.state);
        }
        Commands::State => {
            let reply = host.send(Command::MouseState).await?;
            print_state(reply.state);
        }
        Commands::Clipboard { action } => {
            let device = match SystemClipboard::new() {
                Ok(clipboard) => Some(Arc::new(clipboard) as Arc<dyn DeviceClipboard>),
                Err(e) => {
                    tracing::warn!(error = %e, "local clipboard unavailable");
                    None
                }
            };
            let sync = ClipboardSync::new(device, host.clone(), config.clipboard.max_size);
            let report = match action {
                ClipboardAction::Pull { no_mirror } => sync.pull(!no_mirror).await?,
                ClipboardAction::Push => sync.push().await?,
            };
            print_clipboard(&report);
        }
        Commands::Lock => system(&host, SystemAction::Lock).await?,
        Commands::Unlock => system(&host, SystemAction::Unlock).await?,
        Commands::Shutdown { yes } => {
            if !yes {
                bail!("refusing to shut the host down without --yes");
            }
            system(&host, SystemAction::Shutdown).await?;
        }
    }

    Ok(())
}

/// Log in when credentials are given, otherwise report the current session.
async fn authenticate(
    host: &HttpTransport,
    user: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<SessionInfo> {
    match (user, password) {
        (Some(user), Some(password)) => {
            tracing::info!(user, "logging in");
            let request = LoginRequest {
                username: user.to_string(),
                password: password.to_string(),
                remember: false,
            };
            host.login(request)
                .await
                .with_context(|| format!("login as {user} failed"))
        }
        (Some(_), None) => bail!("--user needs --password"),
        _ => Ok(host.session().await?),
    }
}

async fn send(host: &HttpTransport, command: Command) -> anyhow::Result<()> {
    let name = command.name();
    host.send(command)
        .await
        .with_context(|| format!("{name} failed"))?;
    tracing::debug!(command = name, "sent");
    Ok(())
}

async fn system(host: &HttpTransport, action: SystemAction) -> anyhow::Result<()> {
    send(host, Command::System(action)).await?;
    println!("{} requested", action.as_str());
    Ok(())
}

fn print_state(state: Option<RemoteScreenState>) {
    match state {
        Some(state) => println!(
            "screen {}x{}, cursor at ({}, {})",
            state.width, state.height, state.x, state.y
        ),
        None => println!("host did not report its screen state"),
    }
}

fn print_clipboard(report: &ClipboardReport) {
    if let Some(status) = &report.status {
        println!("{status}");
    }
    if let PreviewUpdate::Set(preview) = &report.preview {
        match preview.content.as_text() {
            Some(text) => println!("{} clipboard: {text}", preview.origin),
            None => println!(
                "{} clipboard: image ({} bytes base64)",
                preview.origin,
                preview.content.size()
            ),
        }
    }
}
