//! Portfolio Chat Entry Point
//!
//! Launches the terminal surface: the content page with the chat widget in
//! the bottom-right corner.
//!
//! Usage:
//!   portfolio-chat [OPTIONS]
//!
//! Options:
//!   --api-url <URL>   API base for chat and content
//!                     (overrides PORTFOLIO_API_URL, which the config loader reads)
//!   --config <FILE>   Configuration file (env: PORTFOLIO_CONFIG)
//!   --ephemeral       Keep the session identifier in memory only
//!
//! Logs go to the file named by `PORTFOLIO_LOG_FILE`, filtered by `RUST_LOG`.

use std::io;
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatbot_core::{default_config_path, load_config_from_path, ConfigOverrides, WidgetConfig};
use portfolio_tui::App;

/// Portfolio chat widget in the terminal
#[derive(Parser, Debug)]
#[command(name = "portfolio-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API base address for the chat and content endpoints
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "PORTFOLIO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep the session identifier in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging()?;
    let config = load_widget_config(&args)?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: portfolio-chat requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, config, args.ephemeral).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

/// Install the tracing subscriber
///
/// The alternate screen owns stdout and stderr, so logs only go somewhere
/// when `PORTFOLIO_LOG_FILE` names a file.
fn init_logging() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("PORTFOLIO_LOG_FILE") else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", PathBuf::from(&path).display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    Ok(())
}

/// Load the config file and environment, then apply CLI flags
fn load_widget_config(args: &Args) -> anyhow::Result<WidgetConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.api_url {
        overrides = overrides.with_api_url(url.clone());
    }
    overrides.apply(&mut config);

    tracing::info!(
        source = ?config.source(),
        api_url = %config.chat.api_url,
        "Configuration loaded"
    );
    Ok(config)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: WidgetConfig,
    ephemeral: bool,
) -> anyhow::Result<()> {
    let mut app = App::new(config, ephemeral)?;
    app.run(terminal).await
}
