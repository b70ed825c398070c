use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use multitimer::app::App;
use multitimer::config::AppConfig;
use multitimer::storage::SettingsManager;
use multitimer::ui::{AlarmPlayer, Console, NotificationManager};

#[derive(Parser, Debug)]
#[command(version, about = "Named countdown timers with alarms")]
struct Cli {
    /// Config file (TOML); defaults to the per-user config if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Settings file, overriding the config
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Abort startup on a malformed settings file instead of using defaults
    #[arg(long)]
    strict_settings: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr, keeping stdout for the console
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("multitimer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Multitimer...");

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.settings {
        config.settings_path = path;
    }

    let settings_manager = SettingsManager::new(config.settings_path.clone());
    let settings = if cli.strict_settings {
        settings_manager.load_settings().await?
    } else {
        settings_manager.load_or_default().await
    };
    info!("Settings loaded from {}", settings_manager.path().display());

    let console = Console::stdout(settings.theme());
    let player = AlarmPlayer::new(config.sound_dir.clone(), config.player_command.as_deref());
    let mut notifier = NotificationManager::new(console.clone(), player);
    notifier.set_desktop_enabled(config.desktop_notifications);

    let app = App::new(config, settings, settings_manager, console.clone(), Box::new(notifier));
    console.write_line("Type 'help' for commands.");

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    app.run(input).await?;

    info!("Shutting down Multitimer...");
    Ok(())
}
