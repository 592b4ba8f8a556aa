use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use hexlight_app::{Configuration, CredentialsStore, LightController, VirtualPlug};
use hexlight_cli::{LogStrip, Metronome};
use hexlight_core::{Display, SharedDisplay};
use tokio::net::TcpListener;

/// Hexagon wall lights controller
///
/// Serves the HTTP endpoints that switch the effects shown on the hexagon wall.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Server socket address
    #[arg(short, long)]
    address: Option<SocketAddr>,
    /// File the streaming service credentials are cached in
    #[arg(long, value_name = "FILE")]
    credentials: Option<PathBuf>,
    /// Drive the visualizer with a synthetic beat of the given tempo
    #[arg(long, value_name = "BPM")]
    bpm: Option<u32>,
    /// Use the in-memory smart plug
    #[arg(long)]
    virtual_plug: bool,
    /// Actual command, the server is started if omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective configuration
    Config,
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

impl Cli {
    /// Loads the configuration file and applies the command line overrides.
    fn configuration(&self) -> anyhow::Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Unable to read config {}", path.display()))?;
                Configuration::from_toml(&content)
                    .with_context(|| format!("Unable to parse config {}", path.display()))?
            }
            None => Configuration::default(),
        };

        if let Some(address) = self.address {
            config.server.address = address;
        }
        if let Some(credentials) = &self.credentials {
            config.server.credentials = credentials.clone();
        }
        config.display.virtual_plug |= self.virtual_plug;
        Ok(config)
    }
}

async fn serve(config: Configuration, bpm: Option<u32>) -> anyhow::Result<()> {
    let display = Display::new(config.layout.clone(), LogStrip::default())
        .context("Invalid display layout")?
        .with_brightness(config.display.brightness);
    log::info!(
        "Display has {} hexagons of {} LEDs",
        config.layout.hexagons,
        config.layout.leds_per_hexagon
    );

    let mut controller = LightController::new(
        SharedDisplay::new(display),
        CredentialsStore::new(&config.server.credentials),
        config.effects,
    );
    if config.display.virtual_plug {
        log::info!("Using the virtual smart plug");
        controller = controller.with_plug(VirtualPlug::default());
    }
    let controller = Arc::new(controller);

    if controller.credentials().load()?.is_some() {
        log::info!(
            "Found cached credentials in {}",
            controller.credentials().path().display()
        );
    }
    let metronome = bpm
        .map(|bpm| Metronome::new(bpm).spawn(controller.playback_publisher()))
        .transpose()
        .context("Unable to spawn metronome thread")?;

    let listener = TcpListener::bind(config.server.address)
        .await
        .with_context(|| format!("Unable to bind {}", config.server.address))?;
    hexlight_network::serve_with_shutdown(listener, controller.clone(), async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for the shutdown signal: {err}");
        }
        log::info!("Shutting down");
    })
    .await?;

    if let Some(metronome) = metronome {
        metronome.stop();
    }
    // Blank the display on exit.
    tokio::task::spawn_blocking(move || controller.clear()).await??;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.configuration()?;
    match cli.command {
        Some(Command::Config) => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Some(Command::Completions { shell }) => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
        None => serve(config, cli.bpm).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_command_line_overrides() {
        let cli = Cli::try_parse_from([
            "hexlight",
            "--address",
            "127.0.0.1:8000",
            "--credentials",
            "/tmp/credentials.txt",
            "--virtual-plug",
            "--bpm",
            "96",
        ])
        .unwrap();
        let config = cli.configuration().unwrap();

        assert_eq!(config.server.address, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(
            config.server.credentials,
            PathBuf::from("/tmp/credentials.txt")
        );
        assert!(config.display.virtual_plug);
        assert_eq!(cli.bpm, Some(96));
        assert!(cli.command.is_none());
    }
}
