use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use meteo_core::{Client, Config, ResolverId, config::DEFAULT_TIMEOUT};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "meteo",
    version,
    about = "Current weather for a place, e.g. `meteo Castlebar,IE`",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Location as "<place>,<country-code>"; words are joined with spaces.
    pub location: Vec<String>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// GeoNames account name; overrides the config file.
    #[arg(long, env = "GEONAMES_USER", global = true, hide_env_values = true)]
    pub username: Option<String>,

    /// Resolver to use: "postal" or "wikipedia".
    #[arg(long, global = true)]
    pub resolver: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the GeoNames username and default resolver.
    Configure,

    /// Show weather for coordinates, skipping place resolution.
    #[command(allow_negative_numbers = true)]
    Coords {
        lat: f64,
        lon: f64,
    },

    /// Show the hourly forecast for a location.
    Forecast {
        /// Location as "<place>,<country-code>".
        #[arg(required = true)]
        location: Vec<String>,

        /// Number of entries to print.
        #[arg(long, default_value_t = 12)]
        hours: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Coords { lat, lon }) => {
                let client = build_client(&self.global)?;
                let weather = client.get_weather_for_coordinates(lat, lon).await?;
                println!("{weather}");
                Ok(())
            }
            Some(Command::Forecast { location, hours }) => {
                let client = build_client(&self.global)?;
                let location = location.join(" ");
                let forecast = client.get_forecast(&location).await?;

                if let Some(updated_at) = forecast.updated_at {
                    let updated_at = updated_at.with_timezone(&Local);
                    println!("{location} (updated {})", updated_at.format("%Y-%m-%d %H:%M"));
                }
                for entry in forecast.hourly.iter().take(hours) {
                    println!(
                        "{}  {:>5.1}°C  {}",
                        entry.time.with_timezone(&Local).format("%a %H:%M"),
                        entry.air_temperature,
                        entry.description()
                    );
                }
                Ok(())
            }
            None => {
                if self.location.is_empty() {
                    bail!("Usage: meteo LOCATION\n\nExample: meteo London,UK");
                }
                let client = build_client(&self.global)?;
                let weather = client.get_weather(&self.location.join(" ")).await?;
                println!("{weather}");
                Ok(())
            }
        }
    }
}

/// Config file values overridden by flags and the environment.
fn build_client(args: &GlobalArgs) -> anyhow::Result<Client> {
    let mut config = Config::load()?;

    if let Some(username) = &args.username {
        config.set_username(username.clone());
    }
    if let Some(resolver) = args.resolver.as_deref() {
        config.set_default_resolver(ResolverId::try_from(resolver)?);
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = Some(secs);
    }

    let resolver = config.resolver_id()?;
    debug!(%resolver, has_username = config.username().is_some(), "building client");
    Ok(Client::from_config(&config)?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let username = Text::new("GeoNames username:")
        .with_default(config.username().unwrap_or_default())
        .with_help_message("Register for free at geonames.org and enable the web services")
        .prompt()
        .context("Failed to read username")?;
    if username.trim().is_empty() {
        bail!("GeoNames username must not be empty");
    }

    let options: Vec<ResolverId> = ResolverId::all().to_vec();
    let resolver = Select::new("Default resolver:", options)
        .prompt()
        .context("Failed to read resolver")?;

    config.set_username(username.trim().to_string());
    config.set_default_resolver(resolver);
    if config.timeout_secs.is_none() {
        config.timeout_secs = Some(DEFAULT_TIMEOUT.as_secs());
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
