//! Command line control for Elgato Key Lights.
//!
//! Run with: keylight --help

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{LevelFilter, error, info, warn};

use keylight_rs::{
    Config, Context, ControlField, Error, Fleet, KeyLight, MdnsDiscovery, PowerMode,
    render_status, resolve_devices,
};

#[derive(Parser)]
#[command(name = "keylight")]
#[command(about = "Control Elgato Key Lights from the command line", long_about = None)]
struct Cli {
    /// Light to control (host or host:port); repeat for several. Discovers when omitted
    #[arg(short, long = "light", global = true)]
    lights: Vec<String>,

    /// Level of logging (off, panic, fatal, error, warn, warning, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Timeout in seconds for the whole operation, discovery included
    #[arg(short, long, global = true, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Toggle lights on and off
    Toggle,

    /// Turn lights on
    On,

    /// Turn lights off
    Off,

    /// Control light brightness
    Brightness {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Control light temperature
    Temperature {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Get device information
    Status,
}

#[derive(Subcommand)]
enum FieldAction {
    /// Increase by one step, up to 100
    StepUp,

    /// Decrease by one step, down to 0
    StepDown,

    /// Print the value of the first light
    Get,

    /// Set an exact value on every light
    Set {
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },
}

/// Accepts the `log` level names plus `warning`, `fatal` and `panic`.
fn parse_level(s: &str) -> Result<LevelFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "warning" => Ok(LevelFilter::Warn),
        "fatal" | "panic" => Ok(LevelFilter::Error),
        level => level
            .parse()
            .map_err(|_| format!("invalid log level {s:?}")),
    }
}

impl Cli {
    fn config(&self) -> Config {
        Config::new()
            .lights(self.lights.clone())
            .log_level(self.log_level)
            .timeout(Duration::from_secs(self.timeout))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let root = Context::new();
    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let ctx = config.context(&root);
    match run(&ctx, &config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Cancelled) => {
            info!("Interrupted");
            ExitCode::SUCCESS
        }
        Err(e @ Error::DiscoveryTimeout) => {
            warn!("{}", e);
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(ctx: &Context, config: &Config, command: Commands) -> Result<(), Error> {
    let devices: Vec<KeyLight> = resolve_devices(ctx, &config.lights, MdnsDiscovery::new()).await?;
    let fleet = Fleet::new(devices);
    if fleet.is_empty() {
        warn!("No lights found");
    }

    match command {
        Commands::Toggle => fleet.set_power(ctx, PowerMode::Toggle).await,
        Commands::On => fleet.set_power(ctx, PowerMode::On).await,
        Commands::Off => fleet.set_power(ctx, PowerMode::Off).await,
        Commands::Brightness { action } => control(ctx, &fleet, ControlField::Brightness, action).await,
        Commands::Temperature { action } => control(ctx, &fleet, ControlField::Temperature, action).await,
        Commands::Status => {
            let statuses = fleet.status(ctx).await?;
            println!("{}", render_status(&statuses));
            Ok(())
        }
    }
}

async fn control(
    ctx: &Context,
    fleet: &Fleet<KeyLight>,
    field: ControlField,
    action: FieldAction,
) -> Result<(), Error> {
    match action {
        FieldAction::StepUp => fleet.adjust_field(ctx, field, ControlField::STEP).await.map(drop),
        FieldAction::StepDown => fleet.adjust_field(ctx, field, -ControlField::STEP).await.map(drop),
        FieldAction::Get => {
            println!("{}", fleet.get_field(ctx, field).await?);
            Ok(())
        }
        FieldAction::Set { value } => fleet.set_field(ctx, field, value).await,
    }
}
