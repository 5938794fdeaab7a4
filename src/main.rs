// src/main.rs
//! gpsd client - interactive exerciser, live view and distance helper

use anyhow::Context;
use clap::{Parser, Subcommand};
use gpsd_client::{
    config::ClientConfig,
    geodesy::{self, LatLon, METERS_TO_FEET, METERS_TO_MILES},
    gps::gpsd::resolve_address,
    GpsMonitor, GpsdSession,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "gpsd-client", version, about = "Client for the gpsd text protocol")]
struct Cli {
    /// gpsd host, optionally with a :port suffix
    #[arg(long, global = true)]
    host: Option<String>,

    /// gpsd port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log raw daemon traffic
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the fix state as JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send commands typed on stdin and print the resulting fix state
    Shell,
    /// Live terminal view of the fix state
    Watch,
    /// Distance and offset between two points given in degrees
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lon1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lon2: f64,
    },
    /// Write the effective configuration to the config file
    SaveConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load().unwrap_or_default();
    if let Some(host) = cli.host.as_deref() {
        // an explicit --port wins over a :port suffix on the host
        let port = match cli.port {
            Some(port) => Some(port),
            None if host.contains(':') => None,
            None => Some(config.port),
        };
        let (host, port) = resolve_address(host, port)?;
        config.update_server(host, port);
    } else if let Some(port) = cli.port {
        config.port = port;
    }
    config.verbose |= cli.verbose;

    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => run_shell(&config, cli.json).await,
        Command::Watch => run_watch(&config).await,
        Command::Distance { lat1, lon1, lat2, lon2 } => {
            print_distance(LatLon::new(lat1, lon1), LatLon::new(lat2, lon2));
            Ok(())
        }
        Command::SaveConfig => {
            config.save().context("saving configuration")?;
            println!("Saved configuration to {}", ClientConfig::get_config_path()?.display());
            Ok(())
        }
    }
}

async fn run_shell(config: &ClientConfig, json: bool) -> anyhow::Result<()> {
    println!("This is the exerciser for the gpsd client.");

    let mut session = GpsdSession::connect(&config.host, Some(config.port))
        .await
        .context("connecting to gpsd")?;
    session.set_verbose(config.verbose);
    session.set_raw_hook(|line: &str| println!("{}", line.trim_end()));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(commands) = stdin.next_line().await? else {
            break;
        };

        let decoded = session.query(&commands).await.context("querying gpsd")?;
        for e in &decoded.errors {
            eprintln!("warning: {}", e);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(session.data())?);
        } else {
            print!("{}", session.data());
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn run_watch(config: &ClientConfig) -> anyhow::Result<()> {
    let monitor = GpsMonitor::new();
    monitor.start(config).await.context("connecting to gpsd")?;
    monitor
        .run_display(Duration::from_millis(config.refresh_ms))
        .await?;
    monitor.stop();
    Ok(())
}

fn print_distance(p1: LatLon, p2: LatLon) {
    let distance = geodesy::earth_distance(p1, p2);
    let (east, north) = geodesy::meter_offset(p1, p2);

    println!(
        "Distance: {:.3} m ({:.3} ft, {:.6} mi)",
        distance,
        distance * METERS_TO_FEET,
        distance * METERS_TO_MILES
    );
    println!("Offset:   {:.3} m east, {:.3} m north", east, north);
}
