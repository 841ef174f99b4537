use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use pdvisit_capture::{
    CaptureSettings, Connectivity, FixedLocation, NoLocation, SubmitOutcome, VisitCapture,
};
use pdvisit_core::{AppConfig, Environment, IdentifierCode, RouteCode};
use pdvisit_remote::{RemoteClient, RemoteConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pdvisit")]
#[command(about = "Log point-of-sale visits to the field database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the route codes agents can report under.
    Routes,
    /// Check that the visit table is reachable.
    Probe,
    /// Resolve the store name for an 8-digit MDN code.
    Lookup { code: String },
    /// Record one visit.
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
struct SubmitArgs {
    #[arg(long)]
    route: RouteCode,

    /// 8-digit MDN code of the store.
    #[arg(long)]
    code: String,

    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lng: Option<f64>,

    /// Fix accuracy in metres.
    #[arg(long, default_value_t = 0.0)]
    accuracy: f64,

    /// The store has chips in stock.
    #[arg(long)]
    has_inventory: bool,

    #[arg(long)]
    inventory_count: Option<u32>,

    /// Chips were left at the store.
    #[arg(long)]
    left_inventory: bool,

    #[arg(long)]
    left_count: Option<u32>,

    /// Probe the remote first and refuse to submit if it is unreachable.
    #[arg(long)]
    check_connection: bool,
}

/// JSON lines in production, human-readable text elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn for_env(env: &Environment) -> Self {
        match env {
            Environment::Production => LogFormat::Json,
            Environment::Development | Environment::Test => LogFormat::Text,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Routes => {
            for route in RouteCode::ALL {
                println!("{route}");
            }
            Ok(())
        }
        Commands::Probe => run_probe(&mut start_session()?).await,
        Commands::Lookup { code } => run_lookup(&mut start_session()?, &code).await,
        Commands::Submit(args) => run_submit(&mut start_session()?, args).await,
    }
}

/// Loads configuration, installs logging and opens a capture session.
fn start_session() -> anyhow::Result<VisitCapture> {
    let config = pdvisit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let logs = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match LogFormat::for_env(&config.env) {
        LogFormat::Json => logs.json().with_ansi(false).init(),
        LogFormat::Text => logs.init(),
    }
    tracing::debug!(?config, "configuration loaded");

    build_capture(&config)
}

fn build_capture(config: &AppConfig) -> anyhow::Result<VisitCapture> {
    let client = RemoteClient::new(RemoteConfig::from_app_config(config))?;
    Ok(VisitCapture::new(
        Arc::new(client),
        CaptureSettings::from_app_config(config),
    ))
}

async fn run_probe(capture: &mut VisitCapture) -> anyhow::Result<()> {
    match capture.probe_connectivity().await {
        Connectivity::Reachable => {
            println!("Connection OK");
            Ok(())
        }
        status => anyhow::bail!(
            "connection failed ({status:?}): {}",
            capture.error().unwrap_or("unknown error")
        ),
    }
}

async fn run_lookup(capture: &mut VisitCapture, code: &str) -> anyhow::Result<()> {
    let code = IdentifierCode::parse(code)?;
    capture.enter_identifier(code.as_str()).await;
    match capture.draft().resolved_name.label() {
        Some(label) => println!("PDV: {label}"),
        None => println!("PDV: (lookup failed)"),
    }
    Ok(())
}

async fn run_submit(capture: &mut VisitCapture, args: SubmitArgs) -> anyhow::Result<()> {
    match (args.lat, args.lng) {
        (Some(latitude), Some(longitude)) => {
            let here = FixedLocation {
                latitude,
                longitude,
                accuracy: args.accuracy,
            };
            capture.acquire_location(&here).await;
        }
        _ => capture.acquire_location(&NoLocation).await,
    }
    if let Some(message) = capture.location_error() {
        eprintln!("{message}");
    }

    if args.check_connection {
        capture.probe_connectivity().await;
    }

    capture.set_route(Some(args.route));
    capture.enter_identifier(args.code.trim()).await;
    if capture.draft().identifier != args.code.trim() {
        eprintln!("MDN code may only contain up to 8 digits; input ignored");
    }
    if let Some(hint) = capture.identifier_hint() {
        eprintln!("{hint}");
    }
    if let Some(label) = capture.draft().resolved_name.label() {
        println!("PDV: {label}");
    }

    capture.set_has_inventory(args.has_inventory);
    capture.set_inventory_count(args.inventory_count);
    capture.set_left_inventory(args.left_inventory);
    capture.set_left_inventory_count(args.left_count);

    match capture.submit().await {
        SubmitOutcome::Saved => {
            println!("Visit saved.");
            Ok(())
        }
        SubmitOutcome::Rejected(_) | SubmitOutcome::Failed => {
            anyhow::bail!("{}", capture.error().unwrap_or("visit not saved"))
        }
        SubmitOutcome::Blocked => anyhow::bail!(
            "submission is disabled: {}",
            capture.error().unwrap_or("remote is unreachable")
        ),
    }
}
