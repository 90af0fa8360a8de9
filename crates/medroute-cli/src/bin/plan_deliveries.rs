use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use medroute_cli::input::{read_dispatches, read_snapshot, write_json};
use medroute_cli::{render_output, Config, OutputFormat};
use medroute_client::IlpClient;
use medroute_core::FleetPlanner;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan medical drone deliveries", long_about = None)]
struct Args {
    /// Dispatch batch as a JSON array ("-" reads stdin)
    #[arg(long, short)]
    dispatches: PathBuf,

    /// Fleet snapshot JSON; fetched from the ILP service when omitted
    #[arg(long, short)]
    snapshot: Option<PathBuf>,

    /// ILP service URL (overrides ILP_ENDPOINT)
    #[arg(long)]
    ilp_endpoint: Option<String>,

    /// Planner constants JSON (overrides MEDROUTE_PLANNER_CONFIG)
    #[arg(long)]
    planner_config: Option<PathBuf>,

    /// Write the snapshot used for planning to this file
    #[arg(long)]
    save_snapshot: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Plan)]
    output: OutputFormat,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("medroute=info,plan_deliveries=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(endpoint) = args.ilp_endpoint {
        config.ilp_endpoint = endpoint;
    }
    if let Some(path) = args.planner_config {
        config.planner_config_path = Some(path);
    }
    let planner_config = config.planner_config()?;

    let dispatches = read_dispatches(&args.dispatches)?;

    let snapshot = match &args.snapshot {
        Some(path) => read_snapshot(path)?,
        None => {
            tracing::info!(endpoint = %config.ilp_endpoint, "Fetching fleet snapshot");
            IlpClient::new(config.ilp_endpoint.as_str(), config.http_timeout)?
                .fetch_snapshot()
                .await
        }
    };
    if let Some(path) = &args.save_snapshot {
        write_json(path, &serde_json::to_value(&snapshot)?)?;
        tracing::info!(path = %path.display(), "Saved fleet snapshot");
    }

    tracing::info!(
        dispatches = dispatches.len(),
        drones = snapshot.drones.len(),
        restricted_areas = snapshot.restricted_areas.len(),
        output = ?args.output,
        "Planning"
    );

    let planner = FleetPlanner::new(&snapshot, planner_config);
    let value = render_output(args.output, &planner, &dispatches)?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", rendered);

    Ok(())
}
