//! Terra-Operator Entry Point
//!
//! Starts the Validator controller and optional REST API server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use kube::CustomResourceExt;
use terra_operator::crd::{TerradNode, Validator};
use terra_operator::{controller, telemetry, Error};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the operator
    Run(RunArgs),
    /// Print the Validator and TerradNode CRDs as YAML
    Crd,
    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Only watch Validators in this namespace (all namespaces when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    namespace: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Port of the REST API server
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    #[cfg_attr(not(feature = "rest-api"), allow(dead_code))]
    api_port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    match args.command {
        Commands::Version => {
            println!("Terra Operator v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Crd => print_crds(),
        Commands::Run(run_args) => run_operator(run_args).await,
    }
}

fn print_crds() -> Result<(), Error> {
    let validator = serde_yaml::to_string(&Validator::crd())
        .map_err(|e| Error::ConfigError(format!("Failed to render Validator CRD: {}", e)))?;
    let terrad_node = serde_yaml::to_string(&TerradNode::crd())
        .map_err(|e| Error::ConfigError(format!("Failed to render TerradNode CRD: {}", e)))?;

    println!("{}---\n{}", validator, terrad_node);
    Ok(())
}

/// Install the global subscriber; returns whether OpenTelemetry export is active
fn init_tracing(log_json: bool) -> bool {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let (text_layer, json_layer) = if log_json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true)), None)
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer);

    // Only enable OTEL if an endpoint is provided
    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_err() {
        registry.init();
        info!("OpenTelemetry tracing disabled (OTEL_EXPORTER_OTLP_ENDPOINT not set)");
        return false;
    }

    match telemetry::init_telemetry(&registry) {
        Ok(otel_layer) => {
            registry.with(otel_layer).init();
            info!("OpenTelemetry tracing initialized");
            true
        }
        Err(e) => {
            registry.init();
            warn!("OpenTelemetry tracing unavailable: {}", e);
            false
        }
    }
}

async fn run_operator(args: RunArgs) -> Result<(), Error> {
    let otel_enabled = init_tracing(args.log_json);

    info!("Starting Terra Operator v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Kubernetes client
    let client = kube::Client::try_default().await?;

    info!("Connected to Kubernetes cluster");

    // Create shared controller state
    let state = Arc::new(controller::ControllerState::new(client, args.namespace));

    // Start the REST API server (always running if feature enabled)
    #[cfg(feature = "rest-api")]
    {
        let api_state = state.clone();
        let port = args.api_port;
        tokio::spawn(async move {
            if let Err(e) = terra_operator::rest_api::run_server(api_state, port).await {
                tracing::error!("REST API server error: {:?}", e);
            }
        });
    }

    // Run the main controller loop
    let result = controller::run_controller(state).await;

    // Flush any remaining traces
    if otel_enabled {
        telemetry::shutdown_telemetry();
    }

    result
}
