use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use shroud_utils::logging::OpenTelemetry;
use tracing::info;

mod commands;
mod fixture;

use commands::QueryCommand;
use fixture::SimulationFixture;

const ENV_FIXTURE: &str = "SHROUD_SIMULATOR_FIXTURE";
const ENV_ENABLE_OTEL: &str = "SHROUD_SIMULATOR_ENABLE_OTEL";

// CLI
// ================================================================================================

/// Answers private state oracle queries against a simulation fixture.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file describing the pinned block data, local store and public state.
    ///
    /// Values can be overridden with `SHROUD_` prefixed environment variables, using `__` to
    /// separate nested keys.
    #[arg(long, env = ENV_FIXTURE, value_name = "FILE")]
    pub fixture: PathBuf,

    /// Enables the exporting of traces for OpenTelemetry.
    ///
    /// This can be further configured using the standard `OTEL_EXPORTER_OTLP_*` environment
    /// variables.
    #[arg(long = "enable-otel", default_value_t = false, env = ENV_ENABLE_OTEL, value_name = "BOOL")]
    pub enable_otel: bool,

    #[command(subcommand)]
    pub query: QueryCommand,
}

// MAIN
// ================================================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Configure tracing with optional OpenTelemetry exporting support.
    let _otel_guard = shroud_utils::logging::setup_tracing(OpenTelemetry::from(cli.enable_otel))?;

    let (oracle, public_state) = SimulationFixture::load(&cli.fixture)?.into_parts();
    info!(
        fixture = %cli.fixture.display(),
        contract = %oracle.contract_address(),
        block_hash = %oracle.block_data().block_hash().to_hex(),
        public_state = public_state.is_some(),
        "Loaded simulation fixture"
    );

    match public_state {
        Some(public_state) => {
            cli.query.run(&oracle.with_public_state(Arc::new(public_state))).await
        },
        None => cli.query.run(&oracle).await,
    }
}
