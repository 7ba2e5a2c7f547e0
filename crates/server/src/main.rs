mod api;
mod cli;
mod download;
mod pipeline;
mod router;
mod scratch;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::state::AppState;

fn load_config() -> cadbom_core::Config {
    cadbom_core::config::load_dotenv();
    cadbom_core::Config::from_env()
}

async fn serve(config: cadbom_core::Config) -> anyhow::Result<()> {
    config.log_summary();
    if !cadbom_geometry::kernel_available() {
        info!("Built without step-kernel: STEP conversion disabled, STL only");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config)?);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();
    let default_level = if config.debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await?,
        Command::Extract { path } => cli::extract(&path)?,
        Command::Convert {
            path,
            format,
            output,
        } => cli::convert(&path, format.as_deref(), output.as_deref())?,
    }

    Ok(())
}
