//! HMS CLI - Command line tool for requesting HMS hydrology and meteorology data.

use clap::Parser;
use log::warn;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "hms-cli",
    version,
    about = "Hydrologic Micro Services (HMS) data request client"
)]
struct Cli {
    #[command(subcommand)]
    command: hms_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received ctrl+c, cancelling...");
            on_ctrl_c.cancel();
        }
    });

    match cancel
        .run_until_cancelled(hms_cmd::run(cli.command, cancel.clone()))
        .await
    {
        Some(result) => result,
        None => anyhow::bail!("cancelled before the HMS request finished"),
    }
}
