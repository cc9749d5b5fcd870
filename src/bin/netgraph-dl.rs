//! netgraph-dl CLI - Command-line interface for downloading network datasets.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[tokio::main(flavor = "current_thread")]
async fn main() -> netgraph_dl::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    netgraph_dl::cli::run().await
}
