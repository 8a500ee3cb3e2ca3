use std::sync::Arc;

use clap::Parser;
use tokio::runtime;

use proxylink::{
    argument::Cli,
    cache::{SystemClock, TtlCache, CACHE_TTL},
    fetch::{Fetcher, HyperClient},
    server::{AppState, Server},
    sources,
    uri::RandomCredentials,
    utils::logger::setup_logger,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    setup_logger(Some(log_level))?;

    runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async move {
            let fetcher = Fetcher::new(
                HyperClient::new(),
                TtlCache::new(CACHE_TTL),
                Arc::new(SystemClock),
                sources::sources(),
            );
            let state = Arc::new(AppState {
                fetcher,
                credentials: Box::new(RandomCredentials),
            });
            Server::new(&cli.host, cli.port).start(state).await
        })
}
