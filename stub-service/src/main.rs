use anyhow::Context;
use clap::Parser;
use detector::{SyntheticDetector, MAX_BOOKS};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use service::StubState;
use std::net::SocketAddr;
use std::sync::Arc;
use store::RecordStore;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod detector;
mod service;
mod store;

const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Parser)]
#[command(author, version, about = "Fake detection/statistics service for local viewer runs")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,
    /// Seed for the synthetic book counts
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Upper bound of the synthetic book count
    #[arg(
        long,
        default_value_t = 40,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_BOOKS))
    )]
    max_books: u32,
    /// Pre-populate one record per day for this many past days
    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u32).range(0..=MAX_HISTORY_DAYS)
    )]
    history: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("parsing bind address {}", args.bind))?;

    let store = RecordStore::new();
    if args.history > 0 {
        let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
        let inserted = store.seed_history(args.history, args.max_books, &mut rng);
        info!("seeded {} historical records", inserted);
    }
    let state = Arc::new(StubState {
        detector: SyntheticDetector::new(args.seed, args.max_books),
        store,
    });

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for the stub service")?;
    runtime.block_on(async move {
        let shutdown = async {
            if let Err(err) = signal::ctrl_c().await {
                log::error!("waiting for Ctrl+C failed: {}", err);
            }
        };
        let (bound, server) = warp::serve(service::routes(state))
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding stub service to {}", addr))?;
        info!("stub service listening on http://{} (Ctrl+C to stop)", bound);
        server.await;
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_limit_above_the_cap_is_rejected() {
        let args = Args::try_parse_from(["shelf-stub", "--max-books", "4294967295"]);
        assert!(args.is_err());
        let args = Args::try_parse_from(["shelf-stub", "--max-books", "10000"]).unwrap();
        assert_eq!(args.max_books, MAX_BOOKS);
    }

    #[test]
    fn history_is_bounded() {
        assert!(Args::try_parse_from(["shelf-stub", "--history", "100000"]).is_err());
        let args = Args::try_parse_from(["shelf-stub", "--history", "30"]).unwrap();
        assert_eq!(args.history, 30);
    }
}
