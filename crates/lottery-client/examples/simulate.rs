//! Secret luck simulation against a live indexer
//!
//! ```bash
//! cargo run --example simulate -- <indexer-url> <chain-id> <secret-hex> [draws]
//! ```

use lottery_client::{simulate, IndexerConfig, NetworkContext, DEFAULT_DRAWS};
use lottery_core::bigint::parse_secret_hex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lottery_client=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://localhost:8080/v1".into());
    let chain: u64 = args.next().as_deref().unwrap_or("8453").parse()?;
    let secret = parse_secret_hex(
        &args
            .next()
            .ok_or("usage: simulate <indexer-url> <chain-id> <secret-hex> [draws]")?,
    )?;
    let draws: usize = args.next().as_deref().unwrap_or("").parse().unwrap_or(DEFAULT_DRAWS);

    let ctx = NetworkContext::new(chain, IndexerConfig::new(base_url))?;
    let stats = simulate(&ctx, secret, draws).await?;

    println!("{:>5} {:>12} {:>12} {:>12} {:>10}", "power", "cost", "reward", "profit", "luck %");
    for s in stats {
        println!(
            "{:>5} {:>12} {:>12} {:>12} {:>9.2}%",
            s.power, s.cost_units, s.reward_units, s.profit_units, s.luck_pct
        );
    }
    Ok(())
}
