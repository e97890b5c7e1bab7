use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "counter-cli")]
#[command(about = "Client for the counter service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service and store health
    Health,
    /// Show the static info payload
    Data,
    /// Increment the shared counter
    Hit {
        /// Total number of increments
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Increments in flight at once
        #[arg(short = 'j', long, default_value_t = 1)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Data => {
            let res = client.get(format!("{}/api/data", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Hit { count, concurrency } => {
            hit(&client, &cli.url, count, concurrency.max(1)).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Fire `count` increments in waves of `concurrency` and report whether every
/// returned value was distinct.
async fn hit(
    client: &reqwest::Client,
    base: &str,
    count: usize,
    concurrency: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = Arc::new(format!("{}/api/counter", base));
    let mut values = Vec::with_capacity(count);
    let mut failures = 0usize;

    let mut remaining = count;
    while remaining > 0 {
        let wave = remaining.min(concurrency);
        remaining -= wave;

        let calls = (0..wave).map(|_| {
            let client = client.clone();
            let url = url.clone();
            async move {
                let res = client.get(url.as_str()).send().await?;
                let status = res.status();
                let body: Value = res.json().await?;
                Ok::<_, reqwest::Error>((status, body))
            }
        });

        for outcome in join_all(calls).await {
            match outcome {
                Ok((status, body)) if status.is_success() => {
                    if let Some(v) = body["total_hits"].as_i64() {
                        values.push(v);
                    }
                }
                Ok((status, body)) => {
                    failures += 1;
                    eprintln!("Error: status {} {}", status, body);
                }
                Err(e) => {
                    failures += 1;
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    let distinct: HashSet<i64> = values.iter().copied().collect();
    let summary = serde_json::json!({
        "succeeded": values.len(),
        "failed": failures,
        "min": values.iter().min(),
        "max": values.iter().max(),
        "all_distinct": distinct.len() == values.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
