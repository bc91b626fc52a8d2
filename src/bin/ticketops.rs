use clap::{Parser, Subcommand};

use ticketops::{TenantKey, TicketOps};

#[derive(Parser)]
#[command(name = "ticketops", about = "Issue-tracker operations metrics CLI")]
struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the per-product metrics objects
    Metrics {
        /// Limit to one tenant: a | b | product-a | product-b
        #[arg(long)]
        tenant: Option<String>,
        /// Compact (non-pretty) JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Fetch only the trend series for one tenant
    Trend {
        /// Tenant: a | b | product-a | product-b
        #[arg(long)]
        tenant: String,
        /// Compact (non-pretty) JSON output
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let ops = TicketOps::from_env();

    match cli.command {
        Commands::Metrics { tenant, compact } => {
            let data = match tenant {
                Some(t) => vec![ops.product_metrics(t.parse::<TenantKey>()?).await],
                None => ops.all_metrics().await,
            };
            print_json(&data, compact)?;
        }
        Commands::Trend { tenant, compact } => {
            let series = ops.trend(tenant.parse::<TenantKey>()?).await;
            print_json(&*series, compact)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}
