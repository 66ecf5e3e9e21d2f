use bet_etf_core::errors::CoreError;
use bet_etf_core::models::settings::Settings;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "bet-etf")]
#[command(about = "BET index collector and ETF allocation dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the index constituents and write the symbols data file
    Collect {
        /// Number of constituents to collect
        #[arg(short, long)]
        size: Option<usize>,
        /// Output file (default: symbols-data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep collecting at a fixed interval
        #[arg(short, long)]
        watch: bool,
        /// Seconds between runs in watch mode
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Start the dashboard web server
    Serve {
        /// Port to listen on (default: 8050)
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        data: DataArgs,
        /// Also run the collector in-process every SECS seconds
        #[arg(long, value_name = "SECS")]
        collect_every: Option<u64>,
    },
    /// Print an allocation for the stored symbols
    Allocate {
        /// Cash amount to invest (zero or negative buys nothing)
        #[arg(short, long, allow_negative_numbers = true)]
        amount: f64,
        #[command(flatten)]
        data: DataArgs,
        /// Transaction fee in percent (order plan only)
        #[arg(short, long)]
        fee: Option<f64>,
        /// Plan fee-aware orders instead of a plain proportional split
        #[arg(long)]
        orders: bool,
    },
}

#[derive(Args)]
pub struct DataArgs {
    /// Symbols data file (default: symbols-data.json)
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// Number of symbols to use
    #[arg(short, long)]
    pub size: Option<usize>,
}

impl DataArgs {
    fn apply(self, settings: &mut Settings) {
        if let Some(data) = self.data {
            settings.data_file = data;
        }
        if let Some(size) = self.size {
            settings.symbols_list_size = size;
        }
    }
}

pub async fn run() -> Result<(), CoreError> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;

    match cli.command {
        Commands::Collect {
            size,
            output,
            watch,
            interval,
        } => {
            if let Some(size) = size {
                settings.symbols_list_size = size;
            }
            if let Some(output) = output {
                settings.data_file = output;
            }
            if let Some(interval) = interval {
                settings.collect_interval_secs = interval;
            }
            settings.validate()?;
            commands::collect::run(&settings, watch).await
        }
        Commands::Serve {
            port,
            data,
            collect_every,
        } => {
            if let Some(port) = port {
                settings.port = port;
            }
            data.apply(&mut settings);
            settings.validate()?;
            commands::serve::run(settings, collect_every).await
        }
        Commands::Allocate {
            amount,
            data,
            fee,
            orders,
        } => {
            data.apply(&mut settings);
            if let Some(fee) = fee {
                settings.transaction_fee = fee;
            }
            settings.validate()?;
            commands::allocate::run(settings, amount, orders).await
        }
    }
}
