//! CLI for the church treasury core.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{classify, config, offerings, receipt, serve, validate};

/// Church treasury tools - classify comprovantes, issue receipts, run the HTTP functions
#[derive(Parser)]
#[command(name = "tesouraria")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a category and beneficiary for comprovante files
    Classify(classify::ClassifyArgs),

    /// Generate a receipt or reimbursement PDF offline
    Receipt(receipt::ReceiptArgs),

    /// Validate and format CPF/CNPJ numbers
    Validate(validate::ValidateArgs),

    /// Book a service's tithes and offerings as income entries
    Offerings(offerings::OfferingsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Run the HTTP functions
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Classify(args) => classify::run(args, config_path).await,
        Commands::Receipt(args) => receipt::run(args, config_path).await,
        Commands::Validate(args) => validate::run(args),
        Commands::Offerings(args) => offerings::run(args).await,
        Commands::Config(args) => config::run(args).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
    }
}
