use crate::commands::{run_clients, run_report, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use market_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Market Insights",
    about = "Serve and print GA4 market reports for community map dashboards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build one market report and print it
    Report(ReportArgs),
    /// List the clients in the configured roster
    Clients,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Clients => run_clients(),
    }
}
