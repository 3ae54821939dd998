use crate::infra::{parse_date, resolve_window};
use chrono::{Local, NaiveDate};
use clap::Args;
use market_insights::analytics::Ga4Client;
use market_insights::clients::ClientDirectory;
use market_insights::config::AppConfig;
use market_insights::error::AppError;
use market_insights::report::{MarketReport, MarketReportBuilder};
use market_insights::telemetry;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Client name as tracked in GA4
    #[arg(long)]
    pub(crate) client: String,
    /// First day of the report (YYYY-MM-DD). Defaults to 28 days before the end.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Last day of the report (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

fn command_context() -> Result<(AppConfig, ClientDirectory), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let directory = ClientDirectory::load(config.roster.path.as_deref())?;
    Ok((config, directory))
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let (config, directory) = command_context()?;

    let start = args.start_date.map(|date| date.to_string());
    let end = args.end_date.map(|date| date.to_string());
    let window = resolve_window(
        start.as_deref(),
        end.as_deref(),
        Local::now().date_naive(),
    )?;

    let gateway = Ga4Client::connect(&config.analytics).await?;
    let organization = directory.organization(&args.client);
    let report = MarketReportBuilder::new(gateway)
        .build(organization, window)
        .await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        print!("{}", render_market_report(&report));
    }

    Ok(())
}

pub(crate) fn run_clients() -> Result<(), AppError> {
    let (_, directory) = command_context()?;

    if directory.clients().is_empty() {
        println!("No clients configured (set MARKET_CLIENTS_PATH)");
        return Ok(());
    }

    for client in directory.clients() {
        match &client.website {
            Some(site) => println!("- {} ({}) {}", client.name, client.display_name, site),
            None => println!("- {} ({})", client.name, client.display_name),
        }
    }
    Ok(())
}

pub(crate) fn render_market_report(report: &MarketReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    out.push_str(&format!(
        "Market report: {}\n",
        report.organization.display_name
    ));
    out.push_str(&format!(
        "Period: {} - {}\n",
        report.date_range.start_label, report.date_range.end_label
    ));
    out.push_str(&format!(
        "Map loads: {} | Lot clicks: {} | CTR: {:.1}%\n",
        summary.total_map_loads, summary.total_lot_clicks, summary.overall_ctr
    ));

    if report.communities.is_empty() {
        out.push_str("\nCommunities: none\n");
    } else {
        out.push_str("\nCommunities\n");
        for community in &report.communities {
            out.push_str(&format!(
                "- {}: {} loads, {} clicks, {:.1}% CTR\n",
                community.name, community.map_loads, community.lot_clicks, community.ctr
            ));
        }
    }

    if report.top_lots.is_empty() {
        out.push_str("\nTop lots: none\n");
    } else {
        out.push_str("\nTop lots\n");
        for lot in &report.top_lots {
            out.push_str(&format!(
                "{}. {} - {} clicks ({:.2}%)\n",
                lot.rank, lot.lot, lot.clicks, lot.share
            ));
        }
    }

    if !report.insights.is_empty() {
        out.push_str("\nInsights\n");
        for insight in &report.insights {
            out.push_str(&format!(
                "- [{}] {}: {}\n",
                insight.kind.label(),
                insight.title,
                insight.description
            ));
        }
    }

    out
}
