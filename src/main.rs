use clap::{Parser, Subcommand};

mod cmd;
mod core;
mod display;
mod fx;
mod session;

/// Estimate Irish VRT, customs duty and VAT on cars imported from the UK
#[derive(Parser, Debug)]
#[command(name = "vrtc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the cost of importing a vehicle
    Estimate(cmd::estimate::EstimateCommand),
    /// Show the CO2 rate bands
    Bands(cmd::bands::BandsCommand),
    /// Show the GBP to EUR exchange rate
    Rate(cmd::rate::RateCommand),
    /// Check form values without calculating
    Validate(cmd::validate::ValidateCommand),
    /// Assess every vehicle in a CSV or JSON file
    Batch(cmd::batch::BatchCommand),
    /// Generate an HTML report and open it in the browser
    Html(cmd::html::HtmlCommand),
    /// Print the batch input format
    Schema(cmd::schema::SchemaCommand),
    /// Live estimate from field=value lines on stdin
    Watch(cmd::watch::WatchCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Estimate(estimate) => estimate.exec(),
        Command::Bands(bands) => bands.exec(),
        Command::Rate(rate) => rate.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Batch(batch) => batch.exec(),
        Command::Html(html) => html.exec(),
        Command::Schema(schema) => schema.exec(),
        Command::Watch(watch) => watch.exec(),
    }
}
