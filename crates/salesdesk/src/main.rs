mod app;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, LogAction};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // stdout carries answers and exports; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let globals = &cli.globals;

    match cli.command {
        Commands::Ask { query } => commands::ask::run(globals, &query.join(" ")),
        Commands::Chat => commands::chat::run(globals),
        Commands::Insights { json } => commands::insights::run(globals, json),
        Commands::Search { query, k } => commands::search::run(globals, &query.join(" "), k),
        Commands::Log { action } => match action {
            Some(LogAction::Show) | None => commands::log::run_show(globals),
            Some(LogAction::Export { format, output }) => {
                commands::log::run_export(globals, format, output.as_deref())
            }
        },
        Commands::Status => commands::status::run(globals),
        Commands::Version => commands::version::run(),
    }
}
