mod analytics;
mod charts;
mod cli;
mod db;
mod error;
mod filter;
mod fmt;
mod logging;
mod models;
mod settings;
mod sidebar;
mod tui;
mod workbook;

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands, ReportCommands, Session};

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    logging::init(
        cli.debug,
        settings.log_level.as_deref(),
        settings.log_file.as_deref(),
    );
    let session = Session::new(cli.workbook, cli.as_of, settings);

    let result = match cli.command {
        None if std::io::stdout().is_terminal() => cli::dashboard::run(&session),
        None => cli::report::dispatch(&session, ReportCommands::default_summary()),
        Some(Commands::Dashboard) => cli::dashboard::run(&session),
        Some(Commands::Report { command }) => cli::report::dispatch(&session, command),
        Some(Commands::Export { filters, output }) => {
            cli::export::run(&session, &filters, output.as_deref())
        }
        Some(Commands::Options { format }) => cli::options::run(&session, format),
        Some(Commands::Load { path }) => cli::load::run(&path, session.as_of),
        Some(Commands::Status) => cli::status::run(&session),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "scango", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
