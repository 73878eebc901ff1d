pub mod text;
pub mod view;

use std::io::IsTerminal;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::analytics;
use crate::cli::{OutputFormat, ReportCommands, Session};
use crate::error::Result;
use crate::filter::SalesFilter;

pub fn dispatch(session: &Session, cmd: ReportCommands) -> Result<()> {
    let filter = cmd.filters().to_filter()?;
    let (conn, _) = session.open()?;
    let args = cmd.output_args();
    tracing::debug!(report = cmd.report_name(), filter = %filter.describe(), "Running report");

    let rendered = match args.format {
        Some(OutputFormat::Json) => dispatch_json(&conn, session, &cmd, &filter)?,
        Some(OutputFormat::Text) => dispatch_text(&conn, session, &cmd, &filter)?,
        None if args.output.is_some() || !std::io::stdout().is_terminal() => {
            dispatch_text(&conn, session, &cmd, &filter)?
        }
        None => {
            let mut view = view::build_view(&conn, session, &cmd, &filter)?;
            return crate::tui::run_report_view(view.as_mut());
        }
    };

    match &args.output {
        Some(path) => {
            let p = PathBuf::from(path);
            if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&p, format!("{rendered}\n"))?;
            println!("Wrote {}", p.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub(crate) fn dispatch_text(
    conn: &Connection,
    session: &Session,
    cmd: &ReportCommands,
    filter: &SalesFilter,
) -> Result<String> {
    let body = match cmd {
        ReportCommands::Summary { .. } => text::summary(conn, filter, cmd.category(), session.top_items(cmd.limit()))?,
        ReportCommands::Kpi { .. } => text::format_kpis(&analytics::get_kpis(conn, filter)?),
        ReportCommands::Table { .. } => text::format_table(&analytics::get_sales(conn, filter)?),
        ReportCommands::Categories { .. } => {
            text::format_categories(&analytics::get_category_breakdown(conn, filter, cmd.category())?)
        }
        ReportCommands::Monthly { .. } => text::format_monthly(&analytics::get_monthly_gender(conn, filter)?),
        ReportCommands::TopItems { .. } => {
            text::format_top_items(&analytics::get_top_items(conn, filter, session.top_items(cmd.limit()))?)
        }
        ReportCommands::AgeSpend { .. } => text::format_age_spend(&analytics::get_age_spend(conn, filter)?),
    };
    Ok(format!("Filter: {}\n{body}", filter.describe()))
}

pub(crate) fn dispatch_json(
    conn: &Connection,
    session: &Session,
    cmd: &ReportCommands,
    filter: &SalesFilter,
) -> Result<String> {
    let value = match cmd {
        ReportCommands::Summary { .. } => serde_json::to_value(analytics::get_summary(
            conn,
            filter,
            cmd.category(),
            session.top_items(cmd.limit()),
        )?)?,
        ReportCommands::Kpi { .. } => serde_json::to_value(analytics::get_kpis(conn, filter)?)?,
        ReportCommands::Table { .. } => serde_json::to_value(analytics::get_sales(conn, filter)?)?,
        ReportCommands::Categories { .. } => {
            serde_json::to_value(analytics::get_category_breakdown(conn, filter, cmd.category())?)?
        }
        ReportCommands::Monthly { .. } => serde_json::to_value(analytics::get_monthly_gender(conn, filter)?)?,
        ReportCommands::TopItems { .. } => serde_json::to_value(analytics::get_top_items(
            conn,
            filter,
            session.top_items(cmd.limit()),
        )?)?,
        ReportCommands::AgeSpend { .. } => serde_json::to_value(analytics::get_age_spend(conn, filter)?)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
