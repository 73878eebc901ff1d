use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::analytics::get_sales;
use crate::cli::{FilterArgs, Session};
use crate::error::Result;
use crate::filter::SalesFilter;

fn default_path(dir: &Path) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("sales-{date}.csv"))
}

/// Write the filtered sales table as CSV. Returns the number of rows written.
pub fn write_csv(conn: &Connection, filter: &SalesFilter, path: &Path) -> Result<usize> {
    let table = get_sales(conn, filter)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for row in &table.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = table.count, "Exported sales");
    Ok(table.count)
}

/// Export with the default file name under `dir` unless `output` is given.
pub fn export_to(conn: &Connection, filter: &SalesFilter, output: Option<&str>, dir: &Path) -> Result<PathBuf> {
    let path = output.map(PathBuf::from).unwrap_or_else(|| default_path(dir));
    write_csv(conn, filter, &path)?;
    Ok(path)
}

pub fn run(session: &Session, filters: &FilterArgs, output: Option<&str>) -> Result<()> {
    let filter = filters.to_filter()?;
    let (conn, _) = session.open()?;
    let path = export_to(&conn, &filter, output, &session.export_dir())?;
    println!("Wrote {}", path.display());
    Ok(())
}
