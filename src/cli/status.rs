use crate::cli::Session;
use crate::error::{Result, ScanGoError};
use crate::fmt::{date_dmy, number};
use crate::settings::settings_path;
use crate::workbook::SourceKind;

pub fn run(session: &Session) -> Result<()> {
    println!("Settings:     {}", settings_path().display());
    println!("Export dir:   {}", session.export_dir().display());
    println!("As of:        {}", date_dmy(session.as_of));

    let path = match session.workbook_path() {
        Ok(p) => p,
        Err(ScanGoError::NoWorkbook) => {
            println!("Workbook:     (not set)");
            println!();
            println!("Run `scango load <path>` or pass --workbook.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    println!("Workbook:     {}", path.display());
    println!("Source:       {}", SourceKind::detect(&path)?.name());

    let (conn, summary) = session.open()?;
    let total: f64 = conn.query_row("SELECT COALESCE(SUM(total), 0) FROM sales", [], |r| r.get(0))?;

    println!();
    println!("Users:         {}", number(summary.users as i64));
    println!("Items:         {}", number(summary.items as i64));
    println!("Transactions:  {}", number(summary.transactions as i64));
    println!("Joined:        {}", number(summary.joined as i64));
    if summary.unmatched() > 0 {
        println!("Unmatched:     {}", number(summary.unmatched() as i64));
    }
    println!("Sales total:   {}", crate::fmt::money(total));
    Ok(())
}
