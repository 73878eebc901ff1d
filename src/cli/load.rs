use std::path::PathBuf;

use chrono::NaiveDate;

use crate::db::open_dataset;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

/// Check that `path` loads, then remember it as the default workbook.
pub fn run(path: &str, as_of: NaiveDate) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let (_, summary) = open_dataset(&resolved, as_of)?;

    let mut settings = load_settings();
    settings.workbook = Some(resolved.to_string_lossy().to_string());
    save_settings(&settings)?;

    println!("Using {}", resolved.display());
    println!(
        "{} users, {} items, {} transactions ({} joined)",
        summary.users, summary.items, summary.transactions, summary.joined
    );
    Ok(())
}
