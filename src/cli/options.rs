use comfy_table::{Cell, Table};

use crate::analytics::{get_facets, Facets};
use crate::cli::{OutputFormat, Session};
use crate::error::Result;
use crate::fmt::date_dmy;

pub fn run(session: &Session, format: Option<OutputFormat>) -> Result<()> {
    let (conn, _) = session.open()?;
    let facets = get_facets(&conn)?;
    match format {
        Some(OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&facets)?),
        _ => println!("{}", format_facets(&facets)),
    }
    Ok(())
}

fn range<T: ToString>(lo: Option<T>, hi: Option<T>) -> String {
    match (lo, hi) {
        (Some(lo), Some(hi)) => format!("{} to {}", lo.to_string(), hi.to_string()),
        _ => "-".to_string(),
    }
}

pub fn format_facets(facets: &Facets) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Filter", "Flag", "Values"]);
    let lists = [
        ("Client name", "--client", &facets.clients),
        ("Specific item", "--item", &facets.items),
        ("Texture", "--printing", &facets.printings),
        ("Category", "--category-filter", &facets.categories),
        ("Item tag", "--no-<tag>", &facets.item_tags),
        ("Season", "--no-<season>", &facets.seasons),
    ];
    for (label, flag, values) in lists {
        table.add_row(vec![Cell::new(label), Cell::new(flag), Cell::new(values.join(", "))]);
    }
    table.add_row(vec![
        Cell::new("Order date"),
        Cell::new("--from / --to"),
        Cell::new(range(facets.min_date.map(date_dmy), facets.max_date.map(date_dmy))),
    ]);
    table.add_row(vec![
        Cell::new("Age"),
        Cell::new("--min-age / --max-age"),
        Cell::new(range(facets.min_age, facets.max_age)),
    ]);
    format!("Filter options\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testutil::sample_db;

    #[test]
    fn test_format_facets() {
        let facets = get_facets(&sample_db()).unwrap();
        let out = format_facets(&facets);
        assert!(out.contains("Avi Cohen, Dana Levi, Noa Mizrahi, Yossi Peretz"));
        assert!(out.contains("coats, dresses, shirts, sweaters"));
        assert!(out.contains("15/01/2023 to 30/06/2023"));
        assert!(out.contains("22 to 45"));
    }

    #[test]
    fn test_format_empty_facets() {
        let out = format_facets(&Facets::default());
        assert!(out.contains("Order date"));
    }
}
