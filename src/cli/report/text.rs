use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rusqlite::Connection;

use crate::analytics::{self, month_label, AgePoint, CategoryBreakdown, ItemTotal, Kpis, MonthlyGender, SalesTable};
use crate::error::Result;
use crate::filter::SalesFilter;
use crate::fmt::{bar, date_dmy, money, number, percent, quantity, whole_money};
use crate::models::SALE_COLUMNS;

const BAR_WIDTH: usize = 30;

fn right(s: impl Into<String>) -> Cell {
    Cell::new(s.into()).set_alignment(CellAlignment::Right)
}

// ---------------------------------------------------------------------------
// Data-fetching wrapper
// ---------------------------------------------------------------------------

pub fn summary(
    conn: &Connection,
    filter: &SalesFilter,
    category: Option<&str>,
    top_limit: usize,
) -> Result<String> {
    let data = analytics::get_summary(conn, filter, category, top_limit)?;
    Ok([
        format_kpis(&data.kpis),
        format_categories(&data.categories),
        format_monthly(&data.monthly),
        format_top_items(&data.top_items),
        format_age_spend(&data.age_spend),
    ]
    .join("\n\n"))
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_kpis(kpis: &Kpis) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total Sales"), right(whole_money(kpis.total_sales))]);
    table.add_row(vec![
        Cell::new("Avg Sale"),
        right(kpis.avg_sale.map(money).unwrap_or_else(|| "-".to_string())),
    ]);
    table.add_row(vec![Cell::new("Total transactions"), right(number(kpis.transactions))]);
    format!("{}\n{table}", "Key Figures".bold())
}

pub fn format_table(data: &SalesTable) -> String {
    if data.rows.is_empty() {
        return "No sales match the current filters.".to_string();
    }
    let mut table = Table::new();
    table.set_header(SALE_COLUMNS.to_vec());
    for r in &data.rows {
        table.add_row(vec![
            Cell::new(&r.full_name),
            right(r.age.to_string()),
            Cell::new(&r.gender),
            Cell::new(&r.item_name),
            Cell::new(&r.category),
            Cell::new(&r.item_tags),
            Cell::new(&r.season),
            Cell::new(&r.printing),
            right(money(r.price)),
            right(quantity(r.amount)),
            Cell::new(date_dmy(r.order_date)),
            right(money(r.total)),
        ]);
    }
    let mut footer = vec![Cell::new(format!("{} rows", number(data.count as i64)).bold())];
    footer.extend((0..SALE_COLUMNS.len() - 2).map(|_| Cell::new("")));
    footer.push(right(money(data.total)));
    table.add_row(footer);
    format!("{}\n{table}", "Sales".bold())
}

pub fn format_categories(data: &CategoryBreakdown) -> String {
    let max = data.slices.iter().map(|s| s.total).fold(0.0, f64::max);
    let mut table = Table::new();
    let first = if data.selected.is_some() { "Item" } else { "Category" };
    table.set_header(vec![first, "Total", "%", ""]);
    for s in &data.slices {
        table.add_row(vec![
            Cell::new(&s.label),
            right(money(s.total)),
            right(percent(s.pct)),
            Cell::new(bar(s.total, max, BAR_WIDTH)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        right(money(data.total)),
        Cell::new(""),
        Cell::new(""),
    ]);
    format!("{}\n{table}", data.title().bold())
}

pub fn format_monthly(data: &MonthlyGender) -> String {
    let mut table = Table::new();
    let mut header = vec!["Month".to_string()];
    header.extend(data.series.iter().map(|s| s.gender.clone()));
    table.set_header(header);
    for (i, month) in data.months.iter().enumerate() {
        let mut row = vec![Cell::new(month_label(*month))];
        for s in &data.series {
            row.push(right(money(s.totals.get(i).copied().unwrap_or(0.0))));
        }
        table.add_row(row);
    }
    format!("{}\n{table}", "Sales by Month and Gender".bold())
}

/// Best seller first.
pub fn format_top_items(items: &[ItemTotal]) -> String {
    let max = items.iter().map(|i| i.total).fold(0.0, f64::max);
    let mut table = Table::new();
    table.set_header(vec!["Item", "Total", ""]);
    for item in items.iter().rev() {
        table.add_row(vec![
            Cell::new(&item.item_name),
            right(whole_money(item.total as i64)),
            Cell::new(bar(item.total, max, BAR_WIDTH)),
        ]);
    }
    format!("{}\n{table}", format!("Top {} Items", items.len()).bold())
}

pub fn format_age_spend(points: &[AgePoint]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Age", "Gender", "Total"]);
    for p in points {
        table.add_row(vec![
            right(p.age.to_string()),
            Cell::new(&p.gender),
            right(money(p.total)),
        ]);
    }
    format!("{}\n{table}", "Age vs. Spend".bold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{get_category_breakdown, get_kpis, get_monthly_gender, get_sales, get_top_items};
    use crate::db::testutil::sample_db;

    fn all() -> SalesFilter {
        SalesFilter::default()
    }

    #[test]
    fn test_format_kpis() {
        let conn = sample_db();
        let out = format_kpis(&get_kpis(&conn, &all()).unwrap());
        assert!(out.contains("$2,090"));
        assert!(out.contains("$209.00"));
        assert!(out.contains("Total transactions"));
    }

    #[test]
    fn test_format_kpis_without_sales() {
        let kpis = Kpis {
            total_sales: 0,
            avg_sale: None,
            transactions: 0,
        };
        let out = format_kpis(&kpis);
        assert!(out.contains("$0"));
        assert!(out.contains('-'));
    }

    #[test]
    fn test_format_table() {
        let conn = sample_db();
        let out = format_table(&get_sales(&conn, &all()).unwrap());
        assert!(out.contains("full_name"));
        assert!(out.contains("15/01/2023"));
        assert!(out.contains("10 rows"));
        assert!(out.contains("$2,090.00"));
    }

    #[test]
    fn test_format_empty_table() {
        let empty = SalesTable {
            rows: vec![],
            total: 0.0,
            count: 0,
        };
        assert_eq!(format_table(&empty), "No sales match the current filters.");
    }

    #[test]
    fn test_format_categories() {
        let conn = sample_db();
        let out = format_categories(&get_category_breakdown(&conn, &all(), None).unwrap());
        assert!(out.contains("Sales by Category"));
        assert!(out.contains("coats"));
        assert!(out.contains("38.3%"));
        let coats = out.find("coats").unwrap();
        let dresses = out.find("dresses").unwrap();
        assert!(coats < dresses);
    }

    #[test]
    fn test_format_monthly() {
        let conn = sample_db();
        let out = format_monthly(&get_monthly_gender(&conn, &all()).unwrap());
        assert!(out.contains("Jan"));
        assert!(out.contains("male"));
        assert!(out.contains("$250.00"));
    }

    #[test]
    fn test_format_top_items_best_first() {
        let conn = sample_db();
        let out = format_top_items(&get_top_items(&conn, &all(), 10).unwrap());
        let denim = out.find("Denim Jacket").unwrap();
        let tee = out.find("Basic Tee").unwrap();
        assert!(denim < tee);
        assert!(out.contains("$500"));
    }
}
