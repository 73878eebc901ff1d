use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

use crate::error::Result;
use crate::filter::SalesFilter;
use crate::models::SaleRow;

/// Label of the category selector entry that shows every category.
pub const ALL_CATEGORIES: &str = "All Categories";
pub const DEFAULT_TOP_ITEMS: usize = 10;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

fn parse_iso(idx: usize, text: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn query_pairs<T, F>(conn: &Connection, sql: &str, params: &[Value], map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    tracing::trace!(sql, "Running sales query");
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), map)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Filtered table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SalesTable {
    pub rows: Vec<SaleRow>,
    pub total: f64,
    pub count: usize,
}

pub fn get_sales(conn: &Connection, filter: &SalesFilter) -> Result<SalesTable> {
    let (clause, params) = filter.where_clause();
    let sql = format!(
        "SELECT full_name, age, gender, item_name, category, item_tags, season, printing, \
                price, amount, order_date, total \
         FROM sales WHERE {clause} ORDER BY order_date, id"
    );
    let rows = query_pairs(conn, &sql, &params, |row| {
        Ok(SaleRow {
            full_name: row.get(0)?,
            age: row.get(1)?,
            gender: row.get(2)?,
            item_name: row.get(3)?,
            category: row.get(4)?,
            item_tags: row.get(5)?,
            season: row.get(6)?,
            printing: row.get(7)?,
            price: row.get(8)?,
            amount: row.get(9)?,
            order_date: parse_iso(10, row.get(10)?)?,
            total: row.get(11)?,
        })
    })?;
    let total = rows.iter().map(|r| r.total).sum();
    let count = rows.len();
    Ok(SalesTable { rows, total, count })
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    /// Whole units; the fraction is dropped.
    pub total_sales: i64,
    /// Rounded half to even at one decimal. None when nothing matches.
    pub avg_sale: Option<f64>,
    pub transactions: i64,
}

pub fn get_kpis(conn: &Connection, filter: &SalesFilter) -> Result<Kpis> {
    let (clause, params) = filter.where_clause();
    let sql = format!("SELECT COALESCE(SUM(total), 0), AVG(total), COUNT(*) FROM sales WHERE {clause}");
    let (sum, avg, count): (f64, Option<f64>, i64) = conn.query_row(
        &sql,
        params_from_iter(params.iter()),
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    Ok(Kpis {
        total_sales: sum.trunc() as i64,
        avg_sale: avg.map(|a| (a * 10.0).round_ties_even() / 10.0),
        transactions: count,
    })
}

// ---------------------------------------------------------------------------
// Category share
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub total: f64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// None for the all-categories view, else the drilled-into category.
    pub selected: Option<String>,
    pub slices: Vec<Slice>,
    pub total: f64,
}

impl CategoryBreakdown {
    pub fn title(&self) -> String {
        match &self.selected {
            Some(category) => format!("Items in {category}"),
            None => "Sales by Category".to_string(),
        }
    }
}

/// Σ total by category, or by item within `selected` when a category is picked.
pub fn get_category_breakdown(
    conn: &Connection,
    filter: &SalesFilter,
    selected: Option<&str>,
) -> Result<CategoryBreakdown> {
    let selected = selected.filter(|s| *s != ALL_CATEGORIES);
    let (clause, mut params) = filter.where_clause();
    let sql = match selected {
        Some(category) => {
            params.push(Value::Text(category.to_string()));
            let n = params.len();
            format!(
                "SELECT item_name, SUM(total) AS sum FROM sales \
                 WHERE {clause} AND category = ?{n} \
                 GROUP BY item_name ORDER BY sum DESC, item_name"
            )
        }
        None => format!(
            "SELECT category, SUM(total) AS sum FROM sales WHERE {clause} \
             GROUP BY category ORDER BY sum DESC, category"
        ),
    };
    let raw: Vec<(String, f64)> = query_pairs(conn, &sql, &params, |row| Ok((row.get(0)?, row.get(1)?)))?;

    let total: f64 = raw.iter().map(|(_, t)| t).sum();
    let slices = raw
        .into_iter()
        .map(|(label, t)| Slice {
            label,
            total: t,
            pct: if total != 0.0 { t / total * 100.0 } else { 0.0 },
        })
        .collect();

    Ok(CategoryBreakdown {
        selected: selected.map(str::to_string),
        slices,
        total,
    })
}

/// Options of the category selector: "All Categories" then the categories
/// present in the filtered rows.
pub fn category_choices(conn: &Connection, filter: &SalesFilter) -> Result<Vec<String>> {
    let (clause, params) = filter.where_clause();
    let sql = format!("SELECT DISTINCT category FROM sales WHERE {clause} ORDER BY category");
    let mut choices = vec![ALL_CATEGORIES.to_string()];
    choices.extend(query_pairs(conn, &sql, &params, |row| row.get::<_, String>(0))?);
    Ok(choices)
}

// ---------------------------------------------------------------------------
// Monthly totals by gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderSeries {
    pub gender: String,
    /// One total per entry of `MonthlyGender::months`.
    pub totals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyGender {
    /// Months (1-12) with at least one sale, ascending.
    pub months: Vec<u32>,
    pub series: Vec<GenderSeries>,
}

fn gender_rank(gender: &str) -> u8 {
    match gender {
        "male" => 0,
        "female" => 1,
        _ => 2,
    }
}

pub fn get_monthly_gender(conn: &Connection, filter: &SalesFilter) -> Result<MonthlyGender> {
    let (clause, params) = filter.where_clause();
    let sql = format!(
        "SELECT month, gender, SUM(total) FROM sales WHERE {clause} \
         GROUP BY month, gender ORDER BY month, gender"
    );
    let raw: Vec<(u32, String, f64)> =
        query_pairs(conn, &sql, &params, |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

    let mut months: Vec<u32> = raw.iter().map(|(m, _, _)| *m).collect();
    months.dedup();
    let mut genders: Vec<String> = raw.iter().map(|(_, g, _)| g.clone()).collect();
    genders.sort_by(|a, b| gender_rank(a).cmp(&gender_rank(b)).then_with(|| a.cmp(b)));
    genders.dedup();

    let series = genders
        .into_iter()
        .map(|gender| {
            let totals = months
                .iter()
                .map(|m| {
                    raw.iter()
                        .find(|(rm, rg, _)| rm == m && *rg == gender)
                        .map_or(0.0, |(_, _, t)| *t)
                })
                .collect();
            GenderSeries { gender, totals }
        })
        .collect();

    Ok(MonthlyGender { months, series })
}

// ---------------------------------------------------------------------------
// Top items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTotal {
    pub item_name: String,
    /// Rounded to whole units, ties to even.
    pub total: f64,
}

/// The `limit` best-selling items, smallest first.
pub fn get_top_items(conn: &Connection, filter: &SalesFilter, limit: usize) -> Result<Vec<ItemTotal>> {
    let (clause, mut params) = filter.where_clause();
    params.push(Value::Integer(limit as i64));
    let n = params.len();
    let sql = format!(
        "SELECT item_name, SUM(total) AS sum FROM sales WHERE {clause} \
         GROUP BY item_name ORDER BY sum DESC, item_name LIMIT ?{n}"
    );
    let mut items = query_pairs(conn, &sql, &params, |row| {
        Ok(ItemTotal {
            item_name: row.get(0)?,
            total: row.get::<_, f64>(1)?.round_ties_even(),
        })
    })?;
    items.reverse();
    Ok(items)
}

// ---------------------------------------------------------------------------
// Age vs. spend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgePoint {
    pub age: u32,
    pub gender: String,
    pub total: f64,
}

pub fn get_age_spend(conn: &Connection, filter: &SalesFilter) -> Result<Vec<AgePoint>> {
    let (clause, params) = filter.where_clause();
    let sql = format!(
        "SELECT age, gender, SUM(total) FROM sales WHERE {clause} \
         GROUP BY age, gender ORDER BY age, gender"
    );
    query_pairs(conn, &sql, &params, |row| {
        Ok(AgePoint {
            age: row.get(0)?,
            gender: row.get(1)?,
            total: row.get(2)?,
        })
    })
}

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// Everything the sidebar offers, taken from the unfiltered join.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub clients: Vec<String>,
    pub items: Vec<String>,
    pub printings: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
    pub item_tags: Vec<String>,
    pub seasons: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
}

fn distinct(conn: &Connection, column: &str) -> Result<Vec<String>> {
    let sql = format!("SELECT DISTINCT {column} FROM sales ORDER BY {column}");
    query_pairs(conn, &sql, &[], |row| row.get(0))
}

pub fn get_facets(conn: &Connection) -> Result<Facets> {
    let (min_date, max_date, min_age, max_age): (Option<String>, Option<String>, Option<u32>, Option<u32>) =
        conn.query_row(
            "SELECT MIN(order_date), MAX(order_date), MIN(age), MAX(age) FROM sales",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
    let min_date = min_date.map(|d| parse_iso(0, d)).transpose()?;
    let max_date = max_date.map(|d| parse_iso(1, d)).transpose()?;

    Ok(Facets {
        clients: distinct(conn, "full_name")?,
        items: distinct(conn, "item_name")?,
        printings: distinct(conn, "printing")?,
        categories: distinct(conn, "category")?,
        genders: distinct(conn, "gender")?,
        item_tags: distinct(conn, "item_tags")?,
        seasons: distinct(conn, "season")?,
        min_date,
        max_date,
        min_age,
        max_age,
    })
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Every dashboard figure for one filter.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub filter: String,
    pub kpis: Kpis,
    pub categories: CategoryBreakdown,
    pub monthly: MonthlyGender,
    pub top_items: Vec<ItemTotal>,
    pub age_spend: Vec<AgePoint>,
}

pub fn get_summary(
    conn: &Connection,
    filter: &SalesFilter,
    category: Option<&str>,
    top_limit: usize,
) -> Result<Summary> {
    Ok(Summary {
        filter: filter.describe(),
        kpis: get_kpis(conn, filter)?,
        categories: get_category_breakdown(conn, filter, category)?,
        monthly: get_monthly_gender(conn, filter)?,
        top_items: get_top_items(conn, filter, top_limit)?,
        age_spend: get_age_spend(conn, filter)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testutil::sample_db;
    use crate::filter::{ItemTagChecks, SeasonChecks};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn all() -> SalesFilter {
        SalesFilter::default()
    }

    #[test]
    fn test_sales_table_order_and_totals() {
        let conn = sample_db();
        let table = get_sales(&conn, &all()).unwrap();
        assert_eq!(table.count, 10);
        assert_eq!(table.total, 2090.0);
        assert_eq!(table.rows[0].full_name, "Dana Levi");
        assert_eq!(table.rows[0].order_date, ymd(2023, 1, 15));
        assert_eq!(table.rows[9].order_date, ymd(2023, 6, 30));
        for row in &table.rows {
            assert_eq!(row.total, row.amount * row.price);
        }
    }

    #[test]
    fn test_kpis() {
        let conn = sample_db();
        let kpis = get_kpis(&conn, &all()).unwrap();
        assert_eq!(kpis.total_sales, 2090);
        assert_eq!(kpis.avg_sale, Some(209.0));
        assert_eq!(kpis.transactions, 10);
    }

    #[test]
    fn test_kpis_average_ties_round_to_even() {
        let mut dataset = crate::db::testutil::sample_dataset();
        for item in dataset.items.iter_mut().filter(|i| i.item_name == "Basic Tee") {
            item.price = 0.75;
        }
        let mut conn = crate::db::open_in_memory().unwrap();
        crate::db::load_dataset(&mut conn, &dataset).unwrap();

        // 1.5 + 3.0 over two sales
        let filter = SalesFilter {
            items: vec!["Basic Tee".into()],
            ..Default::default()
        };
        let kpis = get_kpis(&conn, &filter).unwrap();
        assert_eq!(kpis.transactions, 2);
        assert_eq!(kpis.total_sales, 4);
        assert_eq!(kpis.avg_sale, Some(2.2));
    }

    #[test]
    fn test_kpis_empty_selection() {
        let conn = sample_db();
        let filter = SalesFilter {
            seasons: SeasonChecks { fall_winter: false, spring_summer: false },
            ..Default::default()
        };
        let kpis = get_kpis(&conn, &filter).unwrap();
        assert_eq!(kpis.total_sales, 0);
        assert_eq!(kpis.avg_sale, None);
        assert_eq!(kpis.transactions, 0);
    }

    #[test]
    fn test_kpis_round_average() {
        let conn = sample_db();
        // 120 + 300 + 150 over three sales
        let filter = SalesFilter {
            clients: vec!["Dana Levi".into()],
            ..Default::default()
        };
        let kpis = get_kpis(&conn, &filter).unwrap();
        assert_eq!(kpis.total_sales, 570);
        assert_eq!(kpis.avg_sale, Some(190.0));

        let filter = SalesFilter {
            clients: vec!["Avi Cohen".into(), "Yossi Peretz".into()],
            items: vec!["Denim Jacket".into(), "Basic Tee".into()],
            ..Default::default()
        };
        let kpis = get_kpis(&conn, &filter).unwrap();
        // 250 + 160 + 250
        assert_eq!(kpis.transactions, 3);
        assert_eq!(kpis.avg_sale, Some(220.0));
    }

    #[test]
    fn test_category_breakdown_all() {
        let conn = sample_db();
        let b = get_category_breakdown(&conn, &all(), None).unwrap();
        assert_eq!(b.selected, None);
        let labels: Vec<(&str, f64)> = b.slices.iter().map(|s| (s.label.as_str(), s.total)).collect();
        assert_eq!(
            labels,
            vec![("coats", 800.0), ("shirts", 480.0), ("sweaters", 450.0), ("dresses", 360.0)]
        );
        assert_eq!(b.total, 2090.0);
        let pct: f64 = b.slices.iter().map(|s| s.pct).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(b.title(), "Sales by Category");
    }

    #[test]
    fn test_category_breakdown_all_categories_label_is_no_selection() {
        let conn = sample_db();
        let a = get_category_breakdown(&conn, &all(), Some(ALL_CATEGORIES)).unwrap();
        let b = get_category_breakdown(&conn, &all(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_category_drill_down() {
        let conn = sample_db();
        let b = get_category_breakdown(&conn, &all(), Some("coats")).unwrap();
        assert_eq!(b.selected.as_deref(), Some("coats"));
        let labels: Vec<(&str, f64)> = b.slices.iter().map(|s| (s.label.as_str(), s.total)).collect();
        assert_eq!(labels, vec![("Denim Jacket", 500.0), ("Wool Coat", 300.0)]);
        assert_eq!(b.title(), "Items in coats");
    }

    #[test]
    fn test_category_drill_down_respects_filter() {
        let conn = sample_db();
        let filter = SalesFilter {
            item_tags: ItemTagChecks { male: false, female: true },
            ..Default::default()
        };
        let b = get_category_breakdown(&conn, &filter, Some("coats")).unwrap();
        assert_eq!(b.slices.len(), 1);
        assert_eq!(b.slices[0].label, "Wool Coat");
        assert_eq!(b.total, 300.0);
    }

    #[test]
    fn test_category_choices() {
        let conn = sample_db();
        let filter = SalesFilter {
            seasons: SeasonChecks { fall_winter: true, spring_summer: false },
            ..Default::default()
        };
        assert_eq!(
            category_choices(&conn, &filter).unwrap(),
            vec![ALL_CATEGORIES, "coats", "sweaters"]
        );
    }

    #[test]
    fn test_monthly_gender() {
        let conn = sample_db();
        let m = get_monthly_gender(&conn, &all()).unwrap();
        assert_eq!(m.months, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(m.series.len(), 2);
        assert_eq!(m.series[0].gender, "male");
        assert_eq!(m.series[0].totals, vec![250.0, 240.0, 160.0, 0.0, 250.0, 240.0]);
        assert_eq!(m.series[1].gender, "female");
        assert_eq!(m.series[1].totals, vec![120.0, 80.0, 300.0, 300.0, 150.0, 0.0]);
        let sum: f64 = m.series.iter().flat_map(|s| s.totals.iter()).sum();
        assert_eq!(sum, 2090.0);
    }

    #[test]
    fn test_gender_order_puts_other_values_last() {
        let mut genders = vec!["other", "female", "male", "nonbinary"];
        genders.sort_by(|a, b| gender_rank(a).cmp(&gender_rank(b)).then_with(|| a.cmp(b)));
        assert_eq!(genders, vec!["male", "female", "nonbinary", "other"]);
    }

    #[test]
    fn test_top_items_ascending() {
        let conn = sample_db();
        let items = get_top_items(&conn, &all(), DEFAULT_TOP_ITEMS).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Striped Shirt", "Basic Tee", "Wool Coat", "Floral Dress", "Knit Sweater", "Denim Jacket"]
        );
        assert_eq!(items.last().unwrap().total, 500.0);
    }

    #[test]
    fn test_top_items_limit() {
        let conn = sample_db();
        let items = get_top_items(&conn, &all(), 2).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(names, vec!["Knit Sweater", "Denim Jacket"]);
    }

    #[test]
    fn test_top_items_round_half_to_even() {
        let mut conn = crate::db::open_in_memory().unwrap();
        let mut dataset = crate::db::testutil::sample_dataset();
        dataset.items[0].price = 0.5;
        dataset.items[4].price = 1.5;
        crate::db::load_dataset(&mut conn, &dataset).unwrap();
        let filter = SalesFilter {
            categories: vec!["shirts".into()],
            clients: vec!["Yossi Peretz".into(), "Noa Mizrahi".into()],
            ..Default::default()
        };
        // Basic Tee 2 x 0.5 = 1.0, Striped Shirt 3 x 1.5 = 4.5
        let items = get_top_items(&conn, &filter, 10).unwrap();
        assert_eq!(items[0].item_name, "Basic Tee");
        assert_eq!(items[0].total, 1.0);
        assert_eq!(items[1].item_name, "Striped Shirt");
        assert_eq!(items[1].total, 4.0);
    }

    #[test]
    fn test_age_spend() {
        let conn = sample_db();
        let points = get_age_spend(&conn, &all()).unwrap();
        let flat: Vec<(u32, &str, f64)> =
            points.iter().map(|p| (p.age, p.gender.as_str(), p.total)).collect();
        assert_eq!(
            flat,
            vec![
                (22, "female", 380.0),
                (33, "female", 570.0),
                (38, "male", 650.0),
                (45, "male", 490.0),
            ]
        );
    }

    #[test]
    fn test_facets() {
        let conn = sample_db();
        let f = get_facets(&conn).unwrap();
        assert_eq!(f.clients, vec!["Avi Cohen", "Dana Levi", "Noa Mizrahi", "Yossi Peretz"]);
        assert_eq!(f.categories, vec!["coats", "dresses", "shirts", "sweaters"]);
        assert_eq!(f.printings, vec!["floral", "knitted", "plain", "striped"]);
        assert_eq!(f.item_tags, vec!["female", "male"]);
        assert_eq!(f.seasons, vec!["fall/winter", "spring/summer"]);
        assert_eq!(f.min_date, Some(ymd(2023, 1, 15)));
        assert_eq!(f.max_date, Some(ymd(2023, 6, 30)));
        assert_eq!(f.min_age, Some(22));
        assert_eq!(f.max_age, Some(45));
    }

    #[test]
    fn test_facets_empty_database() {
        let conn = crate::db::open_in_memory().unwrap();
        let f = get_facets(&conn).unwrap();
        assert_eq!(f, Facets::default());
    }

    #[test]
    fn test_chart_aggregates_match_kpi_total() {
        let conn = sample_db();
        let filter = SalesFilter {
            start_date: Some(ymd(2023, 2, 1)),
            max_age: Some(40),
            ..Default::default()
        };
        let summary = get_summary(&conn, &filter, None, 10).unwrap();
        let total = get_sales(&conn, &filter).unwrap().total;
        assert_eq!(summary.kpis.total_sales, total.trunc() as i64);
        assert_eq!(summary.categories.total, total);
        let age_sum: f64 = summary.age_spend.iter().map(|p| p.total).sum();
        assert_eq!(age_sum, total);
        let monthly_sum: f64 = summary.monthly.series.iter().flat_map(|s| s.totals.iter()).sum();
        assert_eq!(monthly_sum, total);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "?");
    }
}
