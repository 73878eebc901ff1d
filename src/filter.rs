// Sidebar selection and the query it compiles to.
//
// All criteria are AND-combined. Multi-selects restrict only when something
// is selected; checkbox groups always restrict to their checked values.

use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::Serialize;

use crate::error::{Result, ScanGoError};
use crate::models::SaleRow;

pub const TAG_MALE: &str = "male";
pub const TAG_FEMALE: &str = "female";
pub const SEASON_FALL_WINTER: &str = "fall/winter";
pub const SEASON_SPRING_SUMMER: &str = "spring/summer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemTagChecks {
    pub male: bool,
    pub female: bool,
}

impl Default for ItemTagChecks {
    fn default() -> Self {
        Self {
            male: true,
            female: true,
        }
    }
}

impl ItemTagChecks {
    pub fn values(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.male {
            tags.push(TAG_MALE);
        }
        if self.female {
            tags.push(TAG_FEMALE);
        }
        tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonChecks {
    pub fall_winter: bool,
    pub spring_summer: bool,
}

impl Default for SeasonChecks {
    fn default() -> Self {
        Self {
            fall_winter: true,
            spring_summer: true,
        }
    }
}

impl SeasonChecks {
    pub fn values(&self) -> Vec<&'static str> {
        let mut seasons = Vec::new();
        if self.fall_winter {
            seasons.push(SEASON_FALL_WINTER);
        }
        if self.spring_summer {
            seasons.push(SEASON_SPRING_SUMMER);
        }
        seasons
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesFilter {
    /// Client full names (empty = all).
    pub clients: Vec<String>,
    /// Item names (empty = all).
    pub items: Vec<String>,
    /// Categories (empty = all).
    pub categories: Vec<String>,
    /// Printing / texture values (empty = all).
    pub printings: Vec<String>,
    pub item_tags: ItemTagChecks,
    pub seasons: SeasonChecks,
    /// Inclusive. None = no lower bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive. None = no upper bound.
    pub end_date: Option<NaiveDate>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
}

/// Accumulates `column op ?n` terms with their bound values.
struct ClauseBuilder {
    terms: Vec<String>,
    params: Vec<Value>,
    first: usize,
}

impl ClauseBuilder {
    fn new(first: usize) -> Self {
        Self {
            terms: Vec::new(),
            params: Vec::new(),
            first,
        }
    }

    fn placeholder(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.first + self.params.len() - 1)
    }

    fn any_of<S: AsRef<str>>(&mut self, column: &str, values: &[S]) {
        if values.is_empty() {
            self.terms.push("0".to_string());
            return;
        }
        let slots: Vec<String> = values
            .iter()
            .map(|v| self.placeholder(Value::Text(v.as_ref().to_string())))
            .collect();
        self.terms.push(format!("{column} IN ({})", slots.join(", ")));
    }

    fn compare(&mut self, column: &str, op: &str, value: Value) {
        let slot = self.placeholder(value);
        self.terms.push(format!("{column} {op} {slot}"));
    }

    fn finish(self) -> (String, Vec<Value>) {
        if self.terms.is_empty() {
            ("1".to_string(), self.params)
        } else {
            (self.terms.join(" AND "), self.params)
        }
    }
}

fn iso(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

impl SalesFilter {
    /// `WHERE` clause over the `sales` view with placeholders `?1..?n`.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        self.where_clause_from(1)
    }

    /// Same as [`where_clause`](Self::where_clause), numbering placeholders from `first`.
    pub fn where_clause_from(&self, first: usize) -> (String, Vec<Value>) {
        let mut b = ClauseBuilder::new(first);
        if !self.clients.is_empty() {
            b.any_of("full_name", &self.clients);
        }
        if !self.items.is_empty() {
            b.any_of("item_name", &self.items);
        }
        if !self.categories.is_empty() {
            b.any_of("category", &self.categories);
        }
        if !self.printings.is_empty() {
            b.any_of("printing", &self.printings);
        }
        b.any_of("item_tags", &self.item_tags.values());
        b.any_of("season", &self.seasons.values());
        if let Some(start) = self.start_date {
            b.compare("order_date", ">=", iso(start));
        }
        if let Some(end) = self.end_date {
            b.compare("order_date", "<=", iso(end));
        }
        if let Some(min) = self.min_age {
            b.compare("age", ">=", Value::Integer(min as i64));
        }
        if let Some(max) = self.max_age {
            b.compare("age", "<=", Value::Integer(max as i64));
        }
        let (clause, params) = b.finish();
        tracing::trace!(%clause, params = params.len(), "Built sales filter");
        (clause, params)
    }

    /// The predicate of [`where_clause`](Self::where_clause), evaluated in memory.
    pub fn matches(&self, row: &SaleRow) -> bool {
        fn selected(choice: &[String], value: &str) -> bool {
            choice.is_empty() || choice.iter().any(|c| c == value)
        }

        selected(&self.clients, &row.full_name)
            && selected(&self.items, &row.item_name)
            && selected(&self.categories, &row.category)
            && selected(&self.printings, &row.printing)
            && self.item_tags.values().contains(&row.item_tags.as_str())
            && self.seasons.values().contains(&row.season.as_str())
            && self.start_date.map_or(true, |d| row.order_date >= d)
            && self.end_date.map_or(true, |d| row.order_date <= d)
            && self.min_age.map_or(true, |a| row.age >= a)
            && self.max_age.map_or(true, |a| row.age <= a)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ScanGoError::InvalidFilter(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(ScanGoError::InvalidFilter(format!(
                    "minimum age {min} is above maximum age {max}"
                )));
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        let lists = [
            ("client", &self.clients),
            ("item", &self.items),
            ("category", &self.categories),
            ("printing", &self.printings),
        ];
        for (label, values) in lists {
            if !values.is_empty() {
                parts.push(format!("{label}: {}", values.join(" | ")));
            }
        }
        if self.item_tags != ItemTagChecks::default() {
            parts.push(format!("tags: {}", checked_or_none(&self.item_tags.values())));
        }
        if self.seasons != SeasonChecks::default() {
            parts.push(format!("seasons: {}", checked_or_none(&self.seasons.values())));
        }
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => parts.push(format!("{s} to {e}")),
            (Some(s), None) => parts.push(format!("from {s}")),
            (None, Some(e)) => parts.push(format!("until {e}")),
            (None, None) => {}
        }
        match (self.min_age, self.max_age) {
            (Some(lo), Some(hi)) => parts.push(format!("age {lo}-{hi}")),
            (Some(lo), None) => parts.push(format!("age {lo}+")),
            (None, Some(hi)) => parts.push(format!("age up to {hi}")),
            (None, None) => {}
        }
        if parts.is_empty() {
            "all sales".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn checked_or_none(values: &[&str]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}
