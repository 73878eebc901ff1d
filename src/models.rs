use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub full_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub item_id: i64,
    pub item_name: String,
    pub category: String,
    pub item_tags: String,
    pub season: String,
    pub printing: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: Option<i64>,
    pub user_id: i64,
    pub item_id: i64,
    pub amount: f64,
    pub order_date: NaiveDate,
}

/// The three sheets of a workbook, parsed but not yet joined.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub items: Vec<Item>,
    pub transactions: Vec<Transaction>,
}

/// One transaction joined with its user and item, projected to the
/// dashboard's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRow {
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub item_name: String,
    pub category: String,
    pub item_tags: String,
    pub season: String,
    pub printing: String,
    pub price: f64,
    pub amount: f64,
    pub order_date: NaiveDate,
    pub total: f64,
}

/// Column headers of the sales table, in display order.
pub const SALE_COLUMNS: &[&str] = &[
    "full_name",
    "age",
    "gender",
    "item_name",
    "category",
    "item_tags",
    "season",
    "printing",
    "price",
    "amount",
    "order_date",
    "total",
];
