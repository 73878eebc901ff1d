use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ScanGoError};
use crate::models::{Dataset, Item, Transaction, User};

pub const USERS_SHEET: &str = "users";
pub const ITEMS_SHEET: &str = "items";
pub const TRANSACTIONS_SHEET: &str = "transactions";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// "Full Name" -> "full_name"
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

pub fn parse_date_mdy(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Parse the date spellings found in hand-maintained sheets: ISO dates with
/// an optional time part, and slash dates (month first, then day first).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.split(['T', ' ']).next().unwrap_or(raw);
    if head.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        return Some(d);
    }
    if head.contains('/') {
        return parse_date_mdy(head).or_else(|| parse_date_dmy(head));
    }
    None
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    if !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

/// Completed years between `birth` and `as_of`.
pub fn age_at(birth: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut years = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl Cell {
    fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => parse_number(s),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        let n = self.as_number()?;
        (n.fract() == 0.0).then_some(n as i64)
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(f) => excel_serial_to_date(*f),
            Cell::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// First row is the header; wholly empty rows are dropped.
    pub fn from_rows(name: impl Into<String>, raw: Vec<Vec<Cell>>) -> Self {
        let mut iter = raw.into_iter();
        let headers = iter
            .next()
            .map(|h| h.iter().map(|c| normalize_header(&c.display())).collect())
            .unwrap_or_default();
        let rows = iter
            .filter(|r| r.iter().any(|c| !c.is_empty()))
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| ScanGoError::MissingColumn {
            sheet: self.name.clone(),
            column: name.to_string(),
        })
    }

    fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(move |(i, cells)| Record {
            sheet: self,
            cells,
            // 1-based, after the header row
            line: i + 2,
        })
    }
}

struct Record<'a> {
    sheet: &'a Sheet,
    cells: &'a [Cell],
    line: usize,
}

static EMPTY: Cell = Cell::Empty;

impl Record<'_> {
    fn cell(&self, col: usize) -> &Cell {
        self.cells.get(col).unwrap_or(&EMPTY)
    }

    fn invalid(&self, col: usize) -> ScanGoError {
        ScanGoError::InvalidValue {
            sheet: self.sheet.name.clone(),
            row: self.line,
            column: self.sheet.headers.get(col).cloned().unwrap_or_default(),
            value: self.cell(col).display(),
        }
    }

    fn text(&self, col: usize) -> String {
        self.cell(col).display()
    }

    fn number(&self, col: usize) -> Result<f64> {
        self.cell(col).as_number().ok_or_else(|| self.invalid(col))
    }

    fn integer(&self, col: usize) -> Result<i64> {
        self.cell(col).as_integer().ok_or_else(|| self.invalid(col))
    }

    fn date(&self, col: usize) -> Result<NaiveDate> {
        self.cell(col).as_date().ok_or_else(|| self.invalid(col))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| ScanGoError::MissingSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Spreadsheet,
    CsvDirectory,
}

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

impl SourceKind {
    pub fn detect(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::CsvDirectory);
        }
        if !path.exists() {
            return Err(ScanGoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Spreadsheet)
        } else {
            Err(ScanGoError::UnsupportedSource(format!(
                "{} (expected a spreadsheet or a directory of CSV files)",
                path.display()
            )))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::CsvDirectory => "CSV directory",
        }
    }
}

/// Read every sheet of a workbook, or every `*.csv` file of a directory.
pub fn open(path: &Path) -> Result<Workbook> {
    let kind = SourceKind::detect(path)?;
    tracing::debug!(path = %path.display(), kind = kind.name(), "Opening data source");
    let workbook = match kind {
        SourceKind::Spreadsheet => read_spreadsheet(path)?,
        SourceKind::CsvDirectory => read_csv_dir(path)?,
    };
    tracing::debug!(sheets = ?workbook.sheet_names(), "Data source read");
    Ok(workbook)
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| ScanGoError::Workbook(format!("Failed to open {}: {e}", path.display())))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ScanGoError::Workbook(format!("Failed to read sheet '{name}': {e}")))?;
        let raw: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(from_calamine).collect())
            .collect();
        sheets.push(Sheet::from_rows(name, raw));
    }
    Ok(Workbook { sheets })
}

#[cfg(not(feature = "xlsx"))]
fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    Err(ScanGoError::UnsupportedSource(format!(
        "{}: spreadsheet support requires the 'xlsx' feature",
        path.display()
    )))
}

#[cfg(feature = "xlsx")]
fn from_calamine(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial)
                .map(Cell::Date)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => parse_date(s).map(Cell::Date).unwrap_or_else(|| Cell::text(s)),
        Data::DurationIso(s) => Cell::text(s),
        Data::Error(e) => {
            tracing::warn!(error = %e, "Spreadsheet cell holds an error value");
            Cell::Empty
        }
    }
}

fn read_csv_dir(dir: &Path) -> Result<Workbook> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut sheets = Vec::new();
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut raw = Vec::new();
        for result in rdr.records() {
            let record = result?;
            raw.push(record.iter().map(Cell::text).collect());
        }
        sheets.push(Sheet::from_rows(name, raw));
    }
    Ok(Workbook { sheets })
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

pub fn load_dataset(path: &Path, as_of: NaiveDate) -> Result<Dataset> {
    let workbook = open(path)?;
    dataset_from_workbook(&workbook, as_of)
}

pub fn dataset_from_workbook(workbook: &Workbook, as_of: NaiveDate) -> Result<Dataset> {
    let users = parse_users(workbook.sheet(USERS_SHEET)?, as_of)?;
    let items = parse_items(workbook.sheet(ITEMS_SHEET)?)?;
    let transactions = parse_transactions(workbook.sheet(TRANSACTIONS_SHEET)?)?;
    tracing::info!(
        users = users.len(),
        items = items.len(),
        transactions = transactions.len(),
        "Dataset parsed"
    );
    Ok(Dataset {
        users,
        items,
        transactions,
    })
}

enum NameColumns {
    Full(usize),
    Split(usize, usize),
}

fn parse_users(sheet: &Sheet, as_of: NaiveDate) -> Result<Vec<User>> {
    let idx_id = sheet.require("user_id")?;
    let idx_gender = sheet.require("gender")?;
    let name_cols = match (
        sheet.column("full_name"),
        sheet.column("first_name"),
        sheet.column("last_name"),
    ) {
        (Some(full), _, _) => NameColumns::Full(full),
        (None, Some(first), Some(last)) => NameColumns::Split(first, last),
        _ => sheet.require("full_name").map(NameColumns::Full)?,
    };
    let idx_age = sheet.column("age");
    let idx_birth = sheet.column("birth_date");
    if idx_age.is_none() && idx_birth.is_none() {
        sheet.require("birth_date")?;
    }

    let mut users = Vec::new();
    for rec in sheet.records() {
        let full_name = match name_cols {
            NameColumns::Full(col) => rec.text(col),
            NameColumns::Split(first, last) => {
                format!("{} {}", rec.text(first), rec.text(last)).trim().to_string()
            }
        };
        let birth_date = match idx_birth {
            Some(col) if !rec.cell(col).is_empty() => Some(rec.date(col)?),
            _ => None,
        };
        let age = match (idx_age, birth_date) {
            (Some(col), _) if !rec.cell(col).is_empty() => {
                let age = rec.integer(col)?;
                u32::try_from(age).map_err(|_| rec.invalid(col))?
            }
            (_, Some(birth)) => age_at(birth, as_of),
            (Some(col), None) => return Err(rec.invalid(col)),
            (None, None) => return Err(rec.invalid(idx_birth.unwrap_or(idx_id))),
        };
        users.push(User {
            user_id: rec.integer(idx_id)?,
            full_name,
            gender: rec.text(idx_gender),
            birth_date,
            age,
        });
    }
    Ok(users)
}

fn parse_items(sheet: &Sheet) -> Result<Vec<Item>> {
    let idx_id = sheet.require("item_id")?;
    let idx_name = sheet.require("item_name")?;
    let idx_category = sheet.require("category")?;
    let idx_tags = sheet.require("item_tags")?;
    let idx_season = sheet.require("season")?;
    let idx_printing = sheet.require("printing")?;
    let idx_price = sheet.require("price")?;

    sheet
        .records()
        .map(|rec| {
            Ok(Item {
                item_id: rec.integer(idx_id)?,
                item_name: rec.text(idx_name),
                category: rec.text(idx_category),
                item_tags: rec.text(idx_tags),
                season: rec.text(idx_season),
                printing: rec.text(idx_printing),
                price: rec.number(idx_price)?,
            })
        })
        .collect()
}

fn parse_transactions(sheet: &Sheet) -> Result<Vec<Transaction>> {
    let idx_txn = sheet.column("transaction_id");
    let idx_user = sheet.require("user_id")?;
    let idx_item = sheet.require("item_id")?;
    let idx_amount = sheet.require("amount")?;
    let idx_date = sheet.require("order_date")?;

    sheet
        .records()
        .map(|rec| {
            let transaction_id = match idx_txn {
                Some(col) if !rec.cell(col).is_empty() => Some(rec.integer(col)?),
                _ => None,
            };
            Ok(Transaction {
                transaction_id,
                user_id: rec.integer(idx_user)?,
                item_id: rec.integer(idx_item)?,
                amount: rec.number(idx_amount)?,
                order_date: rec.date(idx_date)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv_dir(users: &str, items: &str, transactions: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.csv"), users).unwrap();
        std::fs::write(dir.path().join("items.csv"), items).unwrap();
        std::fs::write(dir.path().join("transactions.csv"), transactions).unwrap();
        dir
    }

    const ITEMS: &str = "\
item_id,item_name,category,item_tags,season,printing,price
10,Basic Tee,shirts,male,spring/summer,plain,40
11,Floral Dress,dresses,female,spring/summer,floral,\"1,200.50\"
";

    const TRANSACTIONS: &str = "\
transaction_id,user_id,item_id,amount,order_date
1,1,11,1,2023-01-15
2,2,10,3,03/22/2023
";

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Full Name"), "full_name");
        assert_eq!(normalize_header("  ITEM-TAGS "), "item_tags");
        assert_eq!(normalize_header("order_date"), "order_date");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,234.56"), Some(1234.56));
        assert_eq!(parse_number("$40"), Some(40.0));
        assert_eq!(parse_number("(50.00)"), Some(-50.0));
        assert_eq!(parse_number("  7 "), Some(7.0));
        assert_eq!(parse_number("seven"), None);
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2023-01-15"), Some(ymd(2023, 1, 15)));
        assert_eq!(parse_date("2023-01-15 00:00:00"), Some(ymd(2023, 1, 15)));
        assert_eq!(parse_date("2023-01-15T08:30:00"), Some(ymd(2023, 1, 15)));
        assert_eq!(parse_date("03/22/2023"), Some(ymd(2023, 3, 22)));
        // month-first is impossible, so read it day-first
        assert_eq!(parse_date("22/03/2023"), Some(ymd(2023, 3, 22)));
        assert_eq!(parse_date("02/30/2025"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), Some(ymd(2025, 1, 10)));
        assert_eq!(excel_serial_to_date(44941.5), Some(ymd(2023, 1, 15)));
        assert_eq!(excel_serial_to_date(-3.0), None);
    }

    #[test]
    fn test_age_at() {
        let as_of = ymd(2024, 1, 1);
        assert_eq!(age_at(ymd(1990, 4, 12), as_of), 33);
        assert_eq!(age_at(ymd(1990, 1, 1), as_of), 34);
        assert_eq!(age_at(ymd(2030, 1, 1), as_of), 0);
    }

    #[test]
    fn test_sheet_from_rows_skips_blank_rows() {
        let sheet = Sheet::from_rows(
            "items",
            vec![
                vec![Cell::text("Item ID"), Cell::text("Price")],
                vec![Cell::Number(1.0), Cell::Number(9.5)],
                vec![Cell::Empty, Cell::Empty],
                vec![Cell::Number(2.0), Cell::text("3")],
            ],
        );
        assert_eq!(sheet.headers, vec!["item_id", "price"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.column("price"), Some(1));
    }

    #[test]
    fn test_load_csv_dir_with_birth_dates() {
        let dir = write_csv_dir(
            "user_id,full_name,gender,birth_date\n1,Dana Levi,female,1990-04-12\n2,Avi Cohen,male,11/03/1985\n",
            ITEMS,
            TRANSACTIONS,
        );
        let ds = load_dataset(dir.path(), ymd(2024, 1, 1)).unwrap();
        assert_eq!(ds.users.len(), 2);
        assert_eq!(ds.users[0].age, 33);
        assert_eq!(ds.users[1].birth_date, Some(ymd(1985, 11, 3)));
        assert_eq!(ds.users[1].age, 38);
        assert_eq!(ds.items[1].price, 1200.5);
        assert_eq!(ds.transactions.len(), 2);
        assert_eq!(ds.transactions[1].order_date, ymd(2023, 3, 22));
        assert_eq!(ds.transactions[1].amount, 3.0);
        assert_eq!(ds.transactions[0].transaction_id, Some(1));
    }

    #[test]
    fn test_split_names_and_explicit_age() {
        let dir = write_csv_dir(
            "User ID,First Name,Last Name,Gender,Age\n1,Dana,Levi,female,41\n",
            ITEMS,
            TRANSACTIONS,
        );
        let ds = load_dataset(dir.path(), ymd(2024, 1, 1)).unwrap();
        assert_eq!(ds.users[0].full_name, "Dana Levi");
        assert_eq!(ds.users[0].age, 41);
        assert!(ds.users[0].birth_date.is_none());
    }

    #[test]
    fn test_missing_sheet_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.csv"), "user_id,full_name,gender,age\n").unwrap();
        let err = load_dataset(dir.path(), ymd(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ScanGoError::MissingSheet(ref s) if s == "items"));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = write_csv_dir(
            "user_id,full_name,gender,birth_date\n1,Dana,female,1990-01-01\n",
            "item_id,item_name,category,item_tags,season,price\n10,Tee,shirts,male,spring/summer,40\n",
            TRANSACTIONS,
        );
        let err = load_dataset(dir.path(), ymd(2024, 1, 1)).unwrap_err();
        match err {
            ScanGoError::MissingColumn { sheet, column } => {
                assert_eq!(sheet, "items");
                assert_eq!(column, "printing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_value_names_row_and_column() {
        let dir = write_csv_dir(
            "user_id,full_name,gender,birth_date\n1,Dana,female,1990-01-01\n",
            ITEMS,
            "user_id,item_id,amount,order_date\n1,10,two,2023-01-01\n",
        );
        let err = load_dataset(dir.path(), ymd(2024, 1, 1)).unwrap_err();
        match err {
            ScanGoError::InvalidValue { sheet, row, column, value } => {
                assert_eq!(sheet, "transactions");
                assert_eq!(row, 2);
                assert_eq!(column, "amount");
                assert_eq!(value, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detect_rejects_unknown_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(matches!(
            SourceKind::detect(&path),
            Err(ScanGoError::UnsupportedSource(_))
        ));
        assert_eq!(SourceKind::detect(dir.path()).unwrap(), SourceKind::CsvDirectory);
        assert!(matches!(
            SourceKind::detect(&dir.path().join("missing.xlsx")),
            Err(ScanGoError::Io(_))
        ));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_xlsx_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/scan_and_go.xlsx");
        let wb = open(&path).unwrap();
        let mut names = wb.sheet_names();
        names.sort();
        assert_eq!(names, vec!["items", "transactions", "users"]);

        let ds = dataset_from_workbook(&wb, ymd(2024, 1, 1)).unwrap();
        assert_eq!(ds.users.len(), 4);
        assert_eq!(ds.items.len(), 6);
        assert_eq!(ds.transactions.len(), 11);
        assert_eq!(ds.users[0].full_name, "Dana Levi");
        assert_eq!(ds.users[0].birth_date, Some(ymd(1990, 4, 12)));
        assert_eq!(ds.transactions[0].order_date, ymd(2023, 1, 15));
        assert_eq!(ds.items[2].price, 300.0);
    }
}
