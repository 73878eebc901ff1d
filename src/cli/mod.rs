pub mod dashboard;
pub mod export;
pub mod load;
pub mod options;
pub mod report;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use crate::db::{self, LoadSummary};
use crate::error::{Result, ScanGoError};
use crate::filter::{ItemTagChecks, SalesFilter, SeasonChecks};
use crate::settings::{shellexpand_path, Settings};
use crate::workbook::parse_date;

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("expected a date like 2023-01-31, got {raw:?}"))
}

#[derive(Parser)]
#[command(
    name = "scango",
    version,
    about = "Sales dashboard for Scan & Go workbooks: filters, KPIs and charts in the terminal."
)]
pub struct Cli {
    /// Workbook (.xlsx/.xls/.ods) or directory with users/items/transactions CSV files
    #[arg(long, global = true, env = "SCANGO_WORKBOOK", value_name = "PATH")]
    pub workbook: Option<String>,

    /// Reference date for deriving ages from birth dates (default: today)
    #[arg(long = "as-of", global = true, value_name = "DATE", value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive dashboard with sidebar filters, KPIs and charts.
    Dashboard,
    /// Print dashboard data as text tables or JSON.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Write the filtered sales table to CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file (default: <export_dir>/sales-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// List the values each filter accepts.
    Options {
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Remember a workbook for later runs.
    Load {
        /// Workbook file or CSV directory
        path: String,
    },
    /// Show the configured workbook and what it contains.
    Status,
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportCommands {
    /// KPIs and every chart.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Drill into one category in the category share section
        #[arg(long)]
        category: Option<String>,
        /// Number of top items
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Total sales, average sale and transaction count.
    Kpi {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// The filtered sales table.
    Table {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Sales share per category, or per item within one category.
    Categories {
        #[command(flatten)]
        filters: FilterArgs,
        /// Drill into one category
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Monthly totals by gender.
    Monthly {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Best-selling items.
    TopItems {
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of items (default from settings, 10)
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
    /// Spend per age and gender.
    AgeSpend {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: ReportOutputArgs,
    },
}

impl ReportCommands {
    /// The report printed when no command is given and stdout is not a terminal.
    pub fn default_summary() -> Self {
        ReportCommands::Summary {
            filters: FilterArgs::default(),
            category: None,
            limit: None,
            output: ReportOutputArgs {
                format: Some(OutputFormat::Text),
                output: None,
            },
        }
    }

    pub fn report_name(&self) -> &'static str {
        match self {
            ReportCommands::Summary { .. } => "summary",
            ReportCommands::Kpi { .. } => "kpi",
            ReportCommands::Table { .. } => "table",
            ReportCommands::Categories { .. } => "categories",
            ReportCommands::Monthly { .. } => "monthly",
            ReportCommands::TopItems { .. } => "top-items",
            ReportCommands::AgeSpend { .. } => "age-spend",
        }
    }

    pub fn filters(&self) -> &FilterArgs {
        match self {
            ReportCommands::Summary { filters, .. }
            | ReportCommands::Kpi { filters, .. }
            | ReportCommands::Table { filters, .. }
            | ReportCommands::Categories { filters, .. }
            | ReportCommands::Monthly { filters, .. }
            | ReportCommands::TopItems { filters, .. }
            | ReportCommands::AgeSpend { filters, .. } => filters,
        }
    }

    pub fn output_args(&self) -> &ReportOutputArgs {
        match self {
            ReportCommands::Summary { output, .. }
            | ReportCommands::Kpi { output, .. }
            | ReportCommands::Table { output, .. }
            | ReportCommands::Categories { output, .. }
            | ReportCommands::Monthly { output, .. }
            | ReportCommands::TopItems { output, .. }
            | ReportCommands::AgeSpend { output, .. } => output,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            ReportCommands::Summary { category, .. } | ReportCommands::Categories { category, .. } => {
                category.as_deref()
            }
            _ => None,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            ReportCommands::Summary { limit, .. } | ReportCommands::TopItems { limit, .. } => *limit,
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportOutputArgs {
    /// Output format: text or json (default: interactive view on a terminal)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Write to a file instead of stdout
    #[arg(long)]
    pub output: Option<String>,
}

/// Sidebar filters as command-line flags.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Client full name (repeatable)
    #[arg(long = "client", value_name = "NAME")]
    pub clients: Vec<String>,
    /// Item name (repeatable)
    #[arg(long = "item", value_name = "NAME")]
    pub items: Vec<String>,
    /// Category (repeatable)
    #[arg(long = "category-filter", value_name = "NAME")]
    pub categories: Vec<String>,
    /// Printing / texture (repeatable)
    #[arg(long = "printing", value_name = "NAME")]
    pub printings: Vec<String>,
    /// Leave out items tagged male
    #[arg(long = "no-male")]
    pub no_male: bool,
    /// Leave out items tagged female
    #[arg(long = "no-female")]
    pub no_female: bool,
    /// Leave out fall/winter items
    #[arg(long = "no-fall-winter")]
    pub no_fall_winter: bool,
    /// Leave out spring/summer items
    #[arg(long = "no-spring-summer")]
    pub no_spring_summer: bool,
    /// First order date, inclusive
    #[arg(long = "from", value_name = "DATE", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,
    /// Last order date, inclusive
    #[arg(long = "to", value_name = "DATE", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
    #[arg(long = "min-age", value_name = "N")]
    pub min_age: Option<u32>,
    #[arg(long = "max-age", value_name = "N")]
    pub max_age: Option<u32>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<SalesFilter> {
        let filter = SalesFilter {
            clients: self.clients.clone(),
            items: self.items.clone(),
            categories: self.categories.clone(),
            printings: self.printings.clone(),
            item_tags: ItemTagChecks {
                male: !self.no_male,
                female: !self.no_female,
            },
            seasons: SeasonChecks {
                fall_winter: !self.no_fall_winter,
                spring_summer: !self.no_spring_summer,
            },
            start_date: self.from,
            end_date: self.to,
            min_age: self.min_age,
            max_age: self.max_age,
        };
        filter.validate()?;
        Ok(filter)
    }
}

/// Where the data comes from for this invocation, plus the user's settings.
pub struct Session {
    pub workbook: Option<String>,
    pub as_of: NaiveDate,
    pub settings: Settings,
}

impl Session {
    pub fn new(workbook: Option<String>, as_of: Option<NaiveDate>, settings: Settings) -> Self {
        Self {
            workbook,
            as_of: as_of.unwrap_or_else(|| chrono::Local::now().date_naive()),
            settings,
        }
    }

    /// `--workbook` / `SCANGO_WORKBOOK`, then the workbook remembered in settings.
    pub fn workbook_path(&self) -> Result<PathBuf> {
        self.workbook
            .as_deref()
            .or(self.settings.workbook.as_deref())
            .map(|p| PathBuf::from(shellexpand_path(p)))
            .ok_or(ScanGoError::NoWorkbook)
    }

    pub fn open(&self) -> Result<(Connection, LoadSummary)> {
        let path = self.workbook_path()?;
        tracing::info!(path = %path.display(), as_of = %self.as_of, "Opening workbook");
        db::open_dataset(&path, self.as_of)
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.settings.export_dir))
    }

    pub fn top_items(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.settings.top_items).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_map_to_filter() {
        let cli = Cli::parse_from([
            "scango",
            "report",
            "kpi",
            "--client",
            "Dana Levi",
            "--client",
            "Avi Cohen",
            "--no-female",
            "--from",
            "2023-02-01",
            "--max-age",
            "40",
        ]);
        let Some(Commands::Report { command }) = cli.command else {
            panic!("expected report command");
        };
        let filter = command.filters().to_filter().unwrap();
        assert_eq!(filter.clients, vec!["Dana Levi", "Avi Cohen"]);
        assert!(filter.item_tags.male);
        assert!(!filter.item_tags.female);
        assert!(filter.seasons.fall_winter && filter.seasons.spring_summer);
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(filter.max_age, Some(40));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let args = FilterArgs {
            min_age: Some(50),
            max_age: Some(20),
            ..Default::default()
        };
        assert!(matches!(args.to_filter(), Err(ScanGoError::InvalidFilter(_))));
    }

    #[test]
    fn test_bad_date_is_a_parse_error() {
        let parsed = Cli::try_parse_from(["scango", "export", "--from", "someday"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_workbook_after_subcommand() {
        let cli = Cli::parse_from(["scango", "status", "--workbook", "fixtures/shop"]);
        assert_eq!(cli.workbook.as_deref(), Some("fixtures/shop"));
    }

    #[test]
    fn test_workbook_resolution_order() {
        let settings = Settings {
            workbook: Some("/data/remembered.xlsx".into()),
            ..Default::default()
        };
        let session = Session::new(Some("/data/given.xlsx".into()), None, settings.clone());
        assert_eq!(session.workbook_path().unwrap(), PathBuf::from("/data/given.xlsx"));

        let session = Session::new(None, None, settings);
        assert_eq!(session.workbook_path().unwrap(), PathBuf::from("/data/remembered.xlsx"));

        let session = Session::new(None, None, Settings::default());
        assert!(matches!(session.workbook_path(), Err(ScanGoError::NoWorkbook)));
    }

    #[test]
    fn test_report_accessors() {
        let cmd = ReportCommands::default_summary();
        assert_eq!(cmd.report_name(), "summary");
        assert_eq!(cmd.output_args().format, Some(OutputFormat::Text));
        assert_eq!(cmd.category(), None);
        assert_eq!(cmd.limit(), None);
    }
}
