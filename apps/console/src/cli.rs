//! # Command Line
//!
//! The `cafe` argument tree (clap derive).
//!
//! ```text
//! cafe [--db PATH] [--user NAME] [--password PW] [--json] <command>
//!
//!   init | whoami | screens | dashboard | audit
//!   product   list | search | show | add | edit | delete | stock | low-stock | categories
//!   customer  list | search | show | add | edit | delete | frequent
//!   sale      new | list | show | edit | delete
//!   report    <kind> [--from] [--to] [--limit] [--format] [--out] [--chart]
//!   report    normalize <kind> --input rows.json
//!   settings  list | get | set
//!   user      list | add | delete | passwd
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use cafe_core::{ReportKind, Role};
use cafe_reports::ExportFormat;

use crate::commands::sale::{parse_item, ItemArg};

/// Point of sale and inventory for a coffee shop.
#[derive(Parser, Debug)]
#[command(name = "cafe", version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file (overrides CAFE_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Username to sign in with
    #[arg(long, short = 'u', global = true, env = "CAFE_USER")]
    pub user: Option<String>,

    /// Password to sign in with
    #[arg(long, short = 'p', global = true, env = "CAFE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database, the admin account and default settings
    Init,
    /// Show the signed-in user
    Whoami,
    /// List the screens your role can open
    Screens,
    /// Today's sales, stock alerts and the last seven days
    Dashboard,
    /// Catalog and stock
    #[command(subcommand)]
    Product(ProductCommand),
    /// Registered customers
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Record and browse sales
    #[command(subcommand)]
    Sale(SaleCommand),
    /// Preview and export reports
    Report(ReportArgs),
    /// Business settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Staff accounts
    #[command(subcommand)]
    User(UserCommand),
    /// Recent audit log entries
    Audit {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

// =============================================================================
// Products
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// All products, or one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Products whose name or category contains QUERY
    Search { query: String },
    Show { id: i64 },
    Add {
        name: String,
        #[arg(long, default_value = "General")]
        category: String,
        /// Unit price, e.g. 3.50 or 3,50
        #[arg(long)]
        price: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        stock: i64,
        /// Low-stock threshold (default: the default_min_stock setting)
        #[arg(long, allow_negative_numbers = true)]
        min_stock: Option<i64>,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        stock: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        min_stock: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: i64 },
    /// Set the stock level (absolute)
    Stock {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        stock: i64,
    },
    /// Products at or below their minimum
    LowStock,
    Categories,
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    List,
    Search { query: String },
    Show { id: i64 },
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change fields; an empty --email or --phone clears it
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Delete { id: i64 },
    /// Customers with the most purchases
    Frequent {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    /// Build a cart and commit it as one sale
    New {
        /// Customer name (blank for a walk-in)
        #[arg(long, default_value = "")]
        customer: String,
        /// <product_id>:<quantity>, repeatable
        #[arg(long = "item", value_name = "ID:QTY", value_parser = item_arg, required = true)]
        items: Vec<ItemArg>,
        /// <product_id>:<quantity> to take off after the adds, repeatable
        #[arg(long = "remove", value_name = "ID:QTY", value_parser = item_arg)]
        removals: Vec<ItemArg>,
    },
    /// Recent sales, or sales between two days
    List {
        #[command(flatten)]
        period: PeriodFlags,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    Show { id: i64 },
    /// Correct the customer recorded on a sale
    Edit {
        id: i64,
        #[arg(long)]
        customer: String,
    },
    /// Delete a sale and its lines (stock is not restored)
    Delete { id: i64 },
}

fn item_arg(text: &str) -> Result<ItemArg, String> {
    parse_item(text).map_err(|e| e.message)
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: Option<ReportCommand>,

    /// daily-sales, monthly-sales, top-products, inventory, frequent-customers
    pub kind: Option<ReportKind>,

    #[command(flatten)]
    pub period: PeriodFlags,

    /// Rows for top-products and frequent-customers
    #[arg(long)]
    pub limit: Option<u32>,

    #[command(flatten)]
    pub output: OutputFlags,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Build a report from a JSON array of raw rows
    Normalize {
        kind: ReportKind,
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        #[command(flatten)]
        output: OutputFlags,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PeriodFlags {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputFlags {
    /// Export format (pdf, xlsx, csv); implied by --out's extension
    #[arg(long)]
    pub format: Option<ExportFormat>,
    /// Export file path
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Print a bar chart under the preview
    #[arg(long)]
    pub chart: bool,
}

impl OutputFlags {
    /// The format to export in, or `None` for preview only.
    pub fn export_format(&self) -> Option<ExportFormat> {
        match (self.format, &self.out) {
            (Some(format), _) => Some(format),
            (None, Some(out)) => Some(ExportFormat::from_path(out).unwrap_or(ExportFormat::Pdf)),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Settings & Users
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    List,
    Get { key: String },
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    Add {
        username: String,
        #[arg(long = "new-password", value_name = "PASSWORD")]
        new_password: String,
        /// Display name (default: the username)
        #[arg(long)]
        name: Option<String>,
        /// admin, salesperson or inventory-clerk
        #[arg(long)]
        role: Role,
    },
    Delete { username: String },
    /// Change a password (your own when USERNAME is omitted)
    Passwd {
        username: Option<String>,
        #[arg(long = "new-password", value_name = "PASSWORD")]
        new_password: String,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sale_new_items() {
        let cli = Cli::parse_from([
            "cafe", "-u", "ana", "-p", "pw", "sale", "new", "--customer", "Luis", "--item", "3:2",
            "--item", "5:1", "--remove", "3:1",
        ]);
        let Command::Sale(SaleCommand::New {
            customer,
            items,
            removals,
        }) = cli.command
        else {
            panic!("expected sale new");
        };
        assert_eq!(customer, "Luis");
        assert_eq!(items.len(), 2);
        assert_eq!(removals[0].product_id, 3);

        assert!(Cli::try_parse_from(["cafe", "sale", "new", "--item", "latte"]).is_err());
    }

    #[test]
    fn test_report_kind_or_normalize() {
        let cli = Cli::parse_from(["cafe", "report", "inventory", "--out", "stock.xlsx"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.kind, Some(ReportKind::Inventory));
        assert_eq!(args.output.export_format(), Some(ExportFormat::Xlsx));

        let cli = Cli::parse_from([
            "cafe", "report", "normalize", "top-products", "--input", "rows.json", "--format", "csv",
        ]);
        let Command::Report(ReportArgs {
            command: Some(ReportCommand::Normalize { kind, output, .. }),
            ..
        }) = cli.command
        else {
            panic!("expected report normalize");
        };
        assert_eq!(kind, ReportKind::TopProducts);
        assert_eq!(output.export_format(), Some(ExportFormat::Csv));
    }

    #[test]
    fn test_negative_stock_reaches_validation() {
        let cli = Cli::parse_from(["cafe", "product", "stock", "7", "-5"]);
        assert!(matches!(
            cli.command,
            Command::Product(ProductCommand::Stock { id: 7, stock: -5 })
        ));
    }
}
