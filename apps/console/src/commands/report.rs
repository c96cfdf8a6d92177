//! # Report Commands
//!
//! Builds reports from the database (typed rows) or from a JSON file of
//! loosely shaped rows, and exports them.
//!
//! ## Report Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  report daily-sales --format pdf                                        │
//! │       │                                                                 │
//! │       ├── authorize_screen(Reports)      (preview: every role)          │
//! │       ├── period: --from/--to, else ReportKind::default_period(today)   │
//! │       ├── repository rows ──► From<row> ──► Report                      │
//! │       │                                                                 │
//! │       ├── preview printed (table, summary, optional chart)              │
//! │       │                                                                 │
//! │       └── export: authorize(GenerateReports)                            │
//! │                   cafe_reports::serialize ──► file (atomic)             │
//! │                   no rows / zero amounts ──► NO_DATA, nothing written   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, info};

use cafe_core::report::{CustomerReportRow, InventoryRow, SalesReportRow, TopProductRow};
use cafe_core::{Action, Report, ReportKind, ReportRows, Screen};
use cafe_db::Database;
use cafe_reports::{ExportFormat, ExportOptions};

use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, SessionState};

/// Row limit for the ranked kinds when none is given.
pub const DEFAULT_LIMIT: u32 = 10;

/// Date range requested on the command line. Missing ends fall back to
/// the kind's default period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodArgs {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PeriodArgs {
    /// The inclusive range to query, or `None` for "all time".
    pub fn resolve(
        &self,
        kind: ReportKind,
        today: NaiveDate,
    ) -> ApiResult<Option<(NaiveDate, NaiveDate)>> {
        let default = kind.default_period(today);
        let range = match (self.from, self.to) {
            (None, None) => default,
            (Some(from), None) => Some((from, today)),
            (None, Some(to)) => {
                let from = default.map_or(NaiveDate::default(), |(from, _)| from.min(to));
                Some((from, to))
            }
            (Some(from), Some(to)) => Some((from, to)),
        };

        if let Some((from, to)) = range {
            if from > to {
                return Err(ApiError::validation("--from must not be after --to"));
            }
        }
        Ok(range)
    }
}

/// Builds `kind` from the database.
///
/// ## Sources
/// | Kind               | Rows from                                  |
/// |--------------------|--------------------------------------------|
/// | daily / monthly    | `sales().list_between(period)`             |
/// | top-products       | `sales().top_products(period, limit)`      |
/// | inventory          | `products().list_all()`                    |
/// | frequent-customers | `customers().frequent(limit)`              |
pub async fn build_report(
    db: &Database,
    session: &SessionState,
    kind: ReportKind,
    period: PeriodArgs,
    limit: u32,
    today: NaiveDate,
) -> ApiResult<Report> {
    session.authorize_screen(Screen::Reports)?;
    let range = period.resolve(kind, today)?;
    debug!(kind = %kind, ?range, limit, "Building report");

    let rows = match kind {
        ReportKind::DailySales | ReportKind::MonthlySales => {
            let (from, to) = range.unwrap_or((today, today));
            let sales = db.sales().list_between(from, to).await?;
            ReportRows::Sales(sales.into_iter().map(SalesReportRow::from).collect())
        }
        ReportKind::TopProducts => {
            let rows = db.sales().top_products(range, limit).await?;
            ReportRows::TopProducts(rows.into_iter().map(TopProductRow::from).collect())
        }
        ReportKind::Inventory => {
            let products = db.products().list_all().await?;
            ReportRows::Inventory(products.into_iter().map(InventoryRow::from).collect())
        }
        ReportKind::FrequentCustomers => {
            let rows = db.customers().frequent(limit).await?;
            ReportRows::Customers(rows.into_iter().map(CustomerReportRow::from).collect())
        }
    };

    Ok(Report::new(kind, rows))
}

/// Builds `kind` from a JSON file holding an array of rows (arrays or
/// objects, mixed freely).
pub fn normalize_file(session: &SessionState, kind: ReportKind, input: &Path) -> ApiResult<Report> {
    session.authorize_screen(Screen::Reports)?;

    let text = std::fs::read_to_string(input).map_err(|e| {
        ApiError::validation(format!("Cannot read {}: {}", input.display(), e))
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        ApiError::validation(format!("{} is not valid JSON: {}", input.display(), e))
    })?;
    let Value::Array(raw_rows) = value else {
        return Err(ApiError::validation(format!(
            "{} must contain a JSON array of rows",
            input.display()
        )));
    };

    debug!(kind = %kind, rows = raw_rows.len(), "Normalizing rows from file");
    Ok(Report::from_raw(kind, &raw_rows))
}

/// Currency from config, business name from settings.
pub async fn export_options(db: &Database, config: &ConfigState) -> ApiResult<ExportOptions> {
    let business_name = db
        .settings()
        .get("business_name")
        .await?
        .filter(|name| !name.trim().is_empty());

    Ok(ExportOptions {
        currency_symbol: config.currency_symbol.clone(),
        business_name,
        generated_at: Local::now(),
    })
}

/// Where `export` writes when `--out` is not given.
pub fn output_path(
    config: &ConfigState,
    kind: ReportKind,
    format: ExportFormat,
    out: Option<PathBuf>,
    options: &ExportOptions,
) -> PathBuf {
    out.unwrap_or_else(|| {
        cafe_reports::default_path(&config.export_dir, kind, format, options.generated_at)
    })
}

/// Writes `report` to `path`.
pub fn export(
    session: &SessionState,
    report: &Report,
    format: ExportFormat,
    path: &Path,
    options: &ExportOptions,
) -> ApiResult<PathBuf> {
    let session = session.authorize(Action::GenerateReports)?;
    let written = cafe_reports::serialize(report, format, path, options)?;
    info!(kind = %report.kind, path = %written.display(), by = %session.username, "Report saved");
    Ok(written)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{build_cart, commit_sale, ItemArg};
    use crate::commands::test_support::{as_role, db, product};
    use crate::error::ErrorCode;
    use cafe_core::{ReportSummary, Role};
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_resolution() {
        let today = day(2024, 3, 18);
        let none = PeriodArgs::default();

        assert_eq!(
            none.resolve(ReportKind::DailySales, today).unwrap(),
            Some((today, today))
        );
        assert_eq!(
            none.resolve(ReportKind::MonthlySales, today).unwrap(),
            Some((day(2024, 3, 1), today))
        );
        assert_eq!(none.resolve(ReportKind::TopProducts, today).unwrap(), None);

        let from = PeriodArgs {
            from: Some(day(2024, 1, 1)),
            to: None,
        };
        assert_eq!(
            from.resolve(ReportKind::Inventory, today).unwrap(),
            Some((day(2024, 1, 1), today))
        );

        let reversed = PeriodArgs {
            from: Some(day(2024, 3, 10)),
            to: Some(day(2024, 3, 1)),
        };
        assert!(reversed.resolve(ReportKind::DailySales, today).is_err());
    }

    #[tokio::test]
    async fn test_reports_from_database() {
        let db = db().await;
        let seller = as_role(&db, Role::Salesperson).await;
        let latte = product(&db, "Latte", 350, 10).await;
        product(&db, "Mocha", 400, 1).await;

        let items = [ItemArg {
            product_id: latte.id,
            quantity: "3".to_string(),
        }];
        let mut cart = build_cart(&db, &seller, &items, &[]).await.unwrap();
        commit_sale(&db, &seller, &mut cart, "Ana").await.unwrap();

        let today = Utc::now().date_naive();
        let daily = build_report(&db, &seller, ReportKind::DailySales, PeriodArgs::default(), DEFAULT_LIMIT, today)
            .await
            .unwrap();
        assert!(daily.has_data());
        assert_eq!(
            daily.summary(),
            ReportSummary::Sales {
                count: 1,
                total: cafe_core::Money::from_cents(1050)
            }
        );

        let inventory = build_report(&db, &seller, ReportKind::Inventory, PeriodArgs::default(), DEFAULT_LIMIT, today)
            .await
            .unwrap();
        assert_eq!(inventory.row_flags(), vec![None, Some("LOW STOCK")]);

        let customers = build_report(
            &db,
            &seller,
            ReportKind::FrequentCustomers,
            PeriodArgs::default(),
            DEFAULT_LIMIT,
            today,
        )
        .await
        .unwrap();
        assert_eq!(customers.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_export_needs_permission_and_data() {
        let db = db().await;
        let seller = as_role(&db, Role::Salesperson).await;
        let admin = as_role(&db, Role::Admin).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        let options = ExportOptions::default();

        let today = Utc::now().date_naive();
        let empty = build_report(&db, &admin, ReportKind::Inventory, PeriodArgs::default(), DEFAULT_LIMIT, today)
            .await
            .unwrap();
        let err = export(&admin, &empty, ExportFormat::Csv, &path, &options).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoData);
        assert!(!path.exists());

        product(&db, "Latte", 350, 10).await;
        let report = build_report(&db, &admin, ReportKind::Inventory, PeriodArgs::default(), DEFAULT_LIMIT, today)
            .await
            .unwrap();

        let err = export(&seller, &report, ExportFormat::Csv, &path, &options).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(!path.exists());

        let written = export(&admin, &report, ExportFormat::Csv, &path, &options).unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_normalize_file() {
        let db = db().await;
        let clerk = as_role(&db, Role::InventoryClerk).await;
        let dir = tempfile::tempdir().unwrap();

        let input = dir.path().join("rows.json");
        std::fs::write(
            &input,
            r#"[["Latte", "7", "21.00"], {"product": "Mocha", "qty": 2, "total": "S/ 8,00"}]"#,
        )
        .unwrap();
        let report = normalize_file(&clerk, ReportKind::TopProducts, &input).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(
            report.summary(),
            ReportSummary::TopProducts {
                products: 2,
                quantity: 9,
                revenue: cafe_core::Money::from_cents(2900)
            }
        );

        let not_array = dir.path().join("object.json");
        std::fs::write(&not_array, r#"{"rows": []}"#).unwrap();
        let err = normalize_file(&clerk, ReportKind::TopProducts, &not_array).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = normalize_file(&clerk, ReportKind::TopProducts, &dir.path().join("missing.json"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_output_path_defaults_to_export_dir() {
        let mut config = ConfigState::default();
        config.export_dir = PathBuf::from("exports");
        let options = ExportOptions::default();
        let path = output_path(&config, ReportKind::Inventory, ExportFormat::Xlsx, None, &options);
        assert!(path.starts_with("exports"));
        assert_eq!(path.extension().unwrap(), "xlsx");

        let given = output_path(
            &config,
            ReportKind::Inventory,
            ExportFormat::Xlsx,
            Some(PathBuf::from("mine.xlsx")),
            &options,
        );
        assert_eq!(given, PathBuf::from("mine.xlsx"));
    }
}
