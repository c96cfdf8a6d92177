//! # Cafe Console Library
//!
//! The `cafe` command-line front end: argument parsing, startup, sign-in
//! and dispatch to the command modules.
//!
//! ## Module Organization
//! ```text
//! cafe_console/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap argument tree
//! ├── output.rs       ◄─── Text tables, charts, previews
//! ├── state/
//! │   ├── config.rs   ◄─── Environment configuration
//! │   ├── db.rs       ◄─── Database open + bootstrap
//! │   └── session.rs  ◄─── Signed-in operator, authorization gate
//! ├── commands/       ◄─── One module per area (product, sale, report, ...)
//! └── error.rs        ◄─── ApiError and error codes
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cafe_core::{CustomerInput, ProductInput, SaleBuilder};
use cafe_db::Database;

use cli::{
    Cli, Command, CustomerCommand, OutputFlags, ProductCommand, ReportArgs, ReportCommand,
    SaleCommand, SettingsCommand, UserCommand,
};
use commands::customer::CustomerPatch;
use commands::product::{parse_price, ProductPatch};
use commands::report::{PeriodArgs, DEFAULT_LIMIT};
use error::{ApiError, ApiResult, ErrorCode};
use state::{ConfigState, DbState, SessionState};

/// Runs one invocation.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. ConfigState::from_env, then --db, then validate()                   │
/// │                                                                         │
/// │  2. DbState::open ── pool, migrations, bootstrap                        │
/// │     (failure: PERSISTENCE_UNAVAILABLE, nothing else runs)               │
/// │                                                                         │
/// │  3. currency_symbol setting applied (unless CAFE_CURRENCY_SYMBOL)       │
/// │                                                                         │
/// │  4. `init` stops here; every other command signs in                     │
/// │     (--user/--password or CAFE_USER/CAFE_PASSWORD)                      │
/// │                                                                         │
/// │  5. Dispatch with the explicit SessionState                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> ApiResult<()> {
    let mut config = ConfigState::from_env();
    if let Some(path) = &cli.db {
        config.db_path = path.clone();
    }
    config.validate()?;

    let (db_state, bootstrap) = DbState::open(&config).await?;
    let db = db_state.inner();
    config.apply_currency_setting(db.settings().get("currency_symbol").await?);
    debug!(currency = %config.currency_symbol, "Configuration loaded");

    let console = Console {
        db,
        config: &config,
        json: cli.json,
    };

    if let Command::Init = cli.command {
        return console.emit(&bootstrap, |b| output::bootstrap(b, &config.db_path));
    }

    let session = sign_in(db, cli.user.as_deref(), cli.password.as_deref()).await?;
    console.dispatch(&session, cli.command).await
}

async fn sign_in(db: &Database, user: Option<&str>, password: Option<&str>) -> ApiResult<SessionState> {
    let (Some(user), Some(password)) = (user, password) else {
        return Err(ApiError::new(
            ErrorCode::AuthenticationFailed,
            "Sign in with --user and --password (or CAFE_USER and CAFE_PASSWORD)",
        ));
    };
    SessionState::login(db, user, password).await
}

/// Calendar day used for "today" in reports and the dashboard. Sale
/// timestamps are stored in UTC, so days are UTC days.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// What every handler needs besides the session.
struct Console<'a> {
    db: &'a Database,
    config: &'a ConfigState,
    json: bool,
}

impl Console<'_> {
    /// Prints `value` as JSON with `--json`, otherwise as `text(value)`.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> ApiResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| ApiError::internal(format!("Could not encode output: {}", e)))?;
            println!("{}", json);
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }

    fn done(&self, message: String) -> ApiResult<()> {
        self.emit(&serde_json::json!({ "ok": true, "message": message }), |_| {
            format!("{}\n", message)
        })
    }

    fn symbol(&self) -> &str {
        &self.config.currency_symbol
    }

    async fn dispatch(&self, session: &SessionState, command: Command) -> ApiResult<()> {
        match command {
            Command::Init => Ok(()),
            Command::Whoami => {
                let current = current(session)?;
                self.emit(current, output::session)
            }
            Command::Screens => {
                let current = current(session)?;
                self.emit(&current.screens(), |_| output::screens(current))
            }
            Command::Dashboard => {
                let dashboard = commands::dashboard::load(self.db, session, today()).await?;
                self.emit(&dashboard, |d| output::dashboard(d, self.symbol()))
            }
            Command::Product(cmd) => self.product(session, cmd).await,
            Command::Customer(cmd) => self.customer(session, cmd).await,
            Command::Sale(cmd) => self.sale(session, cmd).await,
            Command::Report(args) => self.report(session, args).await,
            Command::Settings(cmd) => self.settings(session, cmd).await,
            Command::User(cmd) => self.user(session, cmd).await,
            Command::Audit { limit } => {
                let entries = commands::audit::recent(self.db, session, limit).await?;
                self.emit(&entries, |e| output::audit(e))
            }
        }
    }

    async fn product(&self, session: &SessionState, cmd: ProductCommand) -> ApiResult<()> {
        use commands::product;
        let db = self.db;

        match cmd {
            ProductCommand::List { category } => {
                let products = match category {
                    Some(category) => product::by_category(db, session, &category).await?,
                    None => product::list(db, session).await?,
                };
                self.emit(&products, |p| output::products(p, self.symbol()))
            }
            ProductCommand::Search { query } => {
                let products = product::search(db, session, &query).await?;
                self.emit(&products, |p| output::products(p, self.symbol()))
            }
            ProductCommand::Show { id } => {
                let found = product::show(db, session, id).await?;
                self.emit(&found, |p| output::product(p, self.symbol()))
            }
            ProductCommand::Add {
                name,
                category,
                price,
                stock,
                min_stock,
                description,
            } => {
                let min_stock = match min_stock {
                    Some(min) => min,
                    None => product::default_min_stock(db).await?,
                };
                let input = ProductInput {
                    name,
                    category,
                    price_cents: parse_price(&price)?,
                    stock,
                    min_stock,
                    description,
                };
                let created = product::create(db, session, input).await?;
                self.emit(&created, |p| output::product(p, self.symbol()))
            }
            ProductCommand::Edit {
                id,
                name,
                category,
                price,
                stock,
                min_stock,
                description,
            } => {
                let patch = ProductPatch {
                    name,
                    category,
                    price_cents: price.as_deref().map(parse_price).transpose()?,
                    stock,
                    min_stock,
                    description,
                };
                let updated = product::update(db, session, id, patch).await?;
                self.emit(&updated, |p| output::product(p, self.symbol()))
            }
            ProductCommand::Delete { id } => {
                product::delete(db, session, id).await?;
                self.done(format!("Product {} deleted", id))
            }
            ProductCommand::Stock { id, stock } => {
                let updated = product::set_stock(db, session, id, stock).await?;
                self.emit(&updated, |p| output::product(p, self.symbol()))
            }
            ProductCommand::LowStock => {
                let low = product::low_stock(db, session).await?;
                self.emit(&low, |l| {
                    format!(
                        "{} product(s) at or below minimum\n{}",
                        l.count,
                        output::products(&l.products, self.symbol())
                    )
                })
            }
            ProductCommand::Categories => {
                let categories = product::categories(db, session).await?;
                self.emit(&categories, |c| c.iter().map(|c| format!("{}\n", c)).collect())
            }
        }
    }

    async fn customer(&self, session: &SessionState, cmd: CustomerCommand) -> ApiResult<()> {
        use commands::customer;
        let db = self.db;

        match cmd {
            CustomerCommand::List => {
                let customers = customer::list(db, session).await?;
                self.emit(&customers, |c| output::customers(c))
            }
            CustomerCommand::Search { query } => {
                let customers = customer::search(db, session, &query).await?;
                self.emit(&customers, |c| output::customers(c))
            }
            CustomerCommand::Show { id } => {
                let found = customer::show(db, session, id).await?;
                self.emit(&found, |c| output::customers(std::slice::from_ref(c)))
            }
            CustomerCommand::Add { name, email, phone } => {
                let created = customer::create(db, session, CustomerInput { name, email, phone }).await?;
                self.emit(&created, |c| output::customers(std::slice::from_ref(c)))
            }
            CustomerCommand::Edit {
                id,
                name,
                email,
                phone,
            } => {
                let patch = CustomerPatch { name, email, phone };
                let updated = customer::update(db, session, id, patch).await?;
                self.emit(&updated, |c| output::customers(std::slice::from_ref(c)))
            }
            CustomerCommand::Delete { id } => {
                customer::delete(db, session, id).await?;
                self.done(format!("Customer {} deleted", id))
            }
            CustomerCommand::Frequent { limit } => {
                let rows = customer::frequent(db, session, limit).await?;
                self.emit(&rows, |r| output::frequent_customers(r, self.symbol()))
            }
        }
    }

    async fn sale(&self, session: &SessionState, cmd: SaleCommand) -> ApiResult<()> {
        use commands::sale;
        let db = self.db;

        match cmd {
            SaleCommand::New {
                customer,
                items,
                removals,
            } => {
                let mut cart: SaleBuilder = sale::build_cart(db, session, &items, &removals).await?;
                if !self.json {
                    print!("{}", output::cart(&cart, self.symbol()));
                }
                let receipt = sale::commit_sale(db, session, &mut cart, &customer).await?;
                self.emit(&receipt, |r| {
                    format!(
                        "\nSale #{} saved for {} ({})\n",
                        r.sale.id,
                        r.sale.customer_name,
                        self.config.format_currency(r.sale.total())
                    )
                })
            }
            SaleCommand::List { period, limit } => {
                let range = match (period.from, period.to) {
                    (None, None) => None,
                    (from, to) => {
                        let to = to.unwrap_or_else(today);
                        Some((from.unwrap_or(to), to))
                    }
                };
                let sales = sale::list(db, session, range, limit).await?;
                self.emit(&sales, |s| output::sales(s, self.symbol()))
            }
            SaleCommand::Show { id } => {
                let detail = sale::show(db, session, id).await?;
                self.emit(&detail, |d| output::sale_detail(d, self.symbol()))
            }
            SaleCommand::Edit { id, customer } => {
                let updated = sale::edit_customer(db, session, id, &customer).await?;
                self.emit(&updated, |s| output::sales(std::slice::from_ref(s), self.symbol()))
            }
            SaleCommand::Delete { id } => {
                sale::delete(db, session, id).await?;
                self.done(format!("Sale {} deleted", id))
            }
        }
    }

    async fn report(&self, session: &SessionState, args: ReportArgs) -> ApiResult<()> {
        use commands::report as reports;

        let (report, output_flags) = match args.command {
            Some(ReportCommand::Normalize {
                kind,
                input,
                output,
            }) => (reports::normalize_file(session, kind, &input)?, output),
            None => {
                let kind = args.kind.ok_or_else(|| {
                    ApiError::validation("Give a report kind or `normalize`")
                })?;
                let period = PeriodArgs {
                    from: args.period.from,
                    to: args.period.to,
                };
                let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
                let built = reports::build_report(self.db, session, kind, period, limit, today()).await?;
                (built, args.output)
            }
        };

        self.emit(&report, |r| output::report(r, self.symbol(), output_flags.chart))?;
        self.export(session, &report, output_flags).await
    }

    async fn export(
        &self,
        session: &SessionState,
        report: &cafe_core::Report,
        flags: OutputFlags,
    ) -> ApiResult<()> {
        use commands::report as reports;

        let Some(format) = flags.export_format() else {
            return Ok(());
        };
        let options = reports::export_options(self.db, self.config).await?;
        let path = reports::output_path(self.config, report.kind, format, flags.out, &options);
        let written = reports::export(session, report, format, &path, &options)?;

        info!(path = %written.display(), "Export finished");
        if !self.json {
            println!("\nSaved {}", written.display());
        }
        Ok(())
    }

    async fn settings(&self, session: &SessionState, cmd: SettingsCommand) -> ApiResult<()> {
        use commands::settings;
        let db = self.db;

        match cmd {
            SettingsCommand::List => {
                let all = settings::list(db, session).await?;
                self.emit(&all, |s| output::settings(s))
            }
            SettingsCommand::Get { key } => {
                let value = settings::get(db, session, &key).await?;
                self.emit(&value, |v| format!("{}\n", v))
            }
            SettingsCommand::Set { key, value } => {
                settings::set(db, session, &key, &value).await?;
                self.done(format!("{} updated", key))
            }
        }
    }

    async fn user(&self, session: &SessionState, cmd: UserCommand) -> ApiResult<()> {
        use commands::user;
        let db = self.db;

        match cmd {
            UserCommand::List => {
                let users = user::list(db, session).await?;
                self.emit(&users, |u| output::users(u))
            }
            UserCommand::Add {
                username,
                new_password,
                name,
                role,
            } => {
                let created = user::add(db, session, &username, &new_password, name.as_deref(), role).await?;
                self.emit(&created, |u| output::users(std::slice::from_ref(u)))
            }
            UserCommand::Delete { username } => {
                user::delete(db, session, &username).await?;
                self.done(format!("User {} deleted", username))
            }
            UserCommand::Passwd {
                username,
                new_password,
            } => {
                let username = match username {
                    Some(name) => name,
                    None => current(session)?.username.clone(),
                };
                user::change_password(db, session, &username, &new_password).await?;
                self.done(format!("Password changed for {}", username))
            }
        }
    }
}

fn current(session: &SessionState) -> ApiResult<&cafe_core::Session> {
    session
        .session()
        .ok_or_else(|| ApiError::new(ErrorCode::AuthenticationFailed, "Not signed in"))
}

/// Process exit status for a failed invocation.
pub fn exit_code(err: &ApiError) -> u8 {
    match err.code {
        ErrorCode::PersistenceUnavailable => 2,
        _ => 1,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cafe=trace` - Show trace for the cafe crates only
/// - Default: `info,cafe=debug,sqlx=warn`
///
/// Logs go to stderr; stdout carries command output only.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cafe=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(db: &std::path::Path, args: &[&str]) -> Cli {
        let mut argv = vec!["cafe", "--db", db.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[tokio::test]
    async fn test_init_then_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("cafe.db");

        run(cli(&db_path, &["init"])).await.unwrap();
        assert!(db_path.exists());

        run(cli(&db_path, &["-u", "admin", "-p", "admin123", "whoami"]))
            .await
            .unwrap();

        let err = run(cli(&db_path, &["-u", "admin", "-p", "wrong", "whoami"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
    }

    #[test]
    fn test_exit_codes() {
        let err = ApiError::new(ErrorCode::PersistenceUnavailable, "down");
        assert_eq!(exit_code(&err), 2);
        assert_eq!(exit_code(&ApiError::validation("bad")), 1);
    }
}
