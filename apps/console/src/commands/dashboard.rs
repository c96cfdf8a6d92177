//! # Dashboard Command
//!
//! The summary screen: today's takings, catalog health, the last week.

use chrono::NaiveDate;

use cafe_core::Screen;
use cafe_db::{Dashboard, Database};

use crate::error::ApiResult;
use crate::state::SessionState;

/// Loads the summary for `today` (UTC calendar day).
pub async fn load(db: &Database, session: &SessionState, today: NaiveDate) -> ApiResult<Dashboard> {
    session.authorize_screen(Screen::Summary)?;
    Ok(Dashboard::load(db, today).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================
