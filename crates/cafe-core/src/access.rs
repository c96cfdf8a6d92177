//! # Access Control
//!
//! Static role tables deciding which screens a user may open and which
//! mutating actions a user may perform.
//!
//! ## Where The Check Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  console command ──► authorize(session, Action) ──► repository call    │
//! │                           │                                             │
//! │                           └── Err(PermissionDenied) ─► nothing written  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate lives at the mutation entry point, not only in navigation.
//! No session means every check is denied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

// =============================================================================
// Screens
// =============================================================================

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Summary,
    Sales,
    Inventory,
    Customers,
    Reports,
    Settings,
    About,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Summary,
        Screen::Sales,
        Screen::Inventory,
        Screen::Customers,
        Screen::Reports,
        Screen::Settings,
        Screen::About,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Summary => "summary",
            Screen::Sales => "sales",
            Screen::Inventory => "inventory",
            Screen::Customers => "customers",
            Screen::Reports => "reports",
            Screen::Settings => "settings",
            Screen::About => "about",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str() == wanted)
            .ok_or_else(|| format!("unknown screen '{}'", s))
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Mutating (or otherwise guarded) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    CreateProduct,
    EditProduct,
    DeleteProduct,
    AdjustStock,
    CreateSale,
    EditSale,
    DeleteSale,
    CreateCustomer,
    EditCustomer,
    DeleteCustomer,
    ViewSettings,
    EditSettings,
    GenerateReports,
    ManageUsers,
    ViewAudit,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::CreateProduct,
        Action::EditProduct,
        Action::DeleteProduct,
        Action::AdjustStock,
        Action::CreateSale,
        Action::EditSale,
        Action::DeleteSale,
        Action::CreateCustomer,
        Action::EditCustomer,
        Action::DeleteCustomer,
        Action::ViewSettings,
        Action::EditSettings,
        Action::GenerateReports,
        Action::ManageUsers,
        Action::ViewAudit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateProduct => "create-product",
            Action::EditProduct => "edit-product",
            Action::DeleteProduct => "delete-product",
            Action::AdjustStock => "adjust-stock",
            Action::CreateSale => "create-sale",
            Action::EditSale => "edit-sale",
            Action::DeleteSale => "delete-sale",
            Action::CreateCustomer => "create-customer",
            Action::EditCustomer => "edit-customer",
            Action::DeleteCustomer => "delete-customer",
            Action::ViewSettings => "view-settings",
            Action::EditSettings => "edit-settings",
            Action::GenerateReports => "generate-reports",
            Action::ManageUsers => "manage-users",
            Action::ViewAudit => "view-audit",
        }
    }

    /// Roles listed for this action. `None` means the action has no entry,
    /// which falls back to admin-only.
    fn listed_roles(&self) -> Option<&'static [Role]> {
        const CATALOG: &[Role] = &[Role::Admin, Role::InventoryClerk];
        const COUNTER: &[Role] = &[Role::Admin, Role::Salesperson];
        const ADMIN: &[Role] = &[Role::Admin];

        match self {
            Action::CreateProduct
            | Action::EditProduct
            | Action::DeleteProduct
            | Action::AdjustStock => Some(CATALOG),
            Action::CreateSale | Action::CreateCustomer | Action::EditCustomer => Some(COUNTER),
            Action::EditSale
            | Action::DeleteSale
            | Action::DeleteCustomer
            | Action::ViewSettings
            | Action::EditSettings => Some(ADMIN),
            Action::GenerateReports | Action::ManageUsers | Action::ViewAudit => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Screens visible to a role.
pub fn screens_for(role: Role) -> &'static [Screen] {
    match role {
        Role::Admin => &Screen::ALL,
        Role::Salesperson => &[
            Screen::Summary,
            Screen::Sales,
            Screen::Customers,
            Screen::Reports,
        ],
        Role::InventoryClerk => &[Screen::Summary, Screen::Inventory, Screen::Reports],
    }
}

/// Whether `role` may open `screen`.
pub fn screen_allowed(role: Role, screen: Screen) -> bool {
    screens_for(role).contains(&screen)
}

/// Whether `role` may perform `action`.
///
/// ## Example
/// ```rust
/// use cafe_core::access::{action_allowed, Action};
/// use cafe_core::Role;
///
/// assert!(action_allowed(Role::Salesperson, Action::CreateSale));
/// assert!(!action_allowed(Role::Salesperson, Action::DeleteSale));
/// assert!(!action_allowed(Role::InventoryClerk, Action::ManageUsers));
/// ```
pub fn action_allowed(role: Role, action: Action) -> bool {
    match action.listed_roles() {
        Some(roles) => roles.contains(&role),
        None => role == Role::Admin,
    }
}

/// String form of [`screen_allowed`]. Unknown role or screen is denied.
pub fn screen_allowed_by_name(role: &str, screen: &str) -> bool {
    match (role.parse::<Role>(), screen.parse::<Screen>()) {
        (Ok(role), Ok(screen)) => screen_allowed(role, screen),
        _ => false,
    }
}

/// String form of [`action_allowed`].
///
/// An unknown role is denied. An unknown action falls back to admin-only.
pub fn action_allowed_by_name(role: &str, action: &str) -> bool {
    let Ok(role) = role.parse::<Role>() else {
        return false;
    };

    match action.parse::<Action>() {
        Ok(action) => action_allowed(role, action),
        Err(_) => role == Role::Admin,
    }
}

// =============================================================================
// Session
// =============================================================================

/// The signed-in user, passed explicitly to every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    /// `None` when the stored role is not recognised; grants nothing.
    pub role: Option<Role>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Session {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role(),
        }
    }

    pub fn can(&self, action: Action) -> bool {
        self.role.is_some_and(|role| action_allowed(role, action))
    }

    pub fn can_open(&self, screen: Screen) -> bool {
        self.role.is_some_and(|role| screen_allowed(role, screen))
    }

    /// Navigation entries, in display order.
    pub fn screens(&self) -> Vec<Screen> {
        self.role
            .map(|role| screens_for(role).to_vec())
            .unwrap_or_default()
    }
}

/// Rejects the action unless a session exists and its role permits it.
pub fn authorize(session: Option<&Session>, action: Action) -> CoreResult<&Session> {
    match session {
        Some(session) if session.can(action) => Ok(session),
        _ => Err(CoreError::PermissionDenied {
            action: action.to_string(),
        }),
    }
}

/// Rejects the screen unless a session exists and its role permits it.
pub fn authorize_screen(session: Option<&Session>, screen: Screen) -> CoreResult<&Session> {
    match session {
        Some(session) if session.can_open(screen) => Ok(session),
        _ => Err(CoreError::ScreenDenied {
            screen: screen.to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Option<Role>) -> Session {
        Session {
            user_id: 1,
            username: "maria".to_string(),
            display_name: "Maria".to_string(),
            role,
        }
    }

    #[test]
    fn test_screen_tables() {
        assert_eq!(screens_for(Role::Admin).len(), 7);
        assert!(screen_allowed(Role::Salesperson, Screen::Customers));
        assert!(!screen_allowed(Role::Salesperson, Screen::Inventory));
        assert!(screen_allowed(Role::InventoryClerk, Screen::Inventory));
        assert!(!screen_allowed(Role::InventoryClerk, Screen::Sales));
        assert!(!screen_allowed(Role::InventoryClerk, Screen::Settings));
    }

    #[test]
    fn test_action_table() {
        assert!(action_allowed(Role::Admin, Action::DeleteSale));
        assert!(action_allowed(Role::Salesperson, Action::CreateSale));
        assert!(!action_allowed(Role::InventoryClerk, Action::CreateSale));
        assert!(action_allowed(Role::InventoryClerk, Action::EditProduct));
        assert!(!action_allowed(Role::Salesperson, Action::EditProduct));
        assert!(!action_allowed(Role::Salesperson, Action::DeleteCustomer));
    }

    #[test]
    fn test_unlisted_action_is_admin_only() {
        for role in Role::ALL {
            assert_eq!(
                action_allowed(role, Action::GenerateReports),
                role == Role::Admin
            );
        }
        assert!(action_allowed_by_name("admin", "launch-rocket"));
        assert!(!action_allowed_by_name("salesperson", "launch-rocket"));
    }

    #[test]
    fn test_names() {
        assert!(screen_allowed_by_name("inventory-clerk", "inventory"));
        assert!(!screen_allowed_by_name("barista", "summary"));
        assert!(!screen_allowed_by_name("admin", "kitchen"));
        assert!(action_allowed_by_name("salesperson", "create-sale"));
        assert!(!action_allowed_by_name("barista", "create-sale"));
    }

    #[test]
    fn test_no_session_denies_everything() {
        for action in Action::ALL {
            assert!(authorize(None, action).is_err());
        }
        for screen in Screen::ALL {
            assert!(authorize_screen(None, screen).is_err());
        }
    }

    #[test]
    fn test_unknown_role_session_denies_everything() {
        let s = session(None);
        assert!(s.screens().is_empty());
        assert!(matches!(
            authorize(Some(&s), Action::CreateSale),
            Err(CoreError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_authorize() {
        let clerk = session(Some(Role::InventoryClerk));
        assert!(authorize(Some(&clerk), Action::AdjustStock).is_ok());

        let err = authorize(Some(&clerk), Action::DeleteSale).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied: delete-sale");

        assert!(authorize_screen(Some(&clerk), Screen::Reports).is_ok());
        assert!(authorize_screen(Some(&clerk), Screen::Customers).is_err());
    }
}
