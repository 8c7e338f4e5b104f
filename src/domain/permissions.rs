//! Role based permission table.
//!
//! Authorization is a pure lookup of `(role, action)`; row-level visibility
//! (which customers a non-admin may see) is applied by the services on top of
//! this table.

use serde::Serialize;

use crate::domain::types::UserRole;

/// Operations a principal may attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    ViewCustomers,
    ViewAllCustomers,
    CreateCustomer,
    EditCustomer,
    DeleteCustomer,
    AssignManagers,
    ManageUsers,
    ViewAllRoles,
    AccessSettings,
}

const ADMIN: &[Action] = &[
    Action::ViewCustomers,
    Action::ViewAllCustomers,
    Action::CreateCustomer,
    Action::EditCustomer,
    Action::DeleteCustomer,
    Action::AssignManagers,
    Action::ManageUsers,
    Action::ViewAllRoles,
    Action::AccessSettings,
];

const MANAGER: &[Action] = &[
    Action::ViewCustomers,
    Action::CreateCustomer,
    Action::EditCustomer,
    Action::DeleteCustomer,
    Action::AccessSettings,
];

const VIEWER: &[Action] = &[Action::ViewCustomers];

fn allowed_actions(role: UserRole) -> &'static [Action] {
    match role {
        UserRole::Admin => ADMIN,
        UserRole::Manager => MANAGER,
        UserRole::Viewer => VIEWER,
    }
}

/// Returns whether `role` may perform `action`.
pub fn is_allowed(role: UserRole, action: Action) -> bool {
    allowed_actions(role).contains(&action)
}

/// Human readable description of a role, served by the roles endpoint.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: UserRole,
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
}

pub fn role_info(role: UserRole) -> RoleInfo {
    match role {
        UserRole::Admin => RoleInfo {
            id: role,
            name: "Administrator",
            description: "Full access to all system features including user management",
            capabilities: &[
                "View all customers",
                "Manage all customers",
                "Manage users and roles",
                "Access system settings",
            ],
        },
        UserRole::Manager => RoleInfo {
            id: role,
            name: "Manager",
            description: "Can manage assigned customers and create new customers",
            capabilities: &[
                "View assigned customers",
                "Manage assigned customers",
                "Create new customers",
            ],
        },
        UserRole::Viewer => RoleInfo {
            id: role,
            name: "Viewer",
            description: "Read-only access to assigned customers",
            capabilities: &["View assigned customers", "View customer details"],
        },
    }
}
