use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::store::Record;

/// Account allowed to use the back office.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn can(&self, permission: Permission) -> bool {
        self.active && self.role.grants(permission)
    }
}

impl Record for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn set_id(&mut self, id: UserId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Staff => "STAFF",
        }
    }

    pub const fn grants(self, permission: Permission) -> bool {
        match self {
            Self::Admin => true,
            Self::Manager => !matches!(permission, Permission::ManageUsers),
            Self::Staff => matches!(
                permission,
                Permission::ViewRecords | Permission::RecordTransactions
            ),
        }
    }
}

/// Capabilities checked by the HTTP layer before calling a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewRecords,
    RecordTransactions,
    ManageCatalog,
    ManageOrders,
    AdjustInventory,
    ManageUsers,
}

/// Payload for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial account update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_can_only_view_and_record() {
        assert!(Role::Staff.grants(Permission::ViewRecords));
        assert!(Role::Staff.grants(Permission::RecordTransactions));
        assert!(!Role::Staff.grants(Permission::ManageOrders));
        assert!(!Role::Staff.grants(Permission::AdjustInventory));
    }

    #[test]
    fn managers_cannot_manage_users() {
        assert!(Role::Manager.grants(Permission::ManageCatalog));
        assert!(!Role::Manager.grants(Permission::ManageUsers));
        assert!(Role::Admin.grants(Permission::ManageUsers));
    }
}
