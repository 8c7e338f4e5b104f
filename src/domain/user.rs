use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::permissions::{Action, is_allowed};
use crate::domain::types::{UserId, UserRole};

/// Profile row of an authenticated principal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

/// The resolved principal of a request or client session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl SessionUser {
    pub fn can(&self, action: Action) -> bool {
        is_allowed(self.role, action)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}
