use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, UserId};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub id: String,
    pub email: &'a str,
    pub role: &'a str,
    pub created_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.parse::<UserId>()?,
            email: user.email,
            role: user.role.parse()?,
            created_at: user.created_at,
        })
    }
}

impl<'a> NewUser<'a> {
    pub fn from_domain(user: &'a DomainNewUser, now: NaiveDateTime) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            created_at: now,
        }
    }
}
