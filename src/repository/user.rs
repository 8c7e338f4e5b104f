use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::types::{UserId, UserRole};
use crate::domain::user::{NewUser, User};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserWriter};
use crate::schema::users;

impl UserReader for DieselRepository {
    fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;

        let user = users::table
            .find(id.to_string())
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let mut conn = self.conn()?;

        let build = || -> users::BoxedQuery<'static, Sqlite> {
            let mut items = users::table.into_boxed();
            if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                items = items.filter(users::email.like(format!("%{}%", term.to_lowercase())));
            }
            items
        };

        let total: i64 = build().count().get_result(&mut conn)?;

        let mut items = build().order((users::created_at.desc(), users::id.asc()));
        if let Some(pagination) = &query.pagination {
            let Some(offset) = pagination.offset() else {
                return Ok((total as usize, Vec::new()));
            };
            items = items.limit(pagination.limit()).offset(offset);
        }

        let users = items
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, users))
    }
}

impl UserWriter for DieselRepository {
    fn ensure_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let insertable = DbNewUser::from_domain(new_user, Utc::now().naive_utc());

        let user = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            if let Some(existing) = users::table
                .find(&insertable.id)
                .first::<DbUser>(conn)
                .optional()?
            {
                return Ok(existing);
            }

            log::info!("Registering user {} as {}", insertable.email, insertable.role);
            diesel::insert_into(users::table)
                .values(&insertable)
                .get_result::<DbUser>(conn)
        })?;

        Ok(User::try_from(user)?)
    }

    fn update_user_role(&self, id: UserId, role: UserRole) -> RepositoryResult<User> {
        let mut conn = self.conn()?;

        let updated = diesel::update(users::table.find(id.to_string()))
            .set(users::role.eq(role.as_str()))
            .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(updated)?)
    }
}
