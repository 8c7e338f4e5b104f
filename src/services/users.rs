//! Profile and role administration behind `/api/user` and `/api/roles/users`.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::permissions::Action;
use crate::domain::user::User;
use crate::dto::api::{Page, PaginationMeta};
use crate::forms::user::{RoleChange, UpdateRoleForm, UserListParams};
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::session::{authorize, resolve_session};
use crate::services::{ServiceError, ServiceResult};

pub const DEFAULT_USERS_PAGE_SIZE: usize = 20;

pub fn current_user<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    repo.get_user(session.id)?.ok_or(ServiceError::NotFound)
}

/// Changes the role of another user. Admin only.
pub fn update_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UpdateRoleForm,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    if !form.is_role_change() {
        return Err(ServiceError::validation("Unsupported operation"));
    }
    authorize(&session, Action::ManageUsers)?;

    let change = RoleChange::try_from(form)?;
    let updated = repo.update_user_role(change.user_id, change.role)?;

    log::info!(
        "{} changed role of {} to {}",
        session.email,
        updated.email,
        updated.role
    );
    Ok(updated)
}

/// Lists users with their roles, newest first. Admin only.
pub fn list_users_with_roles<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: UserListParams,
) -> ServiceResult<Page<User>>
where
    R: UserReader + UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;
    authorize(&session, Action::ManageUsers)?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_USERS_PAGE_SIZE)
        .clamp(1, crate::domain::query::MAX_PAGE_SIZE);

    let mut query = UserListQuery::new().paginate(page, limit);
    if let Some(term) = params.q.filter(|q| !q.trim().is_empty()) {
        query = query.search(term);
    }

    let (total, items) = repo.list_users(query)?;

    Ok(Page {
        items,
        pagination: PaginationMeta::new(total, page, limit),
    })
}
