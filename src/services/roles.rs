use crate::domain::auth::AuthenticatedUser;
use crate::domain::permissions::{Action, RoleInfo, role_info};
use crate::domain::types::UserRole;
use crate::repository::UserWriter;
use crate::services::ServiceResult;
use crate::services::session::resolve_session;

/// Role catalogue; callers without [`Action::ViewAllRoles`] only see their own role.
pub fn list_roles<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<RoleInfo>>
where
    R: UserWriter + ?Sized,
{
    let session = resolve_session(repo, user)?;

    if session.can(Action::ViewAllRoles) {
        Ok(UserRole::ALL.iter().copied().map(role_info).collect())
    } else {
        Ok(vec![role_info(session.role)])
    }
}
