//! Resolution of the request principal.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::permissions::Action;
use crate::domain::types::{UserId, UserRole};
use crate::domain::user::{NewUser, SessionUser};
use crate::repository::UserWriter;
use crate::services::{ServiceError, ServiceResult};

/// Loads the caller's profile, registering unknown users as viewers.
pub fn resolve_session<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SessionUser>
where
    R: UserWriter + ?Sized,
{
    let id: UserId = user.sub.parse().map_err(|_| {
        log::warn!("Rejecting token with malformed subject {}", user.sub);
        ServiceError::Unauthenticated
    })?;

    let new_user = NewUser {
        id,
        email: user.email.trim().to_lowercase(),
        role: UserRole::default(),
    };

    Ok(repo.ensure_user(&new_user)?.into())
}

/// Fails with [`ServiceError::Forbidden`] unless the role permits `action`.
pub fn authorize(session: &SessionUser, action: Action) -> ServiceResult<()> {
    if session.can(action) {
        Ok(())
    } else {
        log::warn!("{} ({}) denied {action:?}", session.email, session.role);
        Err(ServiceError::Forbidden)
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;

    #[test]
    fn first_sight_registers_viewer() {
        let id = UserId::generate();
        let mut repo = MockRepository::new();
        repo.expect_ensure_user()
            .withf(move |new_user| {
                new_user.id == id
                    && new_user.email == "new@example.com"
                    && new_user.role == UserRole::Viewer
            })
            .times(1)
            .returning(|new_user| {
                Ok(User {
                    id: new_user.id,
                    email: new_user.email.clone(),
                    role: new_user.role,
                    created_at: chrono::Utc::now().naive_utc(),
                })
            });

        let claims = AuthenticatedUser {
            sub: id.to_string(),
            email: " New@Example.com ".to_string(),
            exp: 0,
        };
        let session = resolve_session(&repo, &claims).expect("session");

        assert_eq!(session.id, id);
        assert_eq!(session.role, UserRole::Viewer);
    }

    #[test]
    fn malformed_subject_is_unauthenticated() {
        let mut repo = MockRepository::new();
        repo.expect_ensure_user().times(0);
        let claims = AuthenticatedUser {
            sub: "not-a-uuid".to_string(),
            email: "x@example.com".to_string(),
            exp: 0,
        };

        assert!(matches!(
            resolve_session(&repo, &claims),
            Err(ServiceError::Unauthenticated)
        ));
    }
}
