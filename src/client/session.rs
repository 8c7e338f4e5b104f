//! Client session: the signed-in user and the transport shared by the
//! views opened under it.

use std::rc::Rc;

use crate::client::api::CustomerApi;
use crate::client::errors::SyncError;
use crate::client::list::CustomerList;
use crate::domain::permissions::{Action, is_allowed};
use crate::domain::types::UserRole;
use crate::domain::user::User;

/// Signed-in user of the client, resolved once when the session starts.
///
/// The role is cached for the lifetime of the session; a role change on the
/// server takes effect with the next session.
pub struct Session<A> {
    api: Rc<A>,
    user: User,
}

impl<A: CustomerApi> Session<A> {
    pub async fn establish(api: Rc<A>) -> Result<Self, SyncError> {
        let user = api.current_user().await?;
        log::info!("Session started for {} as {}", user.email, user.role);
        Ok(Self { api, user })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn can(&self, action: Action) -> bool {
        is_allowed(self.user.role, action)
    }

    pub fn api(&self) -> Rc<A> {
        Rc::clone(&self.api)
    }

    /// A customer list bound to this session's transport.
    pub fn customers(&self) -> CustomerList<A> {
        CustomerList::new(self.api())
    }

    pub fn end(self) {
        log::info!("Session ended for {}", self.user.email);
    }
}
