use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::types::{UserId, UserRole};
use crate::forms::FormError;

fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<UserRole>().map(|_| ()).map_err(|_| {
        ValidationError::new("role").with_message("Role must be one of admin, manager, viewer".into())
    })
}

fn validate_uuid(id: &str) -> Result<(), ValidationError> {
    id.parse::<UserId>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("id").with_message("Invalid ID format".into()))
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Body of `PUT /api/user`. Only role changes are supported, so both fields
/// must be present.
pub struct UpdateRoleForm {
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

impl UpdateRoleForm {
    pub fn is_role_change(&self) -> bool {
        self.id.is_some() && self.role.is_some()
    }
}

/// Query string of `GET /api/roles/users`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UserListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub q: Option<String>,
}

/// Validated role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub user_id: UserId,
    pub role: UserRole,
}

impl TryFrom<UpdateRoleForm> for RoleChange {
    type Error = FormError;

    fn try_from(form: UpdateRoleForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(RoleChange {
            user_id: form
                .id
                .unwrap_or_default()
                .parse()
                .map_err(FormError::field("id"))?,
            role: form
                .role
                .unwrap_or_default()
                .parse()
                .map_err(FormError::field("role"))?,
        })
    }
}
