//! Claims carried by the session token issued by the external auth provider.

use serde::{Deserialize, Serialize};

/// Decoded token claims identifying the caller of a request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Provider user id; a UUID.
    pub sub: String,
    pub email: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: usize,
}
