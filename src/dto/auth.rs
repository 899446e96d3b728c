use serde::{Deserialize, Serialize};

use crate::domain::auth::AuthenticatedUser;

/// The signed-in user as returned by `/api/auth/me` and after login.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub organization_id: i32,
    pub roles: Vec<String>,
}

impl From<&AuthenticatedUser> for SessionUser {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.sub.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            organization_id: user.organization_id,
            roles: user.roles.clone(),
        }
    }
}

/// Query string Google appends to the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
