use serde::{Deserialize, Serialize};

use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

/// OAuth2 password grant form body accepted by `/auth/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenForm {
    pub(crate) username: String,
    pub(crate) password: String,
}
