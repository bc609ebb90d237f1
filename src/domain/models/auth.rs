use serde::{Deserialize, Serialize};

/// Access token claims issued by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,

    #[serde(rename = "https://villa-ops.local/claims/role")]
    pub role: String,
}
