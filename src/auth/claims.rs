use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,  // Caller's user ID
    pub role: Role,
    pub exp: i64,   // Expiration timestamp
    pub iat: i64,   // Issued at timestamp
}
