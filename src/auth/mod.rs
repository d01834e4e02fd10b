pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::Claims;
pub use jwt::{issue_token, validate_jwt};
pub use password::hash_password;
