pub mod auth;
pub mod permissions;

pub use auth::AuthenticatedUser;
pub use permissions::require;
