use crate::{
    extractors::AuthenticatedUser,
    models::Capability,
    AppError,
};

/// Fails with Forbidden unless the caller's role grants `capability`
pub fn require(auth: &AuthenticatedUser, capability: Capability) -> Result<(), AppError> {
    if auth.role.can(capability) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %auth.user_id,
        role = %auth.role,
        ?capability,
        "Caller lacks capability"
    );

    Err(AppError::Forbidden(format!(
        "Role {} is not allowed to {}",
        auth.role,
        capability.describe()
    )))
}
