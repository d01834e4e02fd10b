use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::extractors::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clinic Doctors API",
        version = "1.0.0",
        description = "Doctor profiles and their linked user accounts for the clinic management system"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Doctors
        crate::handlers::doctors_handler::create_doctor,
        crate::handlers::doctors_handler::get_doctors,
        crate::handlers::doctors_handler::search_doctors,
        crate::handlers::doctors_handler::get_doctor,
        crate::handlers::doctors_handler::update_doctor,
        crate::handlers::doctors_handler::delete_doctor,
    ),
    components(
        schemas(
            crate::models::Role,
            crate::models::Doctor,
            crate::models::DoctorWithUser,
            crate::models::UserSummary,
            crate::models::WorkSchedule,
            crate::models::WorkHours,
            crate::models::CreateDoctorInput,
            crate::models::UpdateDoctorInput,
            crate::models::DoctorMutationResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "doctors", description = "Doctor management"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}
