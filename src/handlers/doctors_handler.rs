use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::hash_password,
    extractors::{require, AuthenticatedUser},
    models::{
        Capability, CreateDoctorInput, DoctorFilter, DoctorMutationResponse, DoctorWithUser,
        SearchDoctorsQuery, UpdateDoctorInput,
    },
    AppError, AppResult, AppState,
};

fn doctor_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Doctor {} not found", id))
}

// Body and path are taken as Results so the capability check runs before either is judged.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn doctor_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(format!("Invalid doctor id: {}", e.body_text())))
}

/// POST /api/doctors - Create a doctor and its account
#[utoipa::path(
    post,
    path = "/api/doctors",
    request_body = CreateDoctorInput,
    responses(
        (status = 201, description = "Doctor created", body = DoctorMutationResponse),
        (status = 400, description = "Malformed body, missing userName, malformed email or schedule"),
        (status = 403, description = "Only Admin or Manager can create doctors"),
        (status = 409, description = "userName or email already in use")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    payload: Result<Json<CreateDoctorInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DoctorMutationResponse>)> {
    require(&auth, Capability::ManageDoctors)?;
    let input = json_body(payload)?;
    input.validate()?;

    let password_hash = match input.password() {
        Some(password) => Some(hash_password(password.to_string(), state.config.bcrypt_cost).await?),
        None => None,
    };
    let (new_user, new_doctor) = input.into_records(password_hash);

    let created = state.store.create_doctor(new_user, new_doctor).await?;

    counter!("doctors_created_total").increment(1);
    tracing::info!(
        doctor_id = %created.doctor.id,
        user_id = %created.doctor.user_id,
        created_by = %auth.user_id,
        "Doctor created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DoctorMutationResponse {
            success: true,
            message: Some("Doctor created successfully".to_string()),
            id: Some(created.doctor.id),
        }),
    ))
}

/// GET /api/doctors
#[utoipa::path(
    get,
    path = "/api/doctors",
    responses(
        (status = 200, description = "All doctors with their account details", body = Vec<DoctorWithUser>)
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn get_doctors(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Vec<DoctorWithUser>>> {
    require(&auth, Capability::ViewDoctors)?;

    let doctors = state.store.list_doctors(&DoctorFilter::default()).await?;

    Ok(Json(doctors))
}

/// GET /api/doctors/{id}
#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 200, description = "Doctor found", body = DoctorWithUser),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<DoctorWithUser>> {
    require(&auth, Capability::ViewDoctors)?;
    let id = doctor_id(path)?;

    let doctor = state
        .store
        .find_doctor(id)
        .await?
        .ok_or_else(|| doctor_not_found(id))?;

    Ok(Json(doctor))
}

/// PUT /api/doctors/{id} - Partial update; empty values keep what is stored
#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    request_body = UpdateDoctorInput,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorWithUser),
        (status = 400, description = "Malformed id, body, email or schedule"),
        (status = 403, description = "Only Admin or Manager can update doctors"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateDoctorInput>, JsonRejection>,
) -> AppResult<Json<DoctorWithUser>> {
    require(&auth, Capability::ManageDoctors)?;
    let id = doctor_id(path)?;
    let input = json_body(payload)?;
    input.validate()?;

    let (doctor_patch, user_patch) = input.into_patches();
    let touches_user = !user_patch.is_empty();

    let updated = state
        .store
        .update_doctor(id, doctor_patch, user_patch)
        .await?
        .ok_or_else(|| doctor_not_found(id))?;

    tracing::info!(doctor_id = %id, touches_user, updated_by = %auth.user_id, "Doctor updated");

    Ok(Json(updated))
}

/// DELETE /api/doctors/{id} - Remove a doctor and its account
#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    params(
        ("id" = Uuid, Path, description = "Doctor ID")
    ),
    responses(
        (status = 200, description = "Doctor deleted", body = DoctorMutationResponse),
        (status = 400, description = "Malformed id"),
        (status = 403, description = "Only Admin can delete doctors"),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<DoctorMutationResponse>> {
    require(&auth, Capability::DeleteDoctors)?;
    let id = doctor_id(path)?;

    if !state.store.delete_doctor(id).await? {
        return Err(doctor_not_found(id));
    }

    counter!("doctors_deleted_total").increment(1);
    tracing::info!(doctor_id = %id, deleted_by = %auth.user_id, "Doctor deleted");

    Ok(Json(DoctorMutationResponse {
        success: true,
        message: Some("Doctor deleted successfully".to_string()),
        id: Some(id),
    }))
}

/// GET /api/doctors/search?skill=&day=
#[utoipa::path(
    get,
    path = "/api/doctors/search",
    params(SearchDoctorsQuery),
    responses(
        (status = 200, description = "Doctors having the skill and/or working on the day", body = Vec<DoctorWithUser>)
    ),
    tag = "doctors",
    security(("bearer_auth" = []))
)]
pub async fn search_doctors(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<SearchDoctorsQuery>,
) -> AppResult<Json<Vec<DoctorWithUser>>> {
    require(&auth, Capability::ViewDoctors)?;

    let filter = query.into_filter();
    tracing::debug!(skill = ?filter.skill, day = ?filter.day, "Searching doctors");

    let doctors = state.store.list_doctors(&filter).await?;

    Ok(Json(doctors))
}
