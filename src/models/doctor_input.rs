use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    doctor::{DoctorFilter, DoctorPatch, NewDoctor, WorkSchedule},
    role::Role,
    user::{NewUser, UserPatch},
};
use crate::AppError;

/// Input for creating a doctor together with its account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorInput {
    // Missing is reported by validate() as 400, same as blank
    #[serde(default)]
    pub user_name: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub certificates: Option<Vec<String>>,
    pub experiences: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub work_schedule: Option<WorkSchedule>,
}

impl CreateDoctorInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_name.trim().is_empty() {
            return Err(AppError::BadRequest("userName is required".to_string()));
        }
        validate_email(self.email.as_deref())?;
        if let Some(schedule) = &self.work_schedule {
            schedule.validate().map_err(AppError::BadRequest)?;
        }
        Ok(())
    }

    /// The password to hash, if one was supplied
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Splits the input into the account and profile rows. The account always gets the Doctor role.
    pub fn into_records(self, password_hash: Option<String>) -> (NewUser, NewDoctor) {
        let user = NewUser {
            user_name: self.user_name.trim().to_string(),
            password_hash,
            email: non_empty_text(self.email),
            full_name: self.full_name,
            phone: self.phone,
            address: self.address,
            role_name: Role::Doctor,
            is_anonymous: false,
        };

        let doctor = NewDoctor {
            certificates: self.certificates.unwrap_or_default(),
            experiences: self.experiences.unwrap_or_default(),
            skills: self.skills.unwrap_or_default(),
            work_schedule: self.work_schedule.unwrap_or_default(),
        };

        (user, doctor)
    }
}

/// Input for updating a doctor. Missing or empty values keep what is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorInput {
    pub certificates: Option<Vec<String>>,
    pub experiences: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub work_schedule: Option<WorkSchedule>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateDoctorInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(self.email.as_deref())?;
        match &self.work_schedule {
            Some(schedule) => schedule.validate().map_err(AppError::BadRequest),
            None => Ok(()),
        }
    }

    pub fn into_patches(self) -> (DoctorPatch, UserPatch) {
        let doctor = DoctorPatch {
            certificates: non_empty_list(self.certificates),
            experiences: non_empty_list(self.experiences),
            skills: non_empty_list(self.skills),
            work_schedule: self.work_schedule.filter(|s| !s.is_empty()),
        };

        let user = UserPatch {
            full_name: non_empty_text(self.full_name),
            email: non_empty_text(self.email),
            phone: non_empty_text(self.phone),
            address: non_empty_text(self.address),
        };

        (doctor, user)
    }
}

/// Blank counts as absent; anything else must at least look like an address
fn validate_email(email: Option<&str>) -> Result<(), AppError> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(email) if !email.contains('@') => {
            Err(AppError::BadRequest(format!("Invalid email '{}'", email)))
        }
        _ => Ok(()),
    }
}

fn non_empty_list(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|v| !v.is_empty())
}

fn non_empty_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchDoctorsQuery {
    /// Exact, case-sensitive skill to match
    pub skill: Option<String>,
    /// Exact, case-sensitive working day to match
    pub day: Option<String>,
}

impl SearchDoctorsQuery {
    pub fn into_filter(self) -> DoctorFilter {
        DoctorFilter {
            skill: self.skill.filter(|s| !s.is_empty()),
            day: self.day.filter(|d| !d.is_empty()),
        }
    }
}

/// Response for doctor mutations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorMutationResponse {
    pub success: bool,
    pub message: Option<String>,
    pub id: Option<Uuid>,
}
