use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserSummary;

const HOUR_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkHours {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// Days a doctor works plus the daily hour range. Hours use 24-hour `HH:MM`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkSchedule {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub hours: WorkHours,
}

impl WorkSchedule {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.hours.start.is_empty() && self.hours.end.is_empty()
    }

    /// Days must be non-blank. Hours must both be blank, or both set with `start` before `end`.
    pub fn validate(&self) -> Result<(), String> {
        if self.days.iter().any(|d| d.trim().is_empty()) {
            return Err("workSchedule.days cannot contain blank entries".to_string());
        }

        let WorkHours { start, end } = &self.hours;

        match (start.is_empty(), end.is_empty()) {
            (true, true) => return Ok(()),
            (false, false) => {}
            _ => return Err("workSchedule.hours needs both start and end".to_string()),
        }

        let start_time = NaiveTime::parse_from_str(start, HOUR_FORMAT)
            .map_err(|_| format!("Invalid start hour '{}', expected HH:MM", start))?;
        let end_time = NaiveTime::parse_from_str(end, HOUR_FORMAT)
            .map_err(|_| format!("Invalid end hour '{}', expected HH:MM", end))?;

        if start_time >= end_time {
            return Err(format!("Start hour {} must be before end hour {}", start, end));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub certificates: Vec<String>,
    pub experiences: Vec<String>,
    pub skills: Vec<String>,
    pub work_schedule: WorkSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor profile with the linked account's public fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorWithUser {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Default)]
pub struct NewDoctor {
    pub certificates: Vec<String>,
    pub experiences: Vec<String>,
    pub skills: Vec<String>,
    pub work_schedule: WorkSchedule,
}

/// Profile fields to overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorPatch {
    pub certificates: Option<Vec<String>>,
    pub experiences: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub work_schedule: Option<WorkSchedule>,
}

impl DoctorPatch {
    pub fn apply(&self, doctor: &mut Doctor) {
        if let Some(certificates) = &self.certificates {
            doctor.certificates = certificates.clone();
        }
        if let Some(experiences) = &self.experiences {
            doctor.experiences = experiences.clone();
        }
        if let Some(skills) = &self.skills {
            doctor.skills = skills.clone();
        }
        if let Some(work_schedule) = &self.work_schedule {
            doctor.work_schedule = work_schedule.clone();
        }
    }
}

/// Search criteria; every present field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorFilter {
    pub skill: Option<String>,
    pub day: Option<String>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let skill_ok = self
            .skill
            .as_ref()
            .map_or(true, |skill| doctor.skills.contains(skill));
        let day_ok = self
            .day
            .as_ref()
            .map_or(true, |day| doctor.work_schedule.days.contains(day));

        skill_ok && day_ok
    }
}
